//! Heavenly stems, earthly branches and the modular arithmetic that
//! indexes them.

use std::fmt;

use crate::constants::{BRANCH_COUNT, STEM_COUNT};
use crate::element::Element;

/// Modulo whose result always lies in `[0, n)`, including for negative `a`.
///
/// Every index derived from a difference against an epoch anchor goes
/// through this helper.
pub fn floor_mod(a: i64, n: i64) -> i64 {
    a.rem_euclid(n)
}

/// The ten heavenly stems (천간), in cycle order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Stem {
    Gap,
    Eul,
    Byeong,
    Jeong,
    Mu,
    Gi,
    Gyeong,
    Sin,
    Im,
    Gye,
}

impl Stem {
    pub const ALL: [Stem; 10] = [
        Stem::Gap,
        Stem::Eul,
        Stem::Byeong,
        Stem::Jeong,
        Stem::Mu,
        Stem::Gi,
        Stem::Gyeong,
        Stem::Sin,
        Stem::Im,
        Stem::Gye,
    ];

    /// Stem at a cyclic position; any integer is reduced into range.
    pub fn from_index(index: i64) -> Self {
        Self::ALL[floor_mod(index, STEM_COUNT) as usize]
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn hangul(self) -> &'static str {
        ["갑", "을", "병", "정", "무", "기", "경", "신", "임", "계"][self.index()]
    }

    pub fn hanja(self) -> &'static str {
        ["甲", "乙", "丙", "丁", "戊", "己", "庚", "辛", "壬", "癸"][self.index()]
    }

    pub fn element(self) -> Element {
        match self {
            Stem::Gap | Stem::Eul => Element::Wood,
            Stem::Byeong | Stem::Jeong => Element::Fire,
            Stem::Mu | Stem::Gi => Element::Earth,
            Stem::Gyeong | Stem::Sin => Element::Metal,
            Stem::Im | Stem::Gye => Element::Water,
        }
    }
}

impl fmt::Display for Stem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.hangul())
    }
}

/// The twelve earthly branches (지지), in cycle order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Branch {
    Ja,
    Chuk,
    In,
    Myo,
    Jin,
    Sa,
    O,
    Mi,
    Sin,
    Yu,
    Sul,
    Hae,
}

impl Branch {
    pub const ALL: [Branch; 12] = [
        Branch::Ja,
        Branch::Chuk,
        Branch::In,
        Branch::Myo,
        Branch::Jin,
        Branch::Sa,
        Branch::O,
        Branch::Mi,
        Branch::Sin,
        Branch::Yu,
        Branch::Sul,
        Branch::Hae,
    ];

    /// Branch at a cyclic position; any integer is reduced into range.
    pub fn from_index(index: i64) -> Self {
        Self::ALL[floor_mod(index, BRANCH_COUNT) as usize]
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn hangul(self) -> &'static str {
        [
            "자", "축", "인", "묘", "진", "사", "오", "미", "신", "유", "술", "해",
        ][self.index()]
    }

    pub fn hanja(self) -> &'static str {
        [
            "子", "丑", "寅", "卯", "辰", "巳", "午", "未", "申", "酉", "戌", "亥",
        ][self.index()]
    }

    pub fn element(self) -> Element {
        match self {
            Branch::Ja | Branch::Hae => Element::Water,
            Branch::In | Branch::Myo => Element::Wood,
            Branch::Sa | Branch::O => Element::Fire,
            Branch::Sin | Branch::Yu => Element::Metal,
            Branch::Chuk | Branch::Jin | Branch::Mi | Branch::Sul => Element::Earth,
        }
    }

    /// Name of the two-hour slot (시진) this branch governs, e.g. "자시".
    pub fn sijin_name(self) -> String {
        format!("{}시", self.hangul())
    }

    /// Civil hours `(start, end)` of this branch's slot. 자시 wraps midnight: (23, 1).
    pub fn sijin_hours(self) -> (u32, u32) {
        let i = self.index() as u32;
        if i == 0 { (23, 1) } else { (2 * i - 1, 2 * i + 1) }
    }
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.hangul())
    }
}
