//! Pillar Calculator: birth date/hour → year, month, day and hour pillars.

use std::fmt;

use crate::balance::Balance;
use crate::calendar::CivilDate;
use crate::constants::{
    CYCLE_LEN, DAY_ANCHOR, DAY_ANCHOR_BRANCH, DAY_ANCHOR_STEM, MONTH_BRANCH_OFFSET, YEAR_ANCHOR,
};
use crate::cycle::{Branch, Stem, floor_mod};
use crate::element::Element;
use crate::error::{Result, SajuError};

/// Which time unit a pillar stands for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PillarKind {
    Year,
    Month,
    Day,
    Hour,
}

impl PillarKind {
    /// Korean label as used on a chart: 년주, 월주, 일주, 시주.
    pub fn label(self) -> &'static str {
        match self {
            PillarKind::Year => "년주",
            PillarKind::Month => "월주",
            PillarKind::Day => "일주",
            PillarKind::Hour => "시주",
        }
    }
}

/// An immutable (stem, branch) pair with its derived element pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Pillar {
    pub stem: Stem,
    pub branch: Branch,
    /// `[stem element, branch element]`.
    pub elements: [Element; 2],
}

impl Pillar {
    pub fn new(stem: Stem, branch: Branch) -> Self {
        Self {
            stem,
            branch,
            elements: [stem.element(), branch.element()],
        }
    }

    pub fn from_indices(stem: i64, branch: i64) -> Self {
        Self::new(Stem::from_index(stem), Branch::from_index(branch))
    }

    /// Hangul name, e.g. "경오".
    pub fn name(&self) -> String {
        format!("{}{}", self.stem.hangul(), self.branch.hangul())
    }

    /// Hanja name, e.g. "庚午".
    pub fn hanja(&self) -> String {
        format!("{}{}", self.stem.hanja(), self.branch.hanja())
    }

    /// Position in the 60-cycle (갑자 = 0). Only meaningful for pairs whose
    /// stem and branch indices share parity, which every computed pillar does.
    pub fn cycle_index(&self) -> usize {
        let s = self.stem.index() as i64;
        let b = self.branch.index() as i64;
        floor_mod(6 * s - 5 * b, CYCLE_LEN) as usize
    }
}

impl fmt::Display for Pillar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.stem, self.branch)
    }
}

/// Solar or lunar birth calendar. Lunar input is accepted but computed as
/// solar; no lunar conversion is performed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CalendarKind {
    #[default]
    Solar,
    Lunar,
}

/// A validated birth moment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BirthInput {
    pub date: CivilDate,
    /// Civil hour 0-23, `None` when unknown.
    pub hour: Option<u32>,
    pub calendar: CalendarKind,
}

impl BirthInput {
    pub fn new(year: i32, month: u32, day: u32, hour: Option<u32>) -> Result<Self> {
        let date = CivilDate::new(year, month, day)?;
        if let Some(h) = hour
            && h > 23
        {
            return Err(SajuError::InvalidHour(h));
        }
        Ok(Self {
            date,
            hour,
            calendar: CalendarKind::Solar,
        })
    }

    pub fn with_calendar(mut self, calendar: CalendarKind) -> Self {
        self.calendar = calendar;
        self
    }
}

/// The computed chart: three or four pillars plus their element balance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SajuResult {
    pub year: Pillar,
    pub month: Pillar,
    pub day: Pillar,
    pub hour: Option<Pillar>,
    pub balance: Balance,
    pub dominant: Element,
    pub weak: Element,
}

impl SajuResult {
    /// Pillars in chart order (year, month, day, hour if known).
    pub fn pillars(&self) -> impl Iterator<Item = (PillarKind, &Pillar)> {
        [
            Some((PillarKind::Year, &self.year)),
            Some((PillarKind::Month, &self.month)),
            Some((PillarKind::Day, &self.day)),
            self.hour.as_ref().map(|p| (PillarKind::Hour, p)),
        ]
        .into_iter()
        .flatten()
    }

    pub fn pillar_count(&self) -> usize {
        if self.hour.is_some() { 4 } else { 3 }
    }
}

/// Year pillar: 1984 is 갑자, civil January 1 is the year boundary.
pub fn year_pillar(year: i32) -> Pillar {
    let diff = year as i64 - YEAR_ANCHOR as i64;
    Pillar::from_indices(diff, diff)
}

/// Month pillar: the stem cycle restarts from the year stem (년간 기준),
/// calendar month 1 is 인.
pub fn month_pillar(year_stem: Stem, month: u32) -> Pillar {
    let start = (year_stem.index() as i64 % 5) * 2;
    let month = month as i64;
    Pillar::from_indices(start + month - 1, month + MONTH_BRANCH_OFFSET)
}

/// Day pillar: whole civil days from 1900-01-01 (갑진).
pub fn day_pillar(date: CivilDate) -> Pillar {
    let diff = DAY_ANCHOR.days_until(date);
    Pillar::from_indices(DAY_ANCHOR_STEM + diff, DAY_ANCHOR_BRANCH + diff)
}

/// Two-hour slot (0-11) for a civil hour; 23:00-00:59 is slot 0.
pub fn hour_slot(hour: u32) -> u32 {
    if hour >= 23 || hour < 1 {
        0
    } else {
        (hour + 1) / 2
    }
}

/// Hour pillar: the stem cycle restarts from the day stem (일간 기준).
pub fn hour_pillar(day_stem: Stem, hour: u32) -> Pillar {
    let slot = hour_slot(hour) as i64;
    let start = (day_stem.index() as i64 % 5) * 2;
    Pillar::from_indices(start + slot, slot)
}

/// Compute the chart for an already-validated birth moment.
pub fn compute_chart(input: &BirthInput) -> SajuResult {
    let year = year_pillar(input.date.year());
    let month = month_pillar(year.stem, input.date.month());
    let day = day_pillar(input.date);
    let hour = input.hour.map(|h| hour_pillar(day.stem, h));

    let balance = Balance::tally([&year, &month, &day].into_iter().chain(hour.as_ref()));
    let dominant = balance.dominant();
    let weak = balance.weakest();

    SajuResult {
        year,
        month,
        day,
        hour,
        balance,
        dominant,
        weak,
    }
}

/// Validate the raw fields and compute the chart.
///
/// Fails fast on an impossible calendar date or an hour outside 0-23.
pub fn compute_pillars(year: i32, month: u32, day: u32, hour: Option<u32>) -> Result<SajuResult> {
    let input = BirthInput::new(year, month, day, hour)?;
    Ok(compute_chart(&input))
}
