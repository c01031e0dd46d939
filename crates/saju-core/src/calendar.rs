//! Proleptic-Gregorian civil dates (no chrono dependency).
//!
//! Uses Howard Hinnant's days_from_civil / civil_from_days algorithms to
//! move between (year, month, day) and a day number counted from
//! 1970-01-01. Dates carry no time of day and no timezone: a day is a
//! whole calendar day.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;
use std::time::{SystemTime, UNIX_EPOCH};

use regex::Regex;

use crate::error::{Result, SajuError};

static ISO_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(-?\d{1,6})-(\d{1,2})-(\d{1,2})\s*$").unwrap());

const SECS_PER_DAY: u64 = 86_400;

/// Current UTC time as Unix seconds.
pub fn now_unix_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Number of days in `month` (1-12) of `year`; 0 for an invalid month.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}

/// A validated calendar date.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CivilDate {
    year: i32,
    month: u32,
    day: u32,
}

impl CivilDate {
    pub fn new(year: i32, month: u32, day: u32) -> Result<Self> {
        if !(1..=12).contains(&month) || day == 0 || day > days_in_month(year, month) {
            return Err(SajuError::InvalidDate { year, month, day });
        }
        Ok(Self { year, month, day })
    }

    /// For compile-time constants that are known to be valid.
    pub(crate) const fn from_parts_unchecked(year: i32, month: u32, day: u32) -> Self {
        Self { year, month, day }
    }

    /// Today's date in UTC.
    pub fn today_utc() -> Self {
        Self::from_days((now_unix_secs() / SECS_PER_DAY) as i64)
    }

    pub fn year(self) -> i32 {
        self.year
    }

    pub fn month(self) -> u32 {
        self.month
    }

    pub fn day(self) -> u32 {
        self.day
    }

    /// Days since 1970-01-01 (negative before it).
    pub fn to_days(self) -> i64 {
        days_from_civil(self.year as i64, self.month as u64, self.day as u64)
    }

    /// Inverse of [`CivilDate::to_days`].
    pub fn from_days(days: i64) -> Self {
        let (y, m, d) = civil_from_days(days);
        Self {
            year: y as i32,
            month: m as u32,
            day: d as u32,
        }
    }

    /// Signed whole-day distance from `self` to `other` (other − self).
    pub fn days_until(self, other: CivilDate) -> i64 {
        other.to_days() - self.to_days()
    }

    pub fn add_days(self, days: i64) -> Self {
        Self::from_days(self.to_days() + days)
    }

    /// 1-based ordinal of this date within its year (Jan 1 = 1).
    pub fn day_of_year(self) -> u32 {
        let jan1 = days_from_civil(self.year as i64, 1, 1);
        (self.to_days() - jan1) as u32 + 1
    }
}

impl fmt::Display for CivilDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

impl FromStr for CivilDate {
    type Err = SajuError;

    fn from_str(s: &str) -> Result<Self> {
        let caps = ISO_DATE
            .captures(s)
            .ok_or_else(|| SajuError::InvalidDateFormat(s.to_string()))?;
        let field = |i: usize| caps[i].parse::<i64>();
        match (field(1), field(2), field(3)) {
            (Ok(y), Ok(m), Ok(d)) => CivilDate::new(y as i32, m as u32, d as u32),
            _ => Err(SajuError::InvalidDateFormat(s.to_string())),
        }
    }
}

/// Howard Hinnant's days_from_civil: (year, month, day) → Unix epoch days.
fn days_from_civil(year: i64, month: u64, day: u64) -> i64 {
    let y = if month <= 2 { year - 1 } else { year };
    let era = (if y >= 0 { y } else { y - 399 }) / 400;
    let yoe = (y - era * 400) as u64;
    let mp = if month > 2 { month - 3 } else { month + 9 };
    let doy = (153 * mp + 2) / 5 + day - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * 146_097 + doe as i64 - 719_468
}

/// Howard Hinnant's civil_from_days: Unix epoch days → (year, month, day).
fn civil_from_days(days: i64) -> (i64, u64, u64) {
    let z = days + 719_468;
    let era = (if z >= 0 { z } else { z - 146_096 }) / 146_097;
    let doe = (z - era * 146_097) as u64;
    let yoe = (doe - doe / 1460 + doe / 36524 - doe / 146_096) / 365;
    let y = yoe as i64 + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = doy - (153 * mp + 2) / 5 + 1;
    let m = if mp < 10 { mp + 3 } else { mp - 9 };
    let y = if m <= 2 { y + 1 } else { y };
    (y, m, d)
}
