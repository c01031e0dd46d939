use crate::calendar::CivilDate;

/// Number of heavenly stems in the cycle.
pub const STEM_COUNT: i64 = 10;

/// Number of earthly branches in the cycle.
pub const BRANCH_COUNT: i64 = 12;

/// Length of the combined sexagenary cycle: lcm(10, 12).
pub const CYCLE_LEN: i64 = 60;

/// Reference year whose pillar is stem 0, branch 0 (갑자년).
/// Civil January 1 is the year boundary; no lunar new-year cutoff.
pub const YEAR_ANCHOR: i32 = 1984;

/// Reference date for the day pillar: 1900-01-01.
pub const DAY_ANCHOR: CivilDate = CivilDate::from_parts_unchecked(1900, 1, 1);

/// Stem index of the day-pillar anchor date.
pub const DAY_ANCHOR_STEM: i64 = 0;

/// Branch index of the day-pillar anchor date (진). The epoch is
/// deliberately not aligned to 갑자.
pub const DAY_ANCHOR_BRANCH: i64 = 4;

/// Calendar month 1 maps to branch 2 (인): branch = (month + offset) mod 12.
pub const MONTH_BRANCH_OFFSET: i64 = 1;

/// Number of foods taken from each knowledge-table list.
pub const FOOD_PICKS: usize = 3;

/// Size of the "weakest elements" pool that today's boost is drawn from.
pub const BOOST_POOL: usize = 2;
