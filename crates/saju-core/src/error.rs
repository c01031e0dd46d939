use std::fmt;

use crate::element::Element;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SajuError {
    /// Not a real proleptic-Gregorian date (month 13, Feb 30, ...).
    InvalidDate { year: i32, month: u32, day: u32 },
    /// Hour outside 0..=23.
    InvalidHour(u32),
    /// A date string that is not `YYYY-MM-DD`.
    InvalidDateFormat(String),
    /// A knowledge table is missing one of the five elements.
    MissingElement {
        table: &'static str,
        element: Element,
    },
    /// A knowledge table lists the same element twice, e.g. as "wood" and "목".
    DuplicateElement {
        table: &'static str,
        element: Element,
    },
    /// An element name that is not one of the five.
    UnknownElement(String),
}

impl fmt::Display for SajuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SajuError::InvalidDate { year, month, day } => {
                write!(f, "invalid calendar date: {year:04}-{month:02}-{day:02}")
            }
            SajuError::InvalidHour(hour) => write!(f, "hour must be within 0-23, got {hour}"),
            SajuError::InvalidDateFormat(s) => {
                write!(f, "expected a YYYY-MM-DD date, got '{s}'")
            }
            SajuError::MissingElement { table, element } => {
                write!(f, "knowledge table '{table}' has no entry for '{element}'")
            }
            SajuError::DuplicateElement { table, element } => {
                write!(f, "knowledge table '{table}' lists '{element}' more than once")
            }
            SajuError::UnknownElement(s) => write!(f, "unknown element '{s}'"),
        }
    }
}

impl std::error::Error for SajuError {}

pub type Result<T> = std::result::Result<T, SajuError>;
