//! Four Pillars (사주) calendrical engine.
//!
//! Converts a birth date and optional hour into year, month, day and hour
//! pillars of the 60-cycle (10 stems × 12 branches), maps every stem and
//! branch to one of the five elements, and turns the resulting balance into
//! dominant/weak elements plus a day-dependent recommendation.
//!
//! Zero I/O: pure arithmetic and table lookups, no opinions about
//! transport, rendering or where the knowledge tables come from.

pub mod analysis;
pub mod balance;
pub mod calendar;
pub mod constants;
pub mod cycle;
pub mod element;
pub mod error;
pub mod knowledge;
pub mod pillar;
pub mod wire;

pub use analysis::{OhengAnalysis, analyze, balance_description, today_boost};
pub use balance::Balance;
pub use calendar::CivilDate;
pub use cycle::{Branch, Stem, floor_mod};
pub use element::{Element, ElementMap};
pub use error::{Result, SajuError};
pub use knowledge::{ElementInfo, FoodRecommendation, KnowledgeTables, ToppingMetaphor};
pub use pillar::{
    BirthInput, CalendarKind, Pillar, PillarKind, SajuResult, compute_chart, compute_pillars,
    hour_slot,
};
pub use wire::{ChartReport, export_json};
