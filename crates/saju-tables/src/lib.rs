//! Knowledge tables for the saju engine: per-element metadata and food
//! lists plus the pizza-topping metaphors.
//!
//! Defaults are compiled in from `data/`. An override directory may supply
//! `elements.{json,toml}` and `toppings.{json,toml}`; either way the result
//! is validated to cover all five elements before it is handed out.

pub mod error;
pub mod loader;

pub use error::{Result, TablesError};
pub use loader::{
    Format, load, load_default, load_from_dir, load_from_str, parse_elements, parse_toppings,
};
