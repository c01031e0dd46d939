use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use saju_core::{Element, ElementInfo, KnowledgeTables, SajuError, ToppingMetaphor};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::error::{Result, TablesError};

const DEFAULT_ELEMENTS: &str = include_str!("../data/elements.json");
const DEFAULT_TOPPINGS: &str = include_str!("../data/toppings.json");

/// Serialization format of a table file, chosen by extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    Json,
    Toml,
}

impl Format {
    fn extension(self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::Toml => "toml",
        }
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ToppingsFile {
    metaphors: HashMap<String, ToppingMetaphor>,
}

fn parse<T: DeserializeOwned>(content: &str, format: Format) -> Result<T> {
    Ok(match format {
        Format::Json => serde_json::from_str(content)?,
        Format::Toml => toml::from_str(content)?,
    })
}

/// Keys are element names ("wood", "목", "木" ...). Anything else is rejected,
/// and so is a second key naming an element already seen.
fn keyed<T>(table: &'static str, raw: HashMap<String, T>) -> Result<HashMap<Element, T>> {
    let mut keyed = HashMap::with_capacity(raw.len());
    for (key, value) in raw {
        let element: Element = key.parse()?;
        if keyed.insert(element, value).is_some() {
            return Err(SajuError::DuplicateElement { table, element }.into());
        }
    }
    Ok(keyed)
}

pub fn parse_elements(content: &str, format: Format) -> Result<HashMap<Element, ElementInfo>> {
    keyed("elements", parse(content, format)?)
}

pub fn parse_toppings(content: &str, format: Format) -> Result<HashMap<Element, ToppingMetaphor>> {
    let file: ToppingsFile = parse(content, format)?;
    keyed("toppings", file.metaphors)
}

/// Parse both tables from strings and check that each covers all five elements.
pub fn load_from_str(
    elements: &str,
    elements_format: Format,
    toppings: &str,
    toppings_format: Format,
) -> Result<KnowledgeTables> {
    let elements = parse_elements(elements, elements_format)?;
    let toppings = parse_toppings(toppings, toppings_format)?;
    Ok(KnowledgeTables::from_maps(elements, toppings)?)
}

/// The tables compiled into the binary.
pub fn load_default() -> Result<KnowledgeTables> {
    let tables = load_from_str(DEFAULT_ELEMENTS, Format::Json, DEFAULT_TOPPINGS, Format::Json)?;
    tracing::debug!("loaded embedded knowledge tables");
    Ok(tables)
}

/// `dir/<table>.json`, else `dir/<table>.toml`.
fn locate(dir: &Path, table: &'static str) -> Result<(PathBuf, Format)> {
    for format in [Format::Json, Format::Toml] {
        let path = dir.join(format!("{table}.{}", format.extension()));
        if path.is_file() {
            return Ok((path, format));
        }
    }
    Err(TablesError::NotFound {
        dir: dir.to_path_buf(),
        table,
    })
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| TablesError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Load `elements.{json,toml}` and `toppings.{json,toml}` from an override directory.
pub fn load_from_dir(dir: &Path) -> Result<KnowledgeTables> {
    let (elements_path, elements_format) = locate(dir, "elements")?;
    let (toppings_path, toppings_format) = locate(dir, "toppings")?;
    tracing::info!(
        "loading knowledge tables from {} and {}",
        elements_path.display(),
        toppings_path.display()
    );

    let elements = parse_elements(&read(&elements_path)?, elements_format)?;
    let toppings = parse_toppings(&read(&toppings_path)?, toppings_format)?;
    tracing::debug!(
        elements = elements.len(),
        toppings = toppings.len(),
        "parsed knowledge tables"
    );
    Ok(KnowledgeTables::from_maps(elements, toppings)?)
}

/// Override directory when given, embedded defaults otherwise.
pub fn load(dir: Option<&Path>) -> Result<KnowledgeTables> {
    match dir {
        Some(dir) => load_from_dir(dir),
        None => load_default(),
    }
}
