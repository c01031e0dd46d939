use std::fmt;
use std::path::PathBuf;

use saju_core::SajuError;

#[derive(Debug)]
pub enum TablesError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Json(serde_json::Error),
    Toml(toml::de::Error),
    /// Parsed fine but does not cover every element.
    Invalid(SajuError),
    /// Neither a `.json` nor a `.toml` file for this table exists.
    NotFound { dir: PathBuf, table: &'static str },
}

impl fmt::Display for TablesError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TablesError::Io { path, source } => {
                write!(f, "failed to read {}: {source}", path.display())
            }
            TablesError::Json(e) => write!(f, "JSON error: {e}"),
            TablesError::Toml(e) => write!(f, "TOML error: {e}"),
            TablesError::Invalid(e) => write!(f, "invalid table: {e}"),
            TablesError::NotFound { dir, table } => write!(
                f,
                "no {table}.json or {table}.toml in {}",
                dir.display()
            ),
        }
    }
}

impl std::error::Error for TablesError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TablesError::Io { source, .. } => Some(source),
            TablesError::Json(e) => Some(e),
            TablesError::Toml(e) => Some(e),
            TablesError::Invalid(e) => Some(e),
            TablesError::NotFound { .. } => None,
        }
    }
}

impl From<serde_json::Error> for TablesError {
    fn from(e: serde_json::Error) -> Self {
        TablesError::Json(e)
    }
}

impl From<toml::de::Error> for TablesError {
    fn from(e: toml::de::Error) -> Self {
        TablesError::Toml(e)
    }
}

impl From<SajuError> for TablesError {
    fn from(e: SajuError) -> Self {
        TablesError::Invalid(e)
    }
}

pub type Result<T> = std::result::Result<T, TablesError>;
