//! Layered configuration: TOML file, then environment, then flags.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

pub const DEFAULT_BIND: &str = "127.0.0.1:3000";
pub const DEFAULT_BASE_URL: &str = "https://api.x.ai/v1";
pub const DEFAULT_MODEL: &str = "grok-2-latest";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub server: ServerConfig,
    pub tables: TablesConfig,
    pub narrator: NarratorConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TablesConfig {
    /// Directory holding `elements.{json,toml}` and `toppings.{json,toml}`.
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NarratorConfig {
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
    pub enabled: bool,
}

impl Default for NarratorConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            enabled: true,
        }
    }
}

impl NarratorConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Config {
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).context("invalid config file")
    }

    /// Read the file named by `path`, else by `SAJU_CONFIG`, else use defaults.
    /// Environment overrides are applied on top.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os("SAJU_CONFIG").map(PathBuf::from));

        let mut config = match path {
            Some(path) => {
                let content = std::fs::read_to_string(&path)
                    .with_context(|| format!("failed to read config {}", path.display()))?;
                tracing::debug!("loaded config from {}", path.display());
                Self::from_toml(&content)?
            }
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Apply `SAJU_BIND`, `SAJU_TABLES_DIR`, `GROK_API_KEY` and
    /// `GROK_API_BASE_URL`. Empty values are ignored.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(bind) = get("SAJU_BIND") {
            self.server.bind = bind;
        }
        if let Some(dir) = get("SAJU_TABLES_DIR") {
            self.tables.dir = Some(PathBuf::from(dir));
        }
        if let Some(key) = get("GROK_API_KEY") {
            self.narrator.api_key = Some(key);
        }
        if let Some(url) = get("GROK_API_BASE_URL") {
            self.narrator.base_url = url;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.bind, "127.0.0.1:3000");
        assert_eq!(config.tables.dir, None);
        assert_eq!(config.narrator.base_url, "https://api.x.ai/v1");
        assert_eq!(config.narrator.model, "grok-2-latest");
        assert_eq!(config.narrator.timeout(), Duration::from_secs(30));
        assert!(config.narrator.enabled);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = Config::from_toml(
            r#"
            [narrator]
            model = "grok-beta"
            timeout_secs = 5
            "#,
        )
        .unwrap();
        assert_eq!(config.narrator.model, "grok-beta");
        assert_eq!(config.narrator.timeout_secs, 5);
        assert_eq!(config.narrator.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.server.bind, DEFAULT_BIND);
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(Config::from_toml("[server]\nport = 80\n").is_err());
    }

    #[test]
    fn test_env_overrides_file() {
        let mut config = Config::from_toml(
            r#"
            [server]
            bind = "0.0.0.0:8080"
            [tables]
            dir = "/etc/saju"
            "#,
        )
        .unwrap();
        let env: HashMap<&str, &str> = [
            ("SAJU_BIND", "127.0.0.1:9999"),
            ("GROK_API_KEY", "secret"),
            ("GROK_API_BASE_URL", ""),
        ]
        .into();
        config.apply_env(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.server.bind, "127.0.0.1:9999");
        assert_eq!(config.tables.dir, Some(PathBuf::from("/etc/saju")));
        assert_eq!(config.narrator.api_key.as_deref(), Some("secret"));
        // empty value does not clobber
        assert_eq!(config.narrator.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("saju.toml");
        std::fs::write(&path, "[narrator]\nenabled = false\n").unwrap();
        let config = Config::load(Some(&path)).unwrap();
        assert!(!config.narrator.enabled);
    }

    #[test]
    fn test_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::load(Some(&dir.path().join("nope.toml"))).is_err());
    }
}
