//! Optional TOML defaults for the log filter
//!
//! Looked up at `--config`, or `runlog.toml` in the working directory.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use runlog_types::LogLevel;

const DEFAULT_CONFIG_FILE: &str = "runlog.toml";

#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Levels shown by default (None = all)
    pub levels: Option<Vec<LogLevel>>,

    /// Hide records that do not match the query
    pub hide_non_matches: Option<bool>,

    /// Step keys matched by `query:` terms
    pub relevant_step_keys: Vec<String>,

    /// Print timestamps in local time instead of UTC
    pub local_time: bool,
}

impl Config {
    /// Load from an explicit path, or the default file if present
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default.is_file() {
                    Self::from_file(&default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let config = Config::parse(
            r#"
            levels = ["ERROR", "CRITICAL", "EVENT"]
            hide_non_matches = false
            relevant_step_keys = ["load_users"]
            local_time = true
            "#,
        )
        .unwrap();

        assert_eq!(
            config.levels,
            Some(vec![LogLevel::Error, LogLevel::Critical, LogLevel::Event])
        );
        assert_eq!(config.hide_non_matches, Some(false));
        assert_eq!(config.relevant_step_keys, vec!["load_users"]);
        assert!(config.local_time);
    }

    #[test]
    fn test_empty_config() {
        assert_eq!(Config::parse("").unwrap(), Config::default());
    }

    #[test]
    fn test_unknown_field_rejected() {
        assert!(Config::parse("colour = true").is_err());
    }
}
