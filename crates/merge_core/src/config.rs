//! Core runtime configuration.
//!
//! # Responsibility
//! - Group board, economy and remote settings in one serde document.
//! - Load that document from JSON with every field defaulted.
//!
//! # Invariants
//! - A missing section or field always falls back to its default.
//! - `remote.base_url = None` selects the offline remote.

use crate::engine::grid::BoardConfig;
use crate::repo::state_repo::DEFAULT_STATE_RECORD_KEY;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Coins granted by the first-run onboarding award.
pub const DEFAULT_ONBOARDING_AWARD: u64 = 500;
const DEFAULT_REMOTE_TIMEOUT_MS: u64 = 3_000;

/// Economy settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyConfig {
    pub onboarding_award: u64,
    pub state_record_key: String,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            onboarding_award: DEFAULT_ONBOARDING_AWARD,
            state_record_key: DEFAULT_STATE_RECORD_KEY.to_string(),
        }
    }
}

/// Remote authority settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Base URL; operations are posted to `{base_url}/{operation}`.
    pub base_url: Option<String>,
    /// Upper bound for one remote round-trip.
    pub timeout_ms: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_ms: DEFAULT_REMOTE_TIMEOUT_MS,
        }
    }
}

impl RemoteConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms.max(1))
    }
}

/// Top-level configuration document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    pub board: BoardConfig,
    pub economy: EconomyConfig,
    pub remote: RemoteConfig,
}

/// Configuration load errors.
#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse(serde_json::Error),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "config json is malformed: {err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

impl CoreConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Reads and parses a JSON config file.
pub fn load_config(path: impl AsRef<Path>) -> Result<CoreConfig, ConfigError> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    CoreConfig::from_json(&raw)
}

#[cfg(test)]
mod tests {
    use super::{load_config, ConfigError, CoreConfig, DEFAULT_ONBOARDING_AWARD};

    #[test]
    fn empty_document_yields_defaults() {
        let config = CoreConfig::from_json("{}").expect("empty config should parse");
        assert_eq!(config, CoreConfig::default());
        assert_eq!(config.economy.onboarding_award, DEFAULT_ONBOARDING_AWARD);
        assert_eq!(config.board.rows, 4);
        assert!(config.remote.base_url.is_none());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = CoreConfig::from_json(
            r#"{"board":{"rows":6},"remote":{"base_url":"http://localhost:8080"}}"#,
        )
        .expect("partial config should parse");
        assert_eq!(config.board.rows, 6);
        assert_eq!(config.board.cols, 4);
        assert_eq!(config.board.spawn_values, vec![2, 2, 4]);
        assert_eq!(config.remote.timeout_ms, 3_000);
    }

    #[test]
    fn missing_file_reports_path() {
        let err = load_config("/definitely/not/here.json").expect_err("missing file must fail");
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("/definitely/not/here.json"));
    }
}
