//! Configuration loading and representation.
//!
//! Sources, in the order callers typically try them: a JSON document
//! ([`EngineConfig::from_json`]) or `SPLITLEDGER_*` environment variables
//! ([`EngineConfig::from_env`]). Missing keys fall back to defaults.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use splitledger_engine::EngineSettings;
use splitledger_observability::{LogConfig, LogFormat};

pub const ENV_FUTURE_DATE_TOLERANCE_SECS: &str = "SPLITLEDGER_FUTURE_DATE_TOLERANCE_SECS";
pub const ENV_LOG_FILTER: &str = "SPLITLEDGER_LOG_FILTER";
pub const ENV_LOG_FORMAT: &str = "SPLITLEDGER_LOG_FORMAT";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value `{value}` for {key}: {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("malformed configuration document: {0}")]
    Json(#[from] serde_json::Error),
}

impl ConfigError {
    fn invalid(key: &'static str, value: impl Into<String>, reason: impl ToString) -> Self {
        Self::InvalidValue {
            key,
            value: value.into(),
            reason: reason.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Seconds an expense date may lie after the processing time.
    pub future_date_tolerance_secs: u64,
    pub log: LogConfig,
}

impl EngineConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (environment, test maps).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_FUTURE_DATE_TOLERANCE_SECS) {
            config.future_date_tolerance_secs = raw
                .trim()
                .parse()
                .map_err(|e| ConfigError::invalid(ENV_FUTURE_DATE_TOLERANCE_SECS, raw.as_str(), e))?;
        }
        if let Some(filter) = lookup(ENV_LOG_FILTER) {
            config.log.filter = filter;
        }
        if let Some(raw) = lookup(ENV_LOG_FORMAT) {
            config.log.format = raw
                .parse::<LogFormat>()
                .map_err(|e| ConfigError::invalid(ENV_LOG_FORMAT, raw.as_str(), e))?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn from_json(document: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(document)?;
        config.validate()?;
        Ok(config)
    }

    pub fn engine_settings(&self) -> Result<EngineSettings, ConfigError> {
        Ok(EngineSettings {
            future_date_tolerance: self.future_date_tolerance()?,
        })
    }

    fn future_date_tolerance(&self) -> Result<Duration, ConfigError> {
        i64::try_from(self.future_date_tolerance_secs)
            .ok()
            .and_then(Duration::try_seconds)
            .ok_or_else(|| {
                ConfigError::invalid(
                    ENV_FUTURE_DATE_TOLERANCE_SECS,
                    self.future_date_tolerance_secs.to_string(),
                    "out of range",
                )
            })
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.future_date_tolerance().map(|_| ())
    }
}
