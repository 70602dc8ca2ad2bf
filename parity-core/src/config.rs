use std::env;
use std::path::PathBuf;

use crate::errors::{ConfigError, ParityError};

/// Runtime environment used by the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    fn from_str(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "production" | "prod" => Environment::Production,
            "staging" | "stage" => Environment::Staging,
            _ => Environment::Development,
        }
    }
}

/// Process-wide configuration for an assessment run.
#[derive(Debug, Clone)]
pub struct CoreConfig {
    /// Root directory of the filesystem config store, if any.
    pub config_dir: Option<PathBuf>,
    /// Region used when a caller does not name one explicitly.
    pub default_target_region: Option<String>,
    pub log_level: String,
    pub environment: Environment,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            config_dir: None,
            default_target_region: None,
            log_level: "info".to_string(),
            environment: Environment::Development,
        }
    }
}

impl CoreConfig {
    /// Loads configuration from the process environment (`PARITY_*` variables).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_env_with_prefix("PARITY_")
    }

    /// Loads configuration from env vars prefixed with the provided value (e.g. `ASSESS_`).
    pub fn from_env_with_prefix(prefix: &str) -> Result<Self, ConfigError> {
        let key = |suffix: &str| format!("{}{}", prefix, suffix);

        let config_dir = env::var(key("CONFIG_DIR")).ok().map(PathBuf::from);
        let default_target_region = env::var(key("TARGET_REGION"))
            .ok()
            .filter(|region| !region.trim().is_empty());

        let level_key = key("LOG_LEVEL");
        let log_level = match env::var(&level_key) {
            Ok(raw) => parse_level(&level_key, &raw)?,
            Err(_) => "info".to_string(),
        };

        let environment = env::var(key("ENV"))
            .map(|raw| Environment::from_str(&raw))
            .unwrap_or_default();

        Ok(Self {
            config_dir,
            default_target_region,
            log_level,
            environment,
        })
    }

    /// Returns the config store directory or a missing-variable error.
    pub fn require_config_dir(&self) -> Result<&PathBuf, ConfigError> {
        self.config_dir
            .as_ref()
            .ok_or_else(|| ConfigError::MissingEnvVar("PARITY_CONFIG_DIR".into()))
    }

    /// Whether the process is running in production.
    pub fn is_production(&self) -> bool {
        matches!(self.environment, Environment::Production)
    }
}

fn parse_level(key: &str, raw: &str) -> Result<String, ConfigError> {
    let level = raw.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" | "off" => Ok(level),
        _ => Err(ConfigError::InvalidEnvVar {
            key: key.to_string(),
            value: raw.to_string(),
        }),
    }
}

/// Helper that loads config and converts to the canonical error type.
pub fn load_core_config() -> Result<CoreConfig, ParityError> {
    Ok(CoreConfig::from_env()?)
}
