//! Configuration loader

use config::{Config, Environment, File};
use std::path::Path;

use super::types::AppConfig;
use crate::common::errors::{GatekeeperError, Result};

/// Load configuration from file and environment variables
///
/// Priority (highest to lowest):
/// 1. Environment variables (prefixed with GATEKEEPER__)
/// 2. Configuration file (TOML format)
/// 3. Default values
pub fn load_config(config_path: Option<&str>) -> Result<AppConfig> {
    let mut builder = Config::builder();

    // Add default config file if it exists
    if let Some(path) = config_path {
        if Path::new(path).exists() {
            builder = builder.add_source(File::with_name(path).required(false));
        }
    }

    // Add environment variables with GATEKEEPER prefix,
    // e.g. GATEKEEPER__TRIAGE__MIN_VOLUME=75000
    builder = builder.add_source(
        Environment::with_prefix("GATEKEEPER")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder
        .build()
        .map_err(|e| GatekeeperError::Configuration(e.to_string()))?;

    let config: AppConfig = config
        .try_deserialize()
        .map_err(|e| GatekeeperError::Configuration(e.to_string()))?;

    config.validate()?;
    Ok(config)
}

/// Load configuration from environment variables only
///
/// Flat variable names mirror the original deployment style
/// (ROLLING_WINDOW_SECONDS, MIN_VOLUME, ...); unset or unparseable
/// values fall back to the documented defaults.
pub fn load_from_env() -> Result<AppConfig> {
    // Try to load from .env file
    dotenvy::dotenv().ok();

    let mut config = AppConfig::default();

    if let Some(v) = env_parse("ROLLING_WINDOW_SECONDS") {
        config.triage.rolling_window_seconds = v;
    }
    if let Some(v) = env_parse("MIN_VOLUME") {
        config.triage.min_volume = v;
    }
    if let Some(v) = env_parse("MIN_RVOL") {
        config.triage.min_rvol = v;
    }
    if let Some(v) = env_parse("CONFLUENCE_THRESHOLD") {
        config.triage.confluence_threshold = v;
    }
    if let Some(v) = env_parse("TECH_SCORE_THRESHOLD") {
        config.triage.tech_score_threshold = v;
    }
    if let Ok(v) = std::env::var("LOG_LEVEL") {
        config.settings.log_level = v;
    }

    config.validate()?;
    Ok(config)
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}
