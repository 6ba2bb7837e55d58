//! Configuration types

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::common::errors::{GatekeeperError, Result};

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Triage thresholds and window timing
    #[serde(default)]
    pub triage: TriageConfig,
    /// Topic names for the transport boundary
    #[serde(default)]
    pub topics: TopicConfig,
    /// General application settings
    #[serde(default)]
    pub settings: AppSettings,
}

impl AppConfig {
    /// Validate cross-field constraints that serde defaults cannot express
    pub fn validate(&self) -> Result<()> {
        if self.triage.rolling_window_seconds == 0 {
            return Err(GatekeeperError::Configuration(
                "rolling_window_seconds must be greater than zero".to_string(),
            ));
        }
        if self.triage.confluence_threshold < 2 {
            return Err(GatekeeperError::Configuration(format!(
                "confluence_threshold must be at least 2, got {}",
                self.triage.confluence_threshold
            )));
        }
        if self.triage.min_rvol < 0.0 || !self.triage.min_rvol.is_finite() {
            return Err(GatekeeperError::Configuration(format!(
                "min_rvol must be a finite non-negative number, got {}",
                self.triage.min_rvol
            )));
        }
        if self.settings.publish_max_attempts == 0 {
            return Err(GatekeeperError::Configuration(
                "publish_max_attempts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Triage thresholds, immutable for the lifetime of a run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriageConfig {
    /// Rolling window duration in seconds
    #[serde(default = "default_rolling_window_seconds")]
    pub rolling_window_seconds: u64,
    /// Minimum pre-market volume a signal must carry
    #[serde(default = "default_min_volume")]
    pub min_volume: u64,
    /// Minimum relative volume a signal must carry
    #[serde(default = "default_min_rvol")]
    pub min_rvol: f64,
    /// Distinct-source count that fires the confluence rule
    #[serde(default = "default_confluence_threshold")]
    pub confluence_threshold: usize,
    /// Technical score above which a single signal fires on its own
    #[serde(default = "default_tech_score_threshold")]
    pub tech_score_threshold: f64,
}

impl TriageConfig {
    /// Rolling window as a chrono duration for deadline arithmetic
    pub fn rolling_window(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.rolling_window_seconds as i64)
    }
}

impl Default for TriageConfig {
    fn default() -> Self {
        Self {
            rolling_window_seconds: default_rolling_window_seconds(),
            min_volume: default_min_volume(),
            min_rvol: default_min_rvol(),
            confluence_threshold: default_confluence_threshold(),
            tech_score_threshold: default_tech_score_threshold(),
        }
    }
}

fn default_rolling_window_seconds() -> u64 {
    300
}

fn default_min_volume() -> u64 {
    50_000
}

fn default_min_rvol() -> f64 {
    1.5
}

fn default_confluence_threshold() -> usize {
    2
}

fn default_tech_score_threshold() -> f64 {
    70.0
}

/// Topic names used at the transport boundary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicConfig {
    /// Inbound raw signals from the hunters
    #[serde(default = "default_raw_signals_topic")]
    pub raw_signals: String,
    /// Released windows bound for the analysis layer
    #[serde(default = "default_validated_signals_topic")]
    pub validated_signals: String,
    /// Windows that expired without triggering
    #[serde(default = "default_cold_storage_topic")]
    pub cold_storage: String,
    /// Payloads whose publish retries exhausted
    #[serde(default = "default_dead_letter_topic")]
    pub dead_letter: String,
}

impl Default for TopicConfig {
    fn default() -> Self {
        Self {
            raw_signals: default_raw_signals_topic(),
            validated_signals: default_validated_signals_topic(),
            cold_storage: default_cold_storage_topic(),
            dead_letter: default_dead_letter_topic(),
        }
    }
}

fn default_raw_signals_topic() -> String {
    "raw-events".to_string()
}

fn default_validated_signals_topic() -> String {
    "validated-signals".to_string()
}

fn default_cold_storage_topic() -> String {
    "cold-storage".to_string()
}

fn default_dead_letter_topic() -> String {
    "dead-letter".to_string()
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Buffer size for the raw-signal inbox channel
    #[serde(default = "default_channel_buffer_size")]
    pub channel_buffer_size: usize,
    /// Sweeper period in seconds; when absent, rolling window / 5
    #[serde(default)]
    pub sweep_interval_seconds: Option<u64>,
    /// Maximum publish attempts before a payload goes to the dead-letter topic
    #[serde(default = "default_publish_max_attempts")]
    pub publish_max_attempts: u32,
    /// Base backoff between publish attempts in milliseconds
    #[serde(default = "default_publish_backoff_ms")]
    pub publish_backoff_ms: u64,
}

impl AppSettings {
    /// Effective sweeper period
    ///
    /// The sweeper must run a few times per rolling window so expired
    /// windows do not linger; the floor of one second avoids a
    /// zero-length interval for very short windows.
    pub fn sweep_interval(&self, triage: &TriageConfig) -> Duration {
        let seconds = self
            .sweep_interval_seconds
            .unwrap_or_else(|| (triage.rolling_window_seconds / 5).max(1));
        Duration::from_secs(seconds.max(1))
    }

    /// Base backoff between publish attempts
    pub fn publish_backoff(&self) -> Duration {
        Duration::from_millis(self.publish_backoff_ms)
    }
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            channel_buffer_size: default_channel_buffer_size(),
            sweep_interval_seconds: None,
            publish_max_attempts: default_publish_max_attempts(),
            publish_backoff_ms: default_publish_backoff_ms(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_channel_buffer_size() -> usize {
    1000
}

fn default_publish_max_attempts() -> u32 {
    3
}

fn default_publish_backoff_ms() -> u64 {
    250
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_documented_values() {
        let config = AppConfig::default();
        assert_eq!(config.triage.rolling_window_seconds, 300);
        assert_eq!(config.triage.min_volume, 50_000);
        assert_eq!(config.triage.min_rvol, 1.5);
        assert_eq!(config.triage.confluence_threshold, 2);
        assert_eq!(config.triage.tech_score_threshold, 70.0);
        assert_eq!(config.topics.validated_signals, "validated-signals");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_sweep_interval_defaults_to_fifth_of_window() {
        let config = AppConfig::default();
        assert_eq!(
            config.settings.sweep_interval(&config.triage),
            Duration::from_secs(60)
        );
    }

    #[test]
    fn test_sweep_interval_override() {
        let mut config = AppConfig::default();
        config.settings.sweep_interval_seconds = Some(5);
        assert_eq!(
            config.settings.sweep_interval(&config.triage),
            Duration::from_secs(5)
        );
    }

    #[test]
    fn test_validate_rejects_low_confluence_threshold() {
        let mut config = AppConfig::default();
        config.triage.confluence_threshold = 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_window() {
        let mut config = AppConfig::default();
        config.triage.rolling_window_seconds = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let toml = r#"
            [triage]
            min_volume = 10000
        "#;
        let config: AppConfig = toml_from_str(toml);
        assert_eq!(config.triage.min_volume, 10_000);
        assert_eq!(config.triage.rolling_window_seconds, 300);
        assert_eq!(config.topics.cold_storage, "cold-storage");
    }

    fn toml_from_str(raw: &str) -> AppConfig {
        config::Config::builder()
            .add_source(config::File::from_str(raw, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }
}
