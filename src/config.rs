//! Configuration System
//!
//! Provides hierarchical configuration loading from:
//! - config.toml (default configuration)
//! - config.local.toml (git-ignored local overrides)
//! - Environment variables (TERMLAYER_* prefix)
//!
//! ## Example
//!
//! ```toml
//! # config.toml
//! [retrieval]
//! count = 10
//! from_end = false
//! threshold = 0.001
//!
//! [performance]
//! num_threads = 0
//! ```
//!
//! Environment variable overrides:
//! ```bash
//! TERMLAYER_RETRIEVAL__THRESHOLD=0.01
//! TERMLAYER_PERFORMANCE__NUM_THREADS=4
//! ```

use figment::providers::{Env, Format, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

/// Main configuration struct.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Defaults applied by the four retrieval entry points.
    pub retrieval: RetrievalDefaults,

    /// Worker pool / collection sizing knobs.
    #[serde(default)]
    pub performance: PerformanceConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Default parameters for `retrieve_by_query(_single)` /
/// `retrieve_by_histogram(_single)`, per spec §6.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalDefaults {
    /// Maximum results returned.
    #[serde(default = "default_count")]
    pub count: usize,

    /// If true, sort ascending (lowest scores first); else descending.
    #[serde(default)]
    pub from_end: bool,

    /// Inclusive lower bound on score, standardized to `>=` across all
    /// four retrieval paths (see DESIGN.md, Open Question 4).
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

/// Performance tuning options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceConfig {
    /// Number of worker threads for parallel retrieval.
    /// 0 = use all available CPU cores (`rayon::current_num_threads`).
    #[serde(default)]
    pub num_threads: usize,

    /// Initial capacity hint for postings/histogram maps.
    #[serde(default = "default_initial_capacity")]
    pub initial_capacity: usize,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (text, json).
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_count() -> usize {
    10
}
fn default_threshold() -> f64 {
    0.001
}
fn default_initial_capacity() -> usize {
    1000
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "text".to_string()
}

impl Config {
    /// Load configuration from default locations.
    ///
    /// Merges in order:
    /// 1. config.toml (base configuration)
    /// 2. config.local.toml (local overrides, git-ignored)
    /// 3. Environment variables (TERMLAYER_* prefix)
    pub fn load() -> std::result::Result<Self, figment::Error> {
        Figment::new()
            .merge(Toml::file("config.toml"))
            .merge(Toml::file("config.local.toml"))
            .merge(Env::prefixed("TERMLAYER_").split("__"))
            .extract()
    }

    /// Load configuration from a specific file path.
    pub fn from_file(path: &str) -> std::result::Result<Self, figment::Error> {
        Figment::new()
            .merge(Toml::file(path))
            .merge(Env::prefixed("TERMLAYER_").split("__"))
            .extract()
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            retrieval: RetrievalDefaults {
                count: default_count(),
                from_end: false,
                threshold: default_threshold(),
            },
            performance: PerformanceConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for RetrievalDefaults {
    fn default() -> Self {
        RetrievalDefaults {
            count: default_count(),
            from_end: false,
            threshold: default_threshold(),
        }
    }
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        PerformanceConfig {
            num_threads: 0,
            initial_capacity: default_initial_capacity(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.retrieval.count, 10);
        assert!(!config.retrieval.from_end);
        assert!((config.retrieval.threshold - 0.001).abs() < f64::EPSILON);
        assert_eq!(config.performance.num_threads, 0);
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string(&config).unwrap();

        assert!(toml_str.contains("[retrieval]"));
        assert!(toml_str.contains("[performance]"));
        assert!(toml_str.contains("[logging]"));
    }
}
