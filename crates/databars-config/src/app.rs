//! Application-wide configuration settings

use serde::{Deserialize, Serialize};
use std::fmt;

/// Application-wide configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Application name for logging and identification
    pub name: String,

    /// Application version
    pub version: String,

    /// Fallback log level when `RUST_LOG` is unset
    pub log_level: LogLevel,

    /// Number of worker threads for parallel aggregation
    pub worker_threads: Option<usize>,
}

/// Log level configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: "databars".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            log_level: LogLevel::Info,
            worker_threads: None, // Auto-detect from system
        }
    }
}

impl AppConfig {
    /// Get the number of worker threads, auto-detecting if not specified
    pub fn worker_threads(&self) -> usize {
        self.worker_threads.unwrap_or_else(num_cpus::get).max(1)
    }

    /// Default `EnvFilter` directive: the configured level for every databars crate
    pub fn log_directive(&self) -> String {
        format!("databars={level},databars_core={level},databars_io={level},databars_cli={level}", level = self.log_level)
    }

    /// Check if running with debug-level logging
    pub fn is_debug(&self) -> bool {
        matches!(self.log_level, LogLevel::Debug | LogLevel::Trace)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worker_threads_auto_detect() {
        let config = AppConfig::default();
        let threads = config.worker_threads();

        // Should auto-detect from system
        assert!(threads > 0);
        assert!(threads <= 1024); // Reasonable upper bound
    }

    #[test]
    fn test_worker_threads_explicit() {
        let config = AppConfig {
            worker_threads: Some(0),
            ..AppConfig::default()
        };
        assert_eq!(config.worker_threads(), 1);
    }

    #[test]
    fn test_log_directive() {
        let mut config = AppConfig::default();
        assert!(!config.is_debug());
        assert!(config.log_directive().starts_with("databars=info,"));

        config.log_level = LogLevel::Debug;
        assert!(config.is_debug());
        assert!(config.log_directive().contains("databars_core=debug"));
    }
}
