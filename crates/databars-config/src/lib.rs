//! Configuration management for databars
//!
//! Centralized configuration handling with support for:
//! - Default values
//! - Configuration files (TOML)
//! - Environment variables
//! - Command-line arguments
//!
//! Configuration precedence (highest to lowest):
//! 1. Command-line arguments
//! 2. Environment variables (`DATABARS_<SECTION>__<KEY>`, e.g. `DATABARS_BARS__DEFAULT_UNITS`)
//! 3. Configuration file (`databars.toml`)
//! 4. Default values

mod app;
mod bars;
mod export;
mod input;

// Re-export main types
pub use app::{AppConfig, LogLevel};
pub use bars::BarsConfig;
pub use export::{ExportConfig, OutputFormat};
pub use input::InputConfig;

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Root configuration structure containing all configuration categories
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Application-wide settings
    pub app: AppConfig,

    /// Bar construction defaults
    pub bars: BarsConfig,

    /// Trade file layout
    pub input: InputConfig,

    /// Export and output configuration
    pub export: ExportConfig,
}

impl Settings {
    /// Load configuration from multiple sources with proper precedence
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::build(
            config::File::with_name("databars")
                .format(config::FileFormat::Toml)
                .required(false),
        )
    }

    /// Load configuration from a specific file path (environment still applies)
    pub fn load_from_file(path: &Path) -> Result<Self, config::ConfigError> {
        Self::build(config::File::from(path).format(config::FileFormat::Toml))
    }

    fn build<S>(file: S) -> Result<Self, config::ConfigError>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let config = config::Config::builder()
            // Start with defaults
            .add_source(config::Config::try_from(&Settings::default())?)
            .add_source(file)
            // Add environment variables with DATABARS_ prefix
            .add_source(
                config::Environment::with_prefix("DATABARS")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        let settings: Settings = config.try_deserialize()?;
        settings.validate().map_err(config::ConfigError::Message)?;
        Ok(settings)
    }

    /// Merge command-line arguments into the loaded configuration
    pub fn merge_cli_args(mut self, cli_args: &dyn CliConfigMerge) -> Self {
        cli_args.merge_into_config(&mut self);
        self
    }

    /// Validate cross-field constraints of every section
    pub fn validate(&self) -> Result<(), String> {
        self.input.validate()?;
        self.export.validate()?;
        self.bars
            .spec(None, None)
            .map_err(|e| format!("bars defaults: {e}"))?;
        Ok(())
    }
}

/// Trait for merging CLI arguments into configuration
pub trait CliConfigMerge {
    fn merge_into_config(&self, config: &mut Settings);
}

#[cfg(test)]
mod tests {
    use super::*;
    use databars_core::{BarKind, EmptyIntervalPolicy};
    use std::io::Write;
    use std::path::PathBuf;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();

        assert_eq!(settings.app.name, "databars");
        assert_eq!(settings.bars.default_kind, BarKind::Tick);
        assert_eq!(settings.input.price_column, "Price");
        assert_eq!(settings.export.output_dir, PathBuf::from("./output"));
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_settings_serialization() {
        let settings = Settings::default();

        let toml_str = toml::to_string(&settings).expect("Failed to serialize to TOML");
        let back: Settings = toml::from_str(&toml_str).expect("Failed to deserialize from TOML");
        assert_eq!(back, settings);
    }

    #[test]
    fn test_load_from_file_partial_override() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[bars]
default_kind = "dollar"
default_units = 35638840.0
empty_intervals = "carry-forward"

[export]
float_precision = 4
"#
        )
        .unwrap();

        let settings = Settings::load_from_file(file.path()).unwrap();
        assert_eq!(settings.bars.default_kind, BarKind::Dollar);
        assert_eq!(settings.bars.default_units, 35_638_840.0);
        assert_eq!(settings.bars.empty_intervals, EmptyIntervalPolicy::CarryForward);
        assert_eq!(settings.export.float_precision, 4);
        // Untouched sections keep their defaults
        assert_eq!(settings.input, InputConfig::default());
    }

    #[test]
    fn test_load_rejects_invalid_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[bars]\ndefault_units = -1.0").unwrap();
        assert!(Settings::load_from_file(file.path()).is_err());
    }

    struct Overrides {
        units: Option<f64>,
    }

    impl CliConfigMerge for Overrides {
        fn merge_into_config(&self, config: &mut Settings) {
            if let Some(units) = self.units {
                config.bars.default_units = units;
            }
        }
    }

    #[test]
    fn test_cli_merge() {
        let settings = Settings::default().merge_cli_args(&Overrides { units: Some(50.0) });
        assert_eq!(settings.bars.default_units, 50.0);

        let untouched = Settings::default().merge_cli_args(&Overrides { units: None });
        assert_eq!(untouched.bars.default_units, 1000.0);
    }
}
