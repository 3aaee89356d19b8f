//! Export and output configuration

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Export and output configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExportConfig {
    /// Directory for outputs given as bare file names
    pub output_dir: PathBuf,

    /// Output format when the path has no recognized extension
    pub format: OutputFormat,

    /// Decimal places written for prices, volume and vwap in CSV output
    pub float_precision: usize,
}

/// Supported output formats
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Comma-separated values
    Csv,
    /// Apache Parquet format (requires the `polars` feature of databars-io)
    Parquet,
    /// Arrow IPC / Feather v2 (requires the `polars` feature of databars-io)
    Ipc,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Parquet => "parquet",
            OutputFormat::Ipc => "arrow",
        }
    }

    /// Infer the format from a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
            "csv" => Some(OutputFormat::Csv),
            "parquet" => Some(OutputFormat::Parquet),
            "arrow" | "ipc" | "feather" => Some(OutputFormat::Ipc),
            _ => None,
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Parquet => "parquet",
            OutputFormat::Ipc => "ipc",
        };
        f.write_str(name)
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(OutputFormat::Csv),
            "parquet" => Ok(OutputFormat::Parquet),
            "ipc" | "arrow" => Ok(OutputFormat::Ipc),
            other => Err(format!("unknown output format '{other}': expected csv, parquet or ipc")),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("./output"),
            format: OutputFormat::Csv,
            float_precision: 8,
        }
    }
}

impl ExportConfig {
    /// Place bare file names under `output_dir`; paths with a directory are kept as is
    pub fn resolve_output_path(&self, output: &Path) -> PathBuf {
        let has_dir = output
            .parent()
            .is_some_and(|parent| !parent.as_os_str().is_empty());
        if output.is_absolute() || has_dir {
            output.to_path_buf()
        } else {
            self.output_dir.join(output)
        }
    }

    /// Format for `output`: explicit extension wins over the configured default
    pub fn format_for(&self, output: &Path) -> OutputFormat {
        OutputFormat::from_path(output).unwrap_or(self.format)
    }

    /// Validate export configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.float_precision > 8 {
            return Err(format!(
                "float_precision {} exceeds the 8 decimals carried by prices",
                self.float_precision
            ));
        }
        Ok(())
    }
}
