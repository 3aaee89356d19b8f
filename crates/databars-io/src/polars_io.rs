//! Polars-based columnar export of bar series
//!
//! Parquet and Arrow IPC writers built on [`DataFrameConverter`]. Values stay
//! in their raw fixed-point form so a file read back yields identical bars.

use crate::formats::{ConversionError, DataFrameConverter};
use databars_core::Bar;
use polars::prelude::*;
use std::fs::File;
use std::path::Path;
use thiserror::Error;
use tracing::info;

/// Polars exporter configuration
#[derive(Debug, Clone)]
pub struct PolarsExporterConfig {
    /// Row group size for Parquet files
    pub parquet_row_group_size: Option<usize>,

    /// Whether to use statistics in Parquet files
    pub parquet_statistics: bool,
}

impl Default for PolarsExporterConfig {
    fn default() -> Self {
        Self {
            parquet_row_group_size: Some(100_000),
            parquet_statistics: true,
        }
    }
}

/// Columnar exporter for bar series
#[derive(Debug, Default)]
pub struct PolarsExporter {
    config: PolarsExporterConfig,
}

impl PolarsExporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: PolarsExporterConfig) -> Self {
        Self { config }
    }

    /// Export bars to Parquet (Snappy compressed)
    pub fn export_parquet<P: AsRef<Path>>(
        &self,
        bars: &[Bar],
        path: P,
    ) -> Result<ExportResult, ExportError> {
        let path = path.as_ref();
        let mut df = to_dataframe(bars)?;
        let mut file = create_file(path, "parquet")?;

        ParquetWriter::new(&mut file)
            .with_compression(ParquetCompression::Snappy)
            .with_row_group_size(self.config.parquet_row_group_size)
            .with_statistics(if self.config.parquet_statistics {
                StatisticsOptions::default()
            } else {
                StatisticsOptions::empty()
            })
            .finish(&mut df)
            .map_err(|e| write_failed("parquet", path, e))?;

        info!(path = %path.display(), bars = bars.len(), "wrote parquet");
        Ok(ExportResult::new(bars.len(), path))
    }

    /// Export bars to Arrow IPC (Feather v2)
    pub fn export_arrow_ipc<P: AsRef<Path>>(
        &self,
        bars: &[Bar],
        path: P,
    ) -> Result<ExportResult, ExportError> {
        let path = path.as_ref();
        let mut df = to_dataframe(bars)?;
        let mut file = create_file(path, "arrow")?;

        polars::io::ipc::IpcWriter::new(&mut file)
            .finish(&mut df)
            .map_err(|e| write_failed("arrow", path, e))?;

        info!(path = %path.display(), bars = bars.len(), "wrote arrow ipc");
        Ok(ExportResult::new(bars.len(), path))
    }
}

/// Read a bar series previously written by [`PolarsExporter::export_parquet`]
pub fn read_parquet_bars<P: AsRef<Path>>(path: P) -> Result<Vec<Bar>, ExportError> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let df = ParquetReader::new(file)
        .finish()
        .map_err(|source| ExportError::ConversionFailed {
            source: ConversionError::PolarsError(source),
        })?;
    Vec::<Bar>::from_polars_dataframe(df).map_err(|source| ExportError::ConversionFailed { source })
}

fn to_dataframe(bars: &[Bar]) -> Result<DataFrame, ExportError> {
    if bars.is_empty() {
        return Err(ExportError::EmptyData);
    }
    bars.to_vec()
        .to_polars_dataframe()
        .map_err(|e| ExportError::ConversionFailed {
            source: ConversionError::PolarsError(e),
        })
}

fn create_file(path: &Path, format: &str) -> Result<File, ExportError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    File::create(path).map_err(|e| write_failed(format, path, e))
}

fn write_failed<E>(format: &str, path: &Path, source: E) -> ExportError
where
    E: std::error::Error + Send + Sync + 'static,
{
    ExportError::WriteFailed {
        format: format.to_string(),
        path: path.to_string_lossy().to_string(),
        source: Box::new(source),
    }
}

/// Outcome of a columnar export
#[derive(Debug, Clone)]
pub struct ExportResult {
    pub records_written: usize,
    pub file_path: String,
}

impl ExportResult {
    fn new(records_written: usize, path: &Path) -> Self {
        Self {
            records_written,
            file_path: path.to_string_lossy().to_string(),
        }
    }
}

/// Export operation errors
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("No data to export")]
    EmptyData,

    #[error("Data conversion failed")]
    ConversionFailed {
        #[source]
        source: ConversionError,
    },

    #[error("Failed to write {format} file to '{path}'")]
    WriteFailed {
        format: String,
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use databars_core::test_utils::generators;
    use databars_core::{create_bars, BarSpec};
    use tempfile::tempdir;

    fn sample_bars() -> Vec<Bar> {
        let trades = generators::create_random_walk_trades(2_000, 17);
        create_bars(&trades, &BarSpec::tick(50).unwrap())
            .unwrap()
            .into_bars()
    }

    #[test]
    fn test_parquet_export_round_trip() {
        let bars = sample_bars();
        let temp_dir = tempdir().unwrap();
        let file_path = temp_dir.path().join("bars.parquet");

        let result = PolarsExporter::new()
            .export_parquet(&bars, &file_path)
            .unwrap();
        assert_eq!(result.records_written, 40);
        assert!(file_path.exists());

        assert_eq!(read_parquet_bars(&file_path).unwrap(), bars);
    }

    #[test]
    fn test_arrow_export() {
        let bars = sample_bars();
        let temp_dir = tempdir().unwrap();
        let file_path = temp_dir.path().join("nested").join("bars.arrow");

        let result = PolarsExporter::new()
            .export_arrow_ipc(&bars, &file_path)
            .unwrap();
        assert_eq!(result.records_written, bars.len());
        assert!(file_path.exists());
    }

    #[test]
    fn test_empty_export_rejected() {
        let temp_dir = tempdir().unwrap();
        let err = PolarsExporter::new()
            .export_parquet(&[], temp_dir.path().join("empty.parquet"))
            .unwrap_err();
        assert!(matches!(err, ExportError::EmptyData));
    }
}
