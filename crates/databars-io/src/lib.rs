//! Input/output operations for bar data
//!
//! CSV trade ingestion and CSV bar output are always available. Parquet and
//! Arrow IPC export sit behind the `polars` feature.

pub mod csv_reader;
pub mod csv_writer;

#[cfg(feature = "polars")]
pub mod formats;

#[cfg(feature = "polars")]
pub mod polars_io;

pub use csv_reader::{
    parse_datetime, ReadError, TimestampColumns, TradeCsvLayout, TradeCsvReader,
    DEFAULT_DATETIME_FORMAT,
};
pub use csv_writer::{format_date, format_scaled, BarCsvWriter, WriteError, BAR_DATE_FORMAT};

#[cfg(feature = "polars")]
pub use formats::{ConversionError, DataFrameConverter};

#[cfg(feature = "polars")]
pub use polars_io::{
    read_parquet_bars, ExportError, ExportResult, PolarsExporter, PolarsExporterConfig,
};
