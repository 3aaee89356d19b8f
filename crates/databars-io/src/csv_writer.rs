//! Bar table CSV output
//!
//! Writes `date,open,high,low,close,volume,vwap` rows in series order. Dates
//! are UTC with microsecond precision; prices, volume and vwap are printed
//! from their exact fixed-point values.

use chrono::{DateTime, Utc};
use databars_core::{Bar, SCALE};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use thiserror::Error;
use tracing::info;

/// Output header, in column order
pub const BAR_COLUMNS: [&str; 7] = ["date", "open", "high", "low", "close", "volume", "vwap"];

/// chrono format of the `date` column
pub const BAR_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Decimal places carried by `FixedPoint`
const SCALE_DECIMALS: usize = 8;

#[derive(Debug, Error)]
pub enum WriteError {
    #[error("Failed to create '{path}'")]
    Create {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Bar dated {timestamp} is outside the representable date range")]
    DateOutOfRange { timestamp: i64 },
}

/// CSV writer for bar series
#[derive(Debug, Clone)]
pub struct BarCsvWriter {
    precision: usize,
    delimiter: u8,
}

impl Default for BarCsvWriter {
    fn default() -> Self {
        Self {
            precision: SCALE_DECIMALS,
            delimiter: b',',
        }
    }
}

impl BarCsvWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decimal places for numeric columns (capped at 8)
    pub fn with_precision(mut self, precision: usize) -> Self {
        self.precision = precision.min(SCALE_DECIMALS);
        self
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Write `bars` to a new file at `path`, returning the number of rows written
    pub fn write_path<P: AsRef<Path>>(&self, bars: &[Bar], path: P) -> Result<usize, WriteError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| WriteError::Create {
                path: parent.display().to_string(),
                source,
            })?;
        }
        let file = File::create(path).map_err(|source| WriteError::Create {
            path: path.display().to_string(),
            source,
        })?;

        let rows = self.write_to(bars, BufWriter::new(file))?;
        info!(path = %path.display(), bars = rows, "wrote bar csv");
        Ok(rows)
    }

    /// Write `bars` to any sink
    pub fn write_to<W: Write>(&self, bars: &[Bar], sink: W) -> Result<usize, WriteError> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(self.delimiter)
            .from_writer(sink);

        writer.write_record(BAR_COLUMNS)?;
        for bar in bars {
            writer.write_record(self.format_row(bar)?)?;
        }
        writer.flush()?;
        Ok(bars.len())
    }

    fn format_row(&self, bar: &Bar) -> Result<[String; 7], WriteError> {
        Ok([
            format_date(bar.date)?,
            format_scaled(bar.open.0 as i128, self.precision),
            format_scaled(bar.high.0 as i128, self.precision),
            format_scaled(bar.low.0 as i128, self.precision),
            format_scaled(bar.close.0 as i128, self.precision),
            format_scaled(bar.volume, self.precision),
            format_scaled(bar.vwap.0 as i128, self.precision),
        ])
    }
}

/// Format epoch microseconds as `BAR_DATE_FORMAT` in UTC
pub fn format_date(timestamp_us: i64) -> Result<String, WriteError> {
    DateTime::<Utc>::from_timestamp_micros(timestamp_us)
        .map(|dt| dt.format(BAR_DATE_FORMAT).to_string())
        .ok_or(WriteError::DateOutOfRange {
            timestamp: timestamp_us,
        })
}

/// Print a value at `SCALE` with `precision` decimals, rounding half away from zero
pub fn format_scaled(raw: i128, precision: usize) -> String {
    let precision = precision.min(SCALE_DECIMALS);
    let divisor = 10i128.pow((SCALE_DECIMALS - precision) as u32);
    let half = divisor / 2;
    let rounded = if raw >= 0 {
        (raw + half) / divisor
    } else {
        (raw - half) / divisor
    };

    let sign = if rounded < 0 { "-" } else { "" };
    let magnitude = rounded.unsigned_abs();
    if precision == 0 {
        return format!("{sign}{magnitude}");
    }
    let unit = (SCALE as u128) / (divisor as u128);
    format!(
        "{sign}{}.{:0width$}",
        magnitude / unit,
        magnitude % unit,
        width = precision
    )
}
