//! Tick CSV ingestion
//!
//! Reads `Date,Time,Price,Volume` files (TickData.com layout) or files with a
//! single epoch timestamp column into core [`Trade`] values, preserving row
//! order.

use chrono::NaiveDateTime;
use databars_core::{normalize_timestamp, FixedPoint, FixedPointError, Trade};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

/// Default chrono format of the combined `"<date> <time>"` string
pub const DEFAULT_DATETIME_FORMAT: &str = "%m/%d/%Y %H:%M:%S%.f";

/// Where the trade timestamp comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimestampColumns {
    /// Date column plus optional time column, joined with a space and parsed as UTC
    DateTime {
        date: String,
        time: Option<String>,
        format: String,
    },
    /// Single epoch column in milliseconds or microseconds
    Epoch { column: String },
}

/// Column layout of a trade CSV file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeCsvLayout {
    pub timestamp: TimestampColumns,
    pub price_column: String,
    pub volume_column: String,
    pub delimiter: u8,
}

impl Default for TradeCsvLayout {
    fn default() -> Self {
        Self {
            timestamp: TimestampColumns::DateTime {
                date: "Date".to_string(),
                time: Some("Time".to_string()),
                format: DEFAULT_DATETIME_FORMAT.to_string(),
            },
            price_column: "Price".to_string(),
            volume_column: "Volume".to_string(),
            delimiter: b',',
        }
    }
}

impl TradeCsvLayout {
    /// Layout with a single epoch column named `column`
    pub fn epoch(column: &str) -> Self {
        Self {
            timestamp: TimestampColumns::Epoch {
                column: column.to_string(),
            },
            ..Self::default()
        }
    }
}

/// Trade ingestion errors; row-level variants carry the 1-based file line
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("Failed to open '{path}'")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Missing required column: {column}")]
    MissingColumn { column: String },

    #[error("Line {line}: invalid {column} value '{value}': {reason}")]
    InvalidField {
        line: u64,
        column: String,
        value: String,
        reason: String,
    },

    #[error("Line {line}: {reason}")]
    InvalidTrade { line: u64, reason: String },
}

/// Resolved header positions
struct ColumnIndex {
    date: usize,
    time: Option<usize>,
    price: usize,
    volume: usize,
}

/// CSV trade reader
#[derive(Debug, Clone, Default)]
pub struct TradeCsvReader {
    layout: TradeCsvLayout,
}

impl TradeCsvReader {
    pub fn new(layout: TradeCsvLayout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &TradeCsvLayout {
        &self.layout
    }

    /// Read every trade in the file at `path`
    pub fn read_path<P: AsRef<Path>>(&self, path: P) -> Result<Vec<Trade>, ReadError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| ReadError::Open {
            path: path.display().to_string(),
            source,
        })?;
        info!(path = %path.display(), "reading trades");

        let trades = self.read_from(file)?;
        info!(path = %path.display(), trades = trades.len(), "read trades");
        Ok(trades)
    }

    /// Read every trade from any byte source
    pub fn read_from<R: Read>(&self, source: R) -> Result<Vec<Trade>, ReadError> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.layout.delimiter)
            .trim(csv::Trim::All)
            .has_headers(true)
            .from_reader(source);

        let columns = self.resolve_columns(reader.headers()?)?;
        let mut trades = Vec::new();
        let mut record = csv::StringRecord::new();

        while reader.read_record(&mut record)? {
            let line = record.position().map_or(0, |p| p.line());
            trades.push(self.parse_record(&record, &columns, line)?);
        }

        debug!(rows = trades.len(), "parsed trade records");
        Ok(trades)
    }

    fn resolve_columns(&self, headers: &csv::StringRecord) -> Result<ColumnIndex, ReadError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| ReadError::MissingColumn {
                    column: name.to_string(),
                })
        };

        let (date, time) = match &self.layout.timestamp {
            TimestampColumns::DateTime { date, time, .. } => {
                (find(date.as_str())?, time.as_deref().map(find).transpose()?)
            }
            TimestampColumns::Epoch { column } => (find(column.as_str())?, None),
        };

        Ok(ColumnIndex {
            date,
            time,
            price: find(self.layout.price_column.as_str())?,
            volume: find(self.layout.volume_column.as_str())?,
        })
    }

    fn parse_record(
        &self,
        record: &csv::StringRecord,
        columns: &ColumnIndex,
        line: u64,
    ) -> Result<Trade, ReadError> {
        let field = |index: usize, column: &str| {
            record.get(index).ok_or_else(|| ReadError::InvalidTrade {
                line,
                reason: format!("missing {column} field"),
            })
        };

        let timestamp = match &self.layout.timestamp {
            TimestampColumns::DateTime { date, time, format } => {
                let date_value = field(columns.date, date.as_str())?;
                let combined = match (columns.time, time) {
                    (Some(index), Some(time_name)) => {
                        format!("{} {}", date_value, field(index, time_name.as_str())?)
                    }
                    _ => date_value.to_string(),
                };
                parse_datetime(&combined, format).map_err(|reason| ReadError::InvalidField {
                    line,
                    column: date.clone(),
                    value: combined.clone(),
                    reason,
                })?
            }
            TimestampColumns::Epoch { column } => {
                let value = field(columns.date, column.as_str())?;
                let raw = value.parse::<u64>().map_err(|e| ReadError::InvalidField {
                    line,
                    column: column.clone(),
                    value: value.to_string(),
                    reason: e.to_string(),
                })?;
                normalize_timestamp(raw).ok_or_else(|| ReadError::InvalidField {
                    line,
                    column: column.clone(),
                    value: value.to_string(),
                    reason: "timestamp out of range".to_string(),
                })?
            }
        };

        let price_column = &self.layout.price_column;
        let volume_column = &self.layout.volume_column;
        let price = parse_decimal(field(columns.price, price_column.as_str())?, price_column, line)?;
        let volume = parse_decimal(field(columns.volume, volume_column.as_str())?, volume_column, line)?;

        let trade = Trade::new(timestamp, price, volume);
        if trade.price.0 <= 0 {
            return Err(ReadError::InvalidTrade {
                line,
                reason: format!("price must be positive, got {}", trade.price),
            });
        }
        if trade.volume.0 < 0 {
            return Err(ReadError::InvalidTrade {
                line,
                reason: format!("volume must be non-negative, got {}", trade.volume),
            });
        }
        Ok(trade)
    }
}

/// Parse a UTC date-time string into epoch microseconds
pub fn parse_datetime(value: &str, format: &str) -> Result<i64, String> {
    NaiveDateTime::parse_from_str(value, format)
        .map(|dt| dt.and_utc().timestamp_micros())
        .map_err(|e| e.to_string())
}

/// Exact decimal parse, rounding to 8 places when the input carries more
fn parse_decimal(value: &str, column: &str, line: u64) -> Result<FixedPoint, ReadError> {
    let invalid = |reason: String| ReadError::InvalidField {
        line,
        column: column.to_string(),
        value: value.to_string(),
        reason,
    };

    match FixedPoint::from_str(value) {
        Ok(parsed) => Ok(parsed),
        Err(FixedPointError::TooManyDecimals) => {
            let float = value.parse::<f64>().map_err(|e| invalid(e.to_string()))?;
            FixedPoint::from_f64(float).map_err(|e| invalid(e.to_string()))
        }
        Err(e) => Err(invalid(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TICKDATA: &str = "\
Date,Time,Price,Volume
09/01/2013,17:00:00.083,1640.25,8
09/01/2013,17:00:00.083,1640.25,1
09/01/2013,17:00:01.500,1640.5,3
";

    #[test]
    fn test_read_tickdata_layout() {
        let trades = TradeCsvReader::default().read_from(TICKDATA.as_bytes()).unwrap();
        assert_eq!(trades.len(), 3);
        // 2013-09-01 17:00:00.083 UTC
        assert_eq!(trades[0].timestamp, 1_378_054_800_083_000);
        assert_eq!(trades[0].price, FixedPoint::from_str("1640.25").unwrap());
        assert_eq!(trades[0].volume, FixedPoint::from_str("8").unwrap());
        assert_eq!(trades[2].timestamp - trades[0].timestamp, 1_417_000);
    }

    #[test]
    fn test_read_epoch_layout() {
        let csv = "timestamp,price,volume\n1609459200000,100.5,2\n1609459200000123,101,1\n";
        let layout = TradeCsvLayout {
            price_column: "price".to_string(),
            volume_column: "volume".to_string(),
            ..TradeCsvLayout::epoch("timestamp")
        };
        let trades = TradeCsvReader::new(layout).read_from(csv.as_bytes()).unwrap();
        assert_eq!(trades[0].timestamp, 1_609_459_200_000_000);
        assert_eq!(trades[1].timestamp, 1_609_459_200_000_123);
    }

    #[test]
    fn test_epoch_out_of_range_rejected() {
        let csv = "timestamp,price,volume\n1609459200000,100.5,2\n18446744073709551615,101,1\n";
        let layout = TradeCsvLayout {
            price_column: "price".to_string(),
            volume_column: "volume".to_string(),
            ..TradeCsvLayout::epoch("timestamp")
        };
        let err = TradeCsvReader::new(layout).read_from(csv.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            ReadError::InvalidField { line: 3, ref column, ref reason, .. }
                if column == "timestamp" && reason == "timestamp out of range"
        ));
    }

    #[test]
    fn test_missing_column() {
        let csv = "Date,Time,Price\n09/01/2013,17:00:00,1.0\n";
        let err = TradeCsvReader::default().read_from(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, ReadError::MissingColumn { column } if column == "Volume"));
    }

    #[test]
    fn test_invalid_price_reports_line() {
        let csv = "Date,Time,Price,Volume\n09/01/2013,17:00:00,1.0,1\n09/01/2013,17:00:01,abc,1\n";
        let err = TradeCsvReader::default().read_from(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, ReadError::InvalidField { line: 3, ref column, .. } if column == "Price"));
    }

    #[test]
    fn test_non_positive_price_rejected() {
        let csv = "Date,Time,Price,Volume\n09/01/2013,17:00:00,0,1\n";
        let err = TradeCsvReader::default().read_from(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, ReadError::InvalidTrade { line: 2, .. }));
    }

    #[test]
    fn test_negative_volume_rejected() {
        let csv = "Date,Time,Price,Volume\n09/01/2013,17:00:00,10,-1\n";
        let err = TradeCsvReader::default().read_from(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, ReadError::InvalidTrade { line: 2, .. }));
    }

    #[test]
    fn test_bad_datetime() {
        let csv = "Date,Time,Price,Volume\n2013-09-01,17:00:00,10,1\n";
        let err = TradeCsvReader::default().read_from(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, ReadError::InvalidField { line: 2, .. }));
    }

    #[test]
    fn test_excess_decimals_rounded() {
        let csv = "Date,Time,Price,Volume\n09/01/2013,17:00:00,1.123456789,1\n";
        let trades = TradeCsvReader::default().read_from(csv.as_bytes()).unwrap();
        assert_eq!(trades[0].price, FixedPoint(112_345_679));
    }

    #[test]
    fn test_empty_file_with_header() {
        let trades = TradeCsvReader::default()
            .read_from("Date,Time,Price,Volume\n".as_bytes())
            .unwrap();
        assert!(trades.is_empty());
    }

    #[test]
    fn test_parse_datetime() {
        assert_eq!(
            parse_datetime("01/01/2021 00:00:00", DEFAULT_DATETIME_FORMAT),
            Ok(1_609_459_200_000_000)
        );
        assert!(parse_datetime("nonsense", DEFAULT_DATETIME_FORMAT).is_err());
    }
}
