//! Format conversion utilities for bar and trade data
//!
//! Bidirectional conversion between core types and Polars DataFrames. Prices
//! and volumes are stored as raw fixed-point `i64` columns (value * 10^8).

use databars_core::{Bar, FixedPoint, Trade};
use polars::prelude::*;
use thiserror::Error;

/// Trait for converting between Rust types and Polars DataFrames
pub trait DataFrameConverter<T> {
    /// Convert to Polars DataFrame
    fn to_polars_dataframe(&self) -> PolarsResult<DataFrame>;

    /// Convert from Polars DataFrame
    fn from_polars_dataframe(df: DataFrame) -> Result<T, ConversionError>;
}

/// Conversion errors with rich context
#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("Missing required column: {column}")]
    MissingColumn { column: String },

    #[error("Invalid data type for column '{column}': expected {expected}, got {actual}")]
    InvalidDataType {
        column: String,
        expected: String,
        actual: String,
    },

    #[error("Data validation failed: {message}")]
    ValidationFailed { message: String },

    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
}

/// Required columns for a bar DataFrame
pub const BAR_COLUMNS: &[&str] = &[
    "date",
    "open_time",
    "open",
    "high",
    "low",
    "close",
    "volume",
    "vwap",
    "trade_count",
];

/// Required columns for a trade DataFrame
pub const TRADE_COLUMNS: &[&str] = &["timestamp", "price", "volume"];

impl DataFrameConverter<Vec<Bar>> for Vec<Bar> {
    fn to_polars_dataframe(&self) -> PolarsResult<DataFrame> {
        if self.is_empty() {
            return Err(PolarsError::NoData("Empty Bar vector".into()));
        }

        let volumes = self
            .iter()
            .map(|bar| {
                i64::try_from(bar.volume).map_err(|_| {
                    PolarsError::ComputeError(
                        format!("bar volume {} exceeds the i64 column range", bar.volume).into(),
                    )
                })
            })
            .collect::<PolarsResult<Vec<i64>>>()?;

        let dates: Vec<i64> = self.iter().map(|bar| bar.date).collect();
        let open_times: Vec<i64> = self.iter().map(|bar| bar.open_time).collect();
        let opens: Vec<i64> = self.iter().map(|bar| bar.open.0).collect();
        let highs: Vec<i64> = self.iter().map(|bar| bar.high.0).collect();
        let lows: Vec<i64> = self.iter().map(|bar| bar.low.0).collect();
        let closes: Vec<i64> = self.iter().map(|bar| bar.close.0).collect();
        let vwaps: Vec<i64> = self.iter().map(|bar| bar.vwap.0).collect();
        let trade_counts: Vec<i64> = self.iter().map(|bar| bar.trade_count as i64).collect();

        DataFrame::new(vec![
            Column::new("date".into(), &dates),
            Column::new("open_time".into(), &open_times),
            Column::new("open".into(), &opens),
            Column::new("high".into(), &highs),
            Column::new("low".into(), &lows),
            Column::new("close".into(), &closes),
            Column::new("volume".into(), &volumes),
            Column::new("vwap".into(), &vwaps),
            Column::new("trade_count".into(), &trade_counts),
        ])
    }

    fn from_polars_dataframe(df: DataFrame) -> Result<Vec<Bar>, ConversionError> {
        validate_columns(&df, BAR_COLUMNS)?;

        let height = df.height();
        if height == 0 {
            return Ok(Vec::new());
        }

        let dates = extract_i64_column(&df, "date")?;
        let open_times = extract_i64_column(&df, "open_time")?;
        let opens = extract_i64_column(&df, "open")?;
        let highs = extract_i64_column(&df, "high")?;
        let lows = extract_i64_column(&df, "low")?;
        let closes = extract_i64_column(&df, "close")?;
        let volumes = extract_i64_column(&df, "volume")?;
        let vwaps = extract_i64_column(&df, "vwap")?;
        let trade_counts = extract_i64_column(&df, "trade_count")?;

        let mut bars = Vec::with_capacity(height);
        for i in 0..height {
            let bar = Bar {
                date: dates[i],
                open_time: open_times[i],
                open: FixedPoint(opens[i]),
                high: FixedPoint(highs[i]),
                low: FixedPoint(lows[i]),
                close: FixedPoint(closes[i]),
                volume: volumes[i] as i128,
                vwap: FixedPoint(vwaps[i]),
                trade_count: u64::try_from(trade_counts[i]).map_err(|_| {
                    ConversionError::ValidationFailed {
                        message: format!("negative trade_count at row {i}"),
                    }
                })?,
            };
            validate_bar(&bar, i)?;
            bars.push(bar);
        }

        Ok(bars)
    }
}

impl DataFrameConverter<Vec<Trade>> for Vec<Trade> {
    fn to_polars_dataframe(&self) -> PolarsResult<DataFrame> {
        if self.is_empty() {
            return Err(PolarsError::NoData("Empty Trade vector".into()));
        }

        let timestamps: Vec<i64> = self.iter().map(|trade| trade.timestamp).collect();
        let prices: Vec<i64> = self.iter().map(|trade| trade.price.0).collect();
        let volumes: Vec<i64> = self.iter().map(|trade| trade.volume.0).collect();

        DataFrame::new(vec![
            Column::new("timestamp".into(), &timestamps),
            Column::new("price".into(), &prices),
            Column::new("volume".into(), &volumes),
        ])
    }

    fn from_polars_dataframe(df: DataFrame) -> Result<Vec<Trade>, ConversionError> {
        validate_columns(&df, TRADE_COLUMNS)?;

        let timestamps = extract_i64_column(&df, "timestamp")?;
        let prices = extract_i64_column(&df, "price")?;
        let volumes = extract_i64_column(&df, "volume")?;

        let mut trades = Vec::with_capacity(df.height());
        for i in 0..df.height() {
            let trade = Trade::new(timestamps[i], FixedPoint(prices[i]), FixedPoint(volumes[i]));
            if !trade.is_well_formed() {
                return Err(ConversionError::ValidationFailed {
                    message: format!(
                        "row {i}: price must be positive and volume non-negative (price={}, volume={})",
                        trade.price, trade.volume
                    ),
                });
            }
            trades.push(trade);
        }

        Ok(trades)
    }
}

/// Validate a DataFrame has every required column
fn validate_columns(df: &DataFrame, required: &[&str]) -> Result<(), ConversionError> {
    for &column in required {
        if !df
            .get_column_names()
            .iter()
            .any(|name| name.as_str() == column)
        {
            return Err(ConversionError::MissingColumn {
                column: column.to_string(),
            });
        }
    }
    Ok(())
}

/// Extract i64 column with error handling
fn extract_i64_column(df: &DataFrame, column_name: &str) -> Result<Vec<i64>, ConversionError> {
    let series = df
        .column(column_name)
        .map_err(|_| ConversionError::MissingColumn {
            column: column_name.to_string(),
        })?;

    let values = series.i64().map_err(|_| ConversionError::InvalidDataType {
        column: column_name.to_string(),
        expected: "i64".to_string(),
        actual: format!("{:?}", series.dtype()),
    })?;

    if values.null_count() > 0 {
        return Err(ConversionError::ValidationFailed {
            message: format!(
                "column '{column_name}' contains {} null values",
                values.null_count()
            ),
        });
    }

    Ok(values.into_no_null_iter().collect::<Vec<i64>>())
}

/// OHLC and timing sanity of a decoded bar
fn validate_bar(bar: &Bar, row: usize) -> Result<(), ConversionError> {
    if bar.open_time > bar.date {
        return Err(ConversionError::ValidationFailed {
            message: format!(
                "row {row}: open_time ({}) after date ({})",
                bar.open_time, bar.date
            ),
        });
    }

    if !bar.is_consistent() {
        return Err(ConversionError::ValidationFailed {
            message: format!(
                "row {row}: inconsistent OHLC (open={}, high={}, low={}, close={})",
                bar.open, bar.high, bar.low, bar.close
            ),
        });
    }

    if bar.volume < 0 {
        return Err(ConversionError::ValidationFailed {
            message: format!("row {row}: negative volume"),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use databars_core::test_utils::{generators, scenarios};
    use databars_core::{create_bars, BarSpec};

    #[test]
    fn test_bar_dataframe_round_trip() {
        let trades = generators::create_random_walk_trades(500, 9);
        let bars = create_bars(&trades, &BarSpec::volume(25.0).unwrap())
            .unwrap()
            .into_bars();

        let df = bars.to_polars_dataframe().unwrap();
        assert_eq!(df.height(), bars.len());
        assert_eq!(df.width(), BAR_COLUMNS.len());

        let decoded = Vec::<Bar>::from_polars_dataframe(df).unwrap();
        assert_eq!(decoded, bars);
    }

    #[test]
    fn test_trade_dataframe_round_trip() {
        let trades = scenarios::three_trade_sequence();
        let df = trades.to_polars_dataframe().unwrap();
        let decoded = Vec::<Trade>::from_polars_dataframe(df).unwrap();
        assert_eq!(decoded, trades);
    }

    #[test]
    fn test_empty_vectors_rejected() {
        assert!(Vec::<Bar>::new().to_polars_dataframe().is_err());
        assert!(Vec::<Trade>::new().to_polars_dataframe().is_err());
    }

    #[test]
    fn test_missing_column() {
        let df = DataFrame::new(vec![Column::new("timestamp".into(), &[1i64])]).unwrap();
        let err = Vec::<Trade>::from_polars_dataframe(df).unwrap_err();
        assert!(matches!(err, ConversionError::MissingColumn { column } if column == "price"));
    }

    #[test]
    fn test_null_values_rejected() {
        let df = DataFrame::new(vec![
            Column::new("timestamp".into(), &[1i64, 2]),
            Column::new("price".into(), &[Some(100_000_000i64), None]),
            Column::new("volume".into(), &[100_000_000i64, 100_000_000]),
        ])
        .unwrap();
        let err = Vec::<Trade>::from_polars_dataframe(df).unwrap_err();
        assert!(matches!(
            err,
            ConversionError::ValidationFailed { ref message } if message.contains("'price'")
        ));
    }

    #[test]
    fn test_inconsistent_bar_rejected() {
        let bars = create_bars(&scenarios::three_trade_sequence(), &BarSpec::tick(3).unwrap())
            .unwrap()
            .into_bars();
        let mut df = bars.to_polars_dataframe().unwrap();
        // high below low
        df.with_column(Column::new("high".into(), &[1i64])).unwrap();
        assert!(matches!(
            Vec::<Bar>::from_polars_dataframe(df),
            Err(ConversionError::ValidationFailed { .. })
        ));
    }
}
