//! Trade input file configuration

use serde::{Deserialize, Serialize};

/// Trade CSV layout
///
/// Defaults match TickData.com exports: `Date,Time,Price,Volume` with US dates.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct InputConfig {
    /// Date column, or the full date-time column when `time_column` is unset
    pub date_column: String,

    /// Time-of-day column joined to the date with a single space
    pub time_column: Option<String>,

    /// Single epoch column (13-digit ms or 16-digit µs); overrides the date/time columns
    pub timestamp_column: Option<String>,

    pub price_column: String,

    pub volume_column: String,

    /// chrono format of the combined `"<date> <time>"` string (UTC)
    pub datetime_format: String,

    /// Single-byte field delimiter
    pub delimiter: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            date_column: "Date".to_string(),
            time_column: Some("Time".to_string()),
            timestamp_column: None,
            price_column: "Price".to_string(),
            volume_column: "Volume".to_string(),
            datetime_format: "%m/%d/%Y %H:%M:%S%.f".to_string(),
            delimiter: ",".to_string(),
        }
    }
}

impl InputConfig {
    /// The delimiter as a byte, if it is exactly one ASCII character
    pub fn delimiter_byte(&self) -> Option<u8> {
        match self.delimiter.as_bytes() {
            [byte] if byte.is_ascii() => Some(*byte),
            _ => None,
        }
    }

    /// Validate the layout
    pub fn validate(&self) -> Result<(), String> {
        if self.delimiter_byte().is_none() {
            return Err(format!(
                "delimiter must be a single ASCII character, got {:?}",
                self.delimiter
            ));
        }
        if self.price_column.is_empty() || self.volume_column.is_empty() {
            return Err("price and volume columns must be named".to_string());
        }
        if self.timestamp_column.is_none() && self.date_column.is_empty() {
            return Err("either timestamp_column or date_column must be set".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = InputConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.delimiter_byte(), Some(b','));
    }

    #[test]
    fn test_invalid_delimiter() {
        let config = InputConfig {
            delimiter: "||".to_string(),
            ..InputConfig::default()
        };
        assert!(config.validate().is_err());
        assert_eq!(config.delimiter_byte(), None);
    }
}
