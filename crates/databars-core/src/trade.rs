//! Trade record model

use crate::fixed_point::{FixedPoint, FixedPointError};
use serde::{Deserialize, Serialize};

/// A single executed trade (tick)
///
/// Trades are plain immutable values. The core never re-sorts them: the index
/// order of a trade slice is the time order supplied by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trade {
    /// Execution time in microseconds since the Unix epoch (UTC)
    pub timestamp: i64,

    /// Execution price (positive)
    pub price: FixedPoint,

    /// Traded quantity (non-negative)
    pub volume: FixedPoint,
}

impl Trade {
    pub fn new(timestamp: i64, price: FixedPoint, volume: FixedPoint) -> Self {
        Self {
            timestamp,
            price,
            volume,
        }
    }

    /// Build a trade from float price and volume, rounding to 8 decimals
    pub fn from_f64(timestamp: i64, price: f64, volume: f64) -> Result<Self, FixedPointError> {
        Ok(Self {
            timestamp,
            price: FixedPoint::from_f64(price)?,
            volume: FixedPoint::from_f64(volume)?,
        })
    }

    /// Transaction value (price * volume) at `TURNOVER_SCALE`, as i128 to prevent overflow
    #[inline]
    pub fn transaction(&self) -> i128 {
        self.price.mul_wide(self.volume)
    }

    /// Whether the trade satisfies the input contract (price > 0, volume >= 0)
    pub fn is_well_formed(&self) -> bool {
        self.price.0 > 0 && self.volume.0 >= 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixed_point::TURNOVER_SCALE;

    #[test]
    fn test_transaction_value() {
        let trade = Trade::from_f64(0, 1640.25, 8.0).unwrap();
        assert_eq!(trade.transaction(), 13_122 * TURNOVER_SCALE);
    }

    #[test]
    fn test_transaction_no_overflow() {
        // 1e10 price * 1e10 volume would overflow an i64 at scale 1e16
        let trade = Trade::new(0, FixedPoint(i64::MAX / 2), FixedPoint(i64::MAX / 2));
        assert!(trade.transaction() > 0);
    }

    #[test]
    fn test_well_formed() {
        assert!(Trade::from_f64(0, 10.0, 0.0).unwrap().is_well_formed());
        assert!(!Trade::from_f64(0, 0.0, 1.0).unwrap().is_well_formed());
        assert!(!Trade::from_f64(0, 10.0, -1.0).unwrap().is_well_formed());
    }

    #[test]
    fn test_from_f64_rejects_nan() {
        assert!(Trade::from_f64(0, f64::NAN, 1.0).is_err());
    }
}
