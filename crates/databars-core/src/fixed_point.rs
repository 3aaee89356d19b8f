//! Fixed-point arithmetic for exact price, volume and turnover sums

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Scale factor for 8 decimal places (100,000,000)
pub const SCALE: i64 = 100_000_000;

/// Scale of a price × volume product (10^16)
///
/// Transaction values and turnover accumulators are carried as `i128` at this
/// scale so that no precision is lost before the VWAP division.
pub const TURNOVER_SCALE: i128 = (SCALE as i128) * (SCALE as i128);

/// Fixed-point decimal representation using i64 with 8 decimal precision
///
/// All prices and volumes are stored as integers scaled by SCALE (1e8), which
/// keeps cumulative sums exact regardless of summation order.
///
/// Example:
/// - 1640.25 → 164025000000
/// - 1.5 → 150000000
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct FixedPoint(pub i64);

impl FixedPoint {
    /// Zero value
    pub const ZERO: FixedPoint = FixedPoint(0);

    /// Create FixedPoint from string representation
    ///
    /// # Arguments
    ///
    /// * `s` - Decimal string (e.g., "1640.25")
    ///
    /// # Returns
    ///
    /// Result containing FixedPoint or parse error
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Result<Self, FixedPointError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(FixedPointError::InvalidFormat);
        }

        let (negative, unsigned) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s.strip_prefix('+').unwrap_or(s)),
        };

        let mut parts = unsigned.splitn(2, '.');
        let int_str = parts.next().unwrap_or_default();
        let frac_str = parts.next();

        if int_str.is_empty() && frac_str.map_or(true, str::is_empty) {
            return Err(FixedPointError::InvalidFormat);
        }
        if !int_str.bytes().all(|b| b.is_ascii_digit()) {
            return Err(FixedPointError::InvalidFormat);
        }

        let integer_part: i64 = if int_str.is_empty() {
            0
        } else {
            int_str.parse().map_err(|_| FixedPointError::Overflow)?
        };

        // Scale the digits by 10^(8-len) instead of padding a String
        let fractional_part = match frac_str {
            Some(frac) if !frac.is_empty() => {
                if !frac.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(FixedPointError::InvalidFormat);
                }
                if frac.len() > 8 {
                    return Err(FixedPointError::TooManyDecimals);
                }
                const POWERS: [i64; 9] = [
                    100_000_000, 10_000_000, 1_000_000, 100_000, 10_000,
                    1_000, 100, 10, 1,
                ];
                let digits: i64 = frac.parse().map_err(|_| FixedPointError::InvalidFormat)?;
                digits * POWERS[frac.len()]
            }
            _ => 0,
        };

        let magnitude = integer_part
            .checked_mul(SCALE)
            .and_then(|v| v.checked_add(fractional_part))
            .ok_or(FixedPointError::Overflow)?;

        Ok(FixedPoint(if negative { -magnitude } else { magnitude }))
    }

    /// Create FixedPoint from a float, rounding to the nearest 1e-8
    pub fn from_f64(value: f64) -> Result<Self, FixedPointError> {
        if !value.is_finite() {
            return Err(FixedPointError::NotFinite);
        }
        let scaled = (value * SCALE as f64).round();
        if scaled >= i64::MAX as f64 || scaled <= i64::MIN as f64 {
            return Err(FixedPointError::Overflow);
        }
        Ok(FixedPoint(scaled as i64))
    }

    /// Convert FixedPoint to string representation with 8 decimal places
    #[allow(clippy::inherent_to_string_shadow_display)]
    pub fn to_string(&self) -> String {
        let abs_value = self.0.unsigned_abs();
        let integer_part = abs_value / SCALE as u64;
        let fractional_part = abs_value % SCALE as u64;

        let sign = if self.0 < 0 { "-" } else { "" };
        format!("{}{}.{:08}", sign, integer_part, fractional_part)
    }

    /// Convert to f64 for user-friendly output
    #[inline]
    pub fn to_f64(&self) -> f64 {
        self.0 as f64 / SCALE as f64
    }

    /// Product with another fixed-point value at [`TURNOVER_SCALE`]
    #[inline]
    pub fn mul_wide(&self, other: FixedPoint) -> i128 {
        (self.0 as i128) * (other.0 as i128)
    }

    /// Ratio `turnover / volume` as a price, rounded half away from zero
    ///
    /// `turnover` is at [`TURNOVER_SCALE`] and `volume` at [`SCALE`], so the
    /// quotient lands back at [`SCALE`]. Returns `None` when `volume` is zero.
    pub fn from_ratio(turnover: i128, volume: i128) -> Option<FixedPoint> {
        if volume == 0 {
            return None;
        }
        let (num, den) = if volume < 0 {
            (-turnover, -volume)
        } else {
            (turnover, volume)
        };
        let half = den / 2;
        let rounded = if num >= 0 {
            (num + half) / den
        } else {
            (num - half) / den
        };
        i64::try_from(rounded).ok().map(FixedPoint)
    }
}

impl fmt::Display for FixedPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_string())
    }
}

impl FromStr for FixedPoint {
    type Err = FixedPointError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FixedPoint::from_str(s)
    }
}

/// Convert an `i128` amount at [`SCALE`] to f64
#[inline]
pub fn scaled_to_f64(raw: i128) -> f64 {
    raw as f64 / SCALE as f64
}

/// Fixed-point arithmetic errors
#[derive(Debug, Clone, PartialEq)]
pub enum FixedPointError {
    /// Invalid number format
    InvalidFormat,
    /// Too many decimal places (>8)
    TooManyDecimals,
    /// Arithmetic overflow
    Overflow,
    /// NaN or infinite float input
    NotFinite,
}

impl fmt::Display for FixedPointError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FixedPointError::InvalidFormat => write!(f, "Invalid number format"),
            FixedPointError::TooManyDecimals => write!(f, "Too many decimal places (max 8)"),
            FixedPointError::Overflow => write!(f, "Arithmetic overflow"),
            FixedPointError::NotFinite => write!(f, "Value is not finite"),
        }
    }
}

impl std::error::Error for FixedPointError {}
