//! Timestamp normalization and calendar arithmetic
//!
//! All timestamps in the core are `i64` microseconds since the Unix epoch (UTC).

/// Values below this are treated as 13-digit milliseconds and converted to microseconds
const MICROSECOND_THRESHOLD: u64 = 10_000_000_000_000;

/// Microseconds in one minute
pub const MICROS_PER_MINUTE: i64 = 60_000_000;

/// Microseconds in one UTC day
pub const MICROS_PER_DAY: i64 = 24 * 60 * MICROS_PER_MINUTE;

/// Longest accepted time-bar interval (about 73,000 years)
pub const MAX_INTERVAL_US: i64 = i64::MAX / 4;

/// Normalize any epoch timestamp to 16-digit microseconds
///
/// Returns `None` when the value does not fit an `i64` microsecond count.
///
/// # Examples
/// ```rust
/// use databars_core::normalize_timestamp;
///
/// // 13-digit millisecond timestamp -> 16-digit microseconds
/// assert_eq!(normalize_timestamp(1609459200000), Some(1609459200000000));
///
/// // Already 16-digit microseconds -> unchanged
/// assert_eq!(normalize_timestamp(1609459200000000), Some(1609459200000000));
///
/// assert_eq!(normalize_timestamp(u64::MAX), None);
/// ```
pub fn normalize_timestamp(raw_timestamp: u64) -> Option<i64> {
    if raw_timestamp < MICROSECOND_THRESHOLD {
        // Below 10^13, so the product stays under 10^16
        Some((raw_timestamp * 1_000) as i64)
    } else {
        i64::try_from(raw_timestamp).ok()
    }
}

/// Midnight (UTC) of the day containing `timestamp_us`
///
/// Uses euclidean division so pre-epoch timestamps floor toward the past.
pub fn day_start(timestamp_us: i64) -> i64 {
    timestamp_us - timestamp_us.rem_euclid(MICROS_PER_DAY)
}

/// Convert a minute count to an interval length in microseconds
///
/// Returns `None` when the product is below one microsecond, above
/// [`MAX_INTERVAL_US`] or not finite.
pub fn minutes_to_micros(minutes: f64) -> Option<i64> {
    if !minutes.is_finite() || minutes <= 0.0 {
        return None;
    }
    let micros = (minutes * MICROS_PER_MINUTE as f64).round();
    if micros < 1.0 || micros > MAX_INTERVAL_US as f64 {
        return None;
    }
    Some(micros as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_13_digit_milliseconds() {
        assert_eq!(normalize_timestamp(1609459200000), Some(1609459200000000));
    }

    #[test]
    fn test_normalize_16_digit_microseconds() {
        assert_eq!(normalize_timestamp(1609459200000000), Some(1609459200000000));
    }

    #[test]
    fn test_normalize_out_of_range() {
        assert_eq!(normalize_timestamp(i64::MAX as u64), Some(i64::MAX));
        assert_eq!(normalize_timestamp(i64::MAX as u64 + 1), None);
        assert_eq!(normalize_timestamp(u64::MAX), None);
    }

    #[test]
    fn test_threshold_boundary() {
        let below = MICROSECOND_THRESHOLD - 1;
        assert_eq!(normalize_timestamp(below), Some((below * 1000) as i64));
        assert_eq!(
            normalize_timestamp(MICROSECOND_THRESHOLD),
            Some(MICROSECOND_THRESHOLD as i64)
        );
    }

    #[test]
    fn test_day_start() {
        // 2013-09-01 17:00:00.083 UTC
        let ts = 1_378_054_800_083_000;
        assert_eq!(day_start(ts), 1_377_993_600_000_000);
        assert_eq!(day_start(1_377_993_600_000_000), 1_377_993_600_000_000);
        assert_eq!(day_start(-1), -MICROS_PER_DAY);
    }

    #[test]
    fn test_minutes_to_micros() {
        assert_eq!(minutes_to_micros(1.0), Some(MICROS_PER_MINUTE));
        assert_eq!(minutes_to_micros(0.5), Some(30_000_000));
        assert_eq!(minutes_to_micros(600.0), Some(600 * MICROS_PER_MINUTE));
        assert_eq!(minutes_to_micros(0.0), None);
        assert_eq!(minutes_to_micros(-5.0), None);
        assert_eq!(minutes_to_micros(f64::NAN), None);
    }

    #[test]
    fn test_minutes_to_micros_upper_bound() {
        let max_minutes = MAX_INTERVAL_US as f64 / MICROS_PER_MINUTE as f64;
        assert!(minutes_to_micros(max_minutes * 0.999).is_some());
        assert_eq!(minutes_to_micros(max_minutes * 1.001), None);
        // Rounds to just under i64::MAX microseconds
        assert_eq!(minutes_to_micros(1.537e11), None);
    }
}
