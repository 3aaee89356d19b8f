//! Larger deterministic trade datasets for integration tests and benches
//!
//! Every generator is pure: the same arguments always give the same trades.
//! Timestamps are non-decreasing, prices positive and volumes strictly
//! positive, so any scheme produces non-degenerate bars.

use super::constants::BASE_TIMESTAMP;
use crate::fixed_point::FixedPoint;
use crate::trade::Trade;

/// xorshift64* step; deterministic pseudo-randomness without extra dependencies
fn next_u64(state: &mut u64) -> u64 {
    let mut x = *state;
    x ^= x >> 12;
    x ^= x << 25;
    x ^= x >> 27;
    *state = x;
    x.wrapping_mul(0x2545_F491_4F6C_DD1D)
}

fn next_unit(state: &mut u64) -> f64 {
    (next_u64(state) >> 11) as f64 / (1u64 << 53) as f64
}

/// Bounded random walk around 100.0
///
/// - price steps of at most +/-0.5%, floored at 1.0
/// - volume uniform in [0.1, 5.0)
/// - 0 to 20 seconds between trades, with about 1 in 10 sharing a timestamp
pub fn create_random_walk_trades(count: usize, seed: u64) -> Vec<Trade> {
    let mut state = seed.wrapping_mul(0x9E37_79B9_7F4A_7C15) | 1;
    let mut trades = Vec::with_capacity(count);
    let mut price = 100.0_f64;
    let mut timestamp = BASE_TIMESTAMP;

    for _ in 0..count {
        let step = (next_unit(&mut state) - 0.5) * 0.01;
        price = (price * (1.0 + step)).max(1.0);
        let volume = 0.1 + next_unit(&mut state) * 4.9;

        if next_unit(&mut state) >= 0.1 {
            timestamp += (next_unit(&mut state) * 20_000_000.0) as i64;
        }

        trades.push(Trade::new(
            timestamp,
            FixedPoint::from_f64(price).unwrap(),
            FixedPoint::from_f64(volume).unwrap(),
        ));
    }

    trades
}

/// Sine-wave prices with one trade per `interval_us`
///
/// Used for linear-scaling checks where the exact shape does not matter.
pub fn create_massive_realistic_dataset(count: usize, interval_us: i64) -> Vec<Trade> {
    let mut trades = Vec::with_capacity(count);
    let base_price = 23_000.0;

    for i in 0..count {
        let progress = i as f64 / count.max(1) as f64;
        let trend = (progress * 2.0 * std::f64::consts::PI).sin() * 500.0;
        let volatility = (i as f64 * 0.01).sin() * 50.0 + (i as f64 * 0.001).cos() * 20.0;
        let volume = 0.5 + (i % 10) as f64 * 0.25;

        trades.push(Trade::new(
            BASE_TIMESTAMP + i as i64 * interval_us,
            FixedPoint::from_f64(base_price + trend + volatility).unwrap(),
            FixedPoint::from_f64(volume).unwrap(),
        ));
    }

    trades
}

/// Trades spread over `days` UTC days with an overnight gap each day
pub fn create_multi_day_dataset(days: usize, trades_per_day: usize) -> Vec<Trade> {
    use crate::timestamp::{day_start, MICROS_PER_DAY};

    let first_day = day_start(BASE_TIMESTAMP);
    let mut trades = Vec::with_capacity(days * trades_per_day);

    for day in 0..days {
        // Trading session 08:00-16:00 UTC
        let session_start = first_day + day as i64 * MICROS_PER_DAY + MICROS_PER_DAY / 3;
        let spacing = (MICROS_PER_DAY / 3) / trades_per_day.max(1) as i64;
        for i in 0..trades_per_day {
            let price = 50.0 + day as f64 + (i as f64 * 0.05).sin();
            trades.push(Trade::new(
                session_start + i as i64 * spacing,
                FixedPoint::from_f64(price).unwrap(),
                FixedPoint::from_f64(1.0 + (i % 3) as f64).unwrap(),
            ));
        }
    }

    trades
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_walk_deterministic() {
        assert_eq!(create_random_walk_trades(100, 3), create_random_walk_trades(100, 3));
        assert_ne!(create_random_walk_trades(100, 3), create_random_walk_trades(100, 4));
    }

    #[test]
    fn test_generated_trades_well_formed() {
        for trades in [
            create_random_walk_trades(1_000, 1),
            create_massive_realistic_dataset(1_000, 100_000),
            create_multi_day_dataset(3, 200),
        ] {
            assert!(trades.iter().all(|t| t.is_well_formed() && t.volume.0 > 0));
            assert!(trades.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
        }
    }
}
