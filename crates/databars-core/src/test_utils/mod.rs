//! Test utilities for consistent test data creation across the codebase
//!
//! - `mod.rs`: small-scale builders and named scenarios
//! - `generators.rs`: larger deterministic datasets for integration tests

pub mod generators;

use crate::fixed_point::FixedPoint;
use crate::trade::Trade;

/// Shared test constants
pub mod constants {
    /// 2013-09-01 17:00:00 UTC in microseconds
    pub const BASE_TIMESTAMP: i64 = 1_378_054_800_000_000;
}

/// Creates a trade from decimal strings (fails fast on malformed input)
pub fn create_test_trade(timestamp: i64, price: &str, volume: &str) -> Trade {
    Trade::new(
        timestamp,
        FixedPoint::from_str(price).unwrap(),
        FixedPoint::from_str(volume).unwrap(),
    )
}

/// Fluent builder for hand-written trade sequences
#[derive(Debug, Default)]
pub struct TradeBuilder {
    base_timestamp: i64,
    trades: Vec<Trade>,
}

impl TradeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offset added to every subsequent timestamp
    pub fn with_base_timestamp(mut self, timestamp: i64) -> Self {
        self.base_timestamp = timestamp;
        self
    }

    pub fn add_trade(mut self, timestamp: i64, price: f64, volume: f64) -> Self {
        let trade = Trade::from_f64(self.base_timestamp + timestamp, price, volume).unwrap();
        self.trades.push(trade);
        self
    }

    pub fn build(self) -> Vec<Trade> {
        self.trades
    }
}

/// Common test scenarios
pub mod scenarios {
    use super::*;

    /// (t1, 10, 1), (t2, 12, 1), (t3, 11, 2)
    ///
    /// Tick bars of 2 give {10,12,10,12,2,11} and {11,11,11,11,2,11};
    /// volume bars of 3 give a single bar of volume 4 and vwap 11.
    pub fn three_trade_sequence() -> Vec<Trade> {
        TradeBuilder::new()
            .with_base_timestamp(constants::BASE_TIMESTAMP)
            .add_trade(0, 10.0, 1.0)
            .add_trade(1_000_000, 12.0, 1.0)
            .add_trade(2_000_000, 11.0, 2.0)
            .build()
    }

    /// Tick bars of 2 leave a trailing group made only of a zero-volume trade
    pub fn zero_volume_group() -> Vec<Trade> {
        TradeBuilder::new()
            .with_base_timestamp(constants::BASE_TIMESTAMP)
            .add_trade(0, 10.0, 1.0)
            .add_trade(1_000_000, 11.0, 1.0)
            .add_trade(2_000_000, 12.0, 0.0)
            .build()
    }

    /// Second trade is earlier than the first
    pub fn unsorted_sequence() -> Vec<Trade> {
        vec![
            create_test_trade(constants::BASE_TIMESTAMP + 2_000_000, "50000.0", "1.0"),
            create_test_trade(constants::BASE_TIMESTAMP + 1_000_000, "50100.0", "1.0"),
        ]
    }

    /// One trade whose volume crosses several threshold multiples, then small trades
    pub fn volume_jump_sequence() -> Vec<Trade> {
        TradeBuilder::new()
            .with_base_timestamp(constants::BASE_TIMESTAMP)
            .add_trade(0, 100.0, 10.0)
            .add_trade(1_000, 101.0, 1.0)
            .add_trade(2_000, 102.0, 1.0)
            .add_trade(3_000, 103.0, 1.0)
            .build()
    }

    /// Gradually rising prices, one unit of volume each, 100ms apart
    pub fn large_sequence(count: usize) -> Vec<Trade> {
        let mut builder = TradeBuilder::new().with_base_timestamp(constants::BASE_TIMESTAMP);
        for i in 0..count {
            builder = builder.add_trade(i as i64 * 100_000, 100.0 + i as f64 * 0.01, 1.0);
        }
        builder.build()
    }
}
