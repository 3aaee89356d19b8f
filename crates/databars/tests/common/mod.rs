//! Shared helpers for cross-crate integration tests

#![allow(dead_code)]

use chrono::{DateTime, Utc};
use databars::{Bar, Trade};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

/// Render trades in the TickData.com `Date,Time,Price,Volume` layout
pub fn tickdata_csv(trades: &[Trade]) -> String {
    let mut csv = String::from("Date,Time,Price,Volume\n");
    for trade in trades {
        let dt = DateTime::<Utc>::from_timestamp_micros(trade.timestamp).expect("timestamp in range");
        writeln!(
            csv,
            "{},{},{}",
            dt.format("%m/%d/%Y,%H:%M:%S%.6f"),
            trade.price,
            trade.volume
        )
        .expect("write to string");
    }
    csv
}

/// Write `trades` as a TickData file under `dir`
pub fn write_tickdata(dir: &Path, name: &str, trades: &[Trade]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, tickdata_csv(trades)).expect("write tick file");
    path
}

/// Panic with context on the first bar that breaks an OHLC or timing invariant
pub fn assert_bar_invariants(bars: &[Bar]) {
    for (i, bar) in bars.iter().enumerate() {
        assert!(bar.is_consistent(), "bar {i} has inconsistent OHLC: {bar:?}");
        assert!(bar.open_time <= bar.date, "bar {i} opens after it closes: {bar:?}");
        if i > 0 {
            assert!(
                bars[i - 1].date <= bar.date,
                "bar {i} dated before bar {}: {} > {}",
                i - 1,
                bars[i - 1].date,
                bar.date
            );
        }
    }
}

/// Exact sum of trade volumes at 10^8 scale
pub fn total_volume(trades: &[Trade]) -> i128 {
    trades.iter().map(|t| t.volume.0 as i128).sum()
}
