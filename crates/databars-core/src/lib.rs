//! Core bar construction algorithms
//!
//! Converts time-ordered trades into tick, volume, dollar or time bars.
//!
//! ## Features
//!
//! - Exact arithmetic: prices and volumes are 8-decimal fixed point, sums are i128
//! - Cumulative thresholds: volume and dollar bars never reset the running total
//! - Right-closed time intervals anchored at midnight UTC
//! - Batch ([`create_bars`]) and streaming ([`BarProcessor`]) paths with identical output
//! - Optional rayon-backed aggregation (`parallel` feature)

pub mod aggregate;
pub mod errors;
pub mod fixed_point;
pub mod grouping;
pub mod processor;
pub mod resample;
pub mod scheme;
pub mod timestamp;
pub mod trade;
pub mod types;

// Test utilities (only available in test builds or with test-utils feature)
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

// Re-export commonly used types
pub use aggregate::{aggregate, aggregate_groups, BarAccumulator};
#[cfg(feature = "parallel")]
pub use aggregate::{aggregate_groups_parallel, aggregate_parallel};
pub use errors::ProcessingError;
pub use fixed_point::{FixedPoint, FixedPointError, SCALE, TURNOVER_SCALE};
pub use grouping::{assign_groups, GroupAssignment, GroupId, ThresholdGrouper};
#[cfg(feature = "parallel")]
pub use processor::create_bars_parallel;
pub use processor::{
    create_bars, create_bars_from_str, create_bars_with_policy, validate_trade_ordering,
    BarProcessor,
};
pub use resample::{assign_time_groups, fill_empty_intervals, TimeResampler};
pub use scheme::{BarKind, BarSpec, EmptyIntervalPolicy};
pub use timestamp::{normalize_timestamp, MICROS_PER_MINUTE};
pub use trade::Trade;
pub use types::{Bar, BarSeries};
