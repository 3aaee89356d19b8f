//! Processing error types

use crate::grouping::GroupId;
use crate::scheme::BarKind;
use thiserror::Error;

/// Errors raised while validating parameters, grouping trades or aggregating bars
///
/// Every variant is detected synchronously in a single pass; a failed run never
/// returns a partial bar series.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProcessingError {
    #[error("Invalid bar scheme '{scheme}': expected one of tick, volume, dollar, time")]
    InvalidScheme { scheme: String },

    #[error("Invalid {kind} bar units {units}: {reason}")]
    InvalidParameter {
        kind: BarKind,
        units: f64,
        reason: &'static str,
    },

    #[error("Group {group_id} closing at {close_time} has zero total volume (VWAP undefined)")]
    DegenerateGroup { group_id: GroupId, close_time: i64 },

    #[error("Trades not sorted at index {index}: prev_time={prev_time}, curr_time={curr_time}")]
    UnsortedTrades {
        index: usize,
        prev_time: i64,
        curr_time: i64,
    },

    #[error("Invalid group assignment: {reason}")]
    InvalidGrouping { reason: String },
}
