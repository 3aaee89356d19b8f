//! Bar aggregation: reduce each run of equal group ids into one bar

use crate::errors::ProcessingError;
use crate::fixed_point::FixedPoint;
use crate::grouping::{GroupAssignment, GroupId};
use crate::trade::Trade;
use crate::types::Bar;
use std::ops::Range;

/// Running OHLCV state of a bar being built
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BarAccumulator {
    pub open_time: i64,
    pub close_time: i64,
    pub open: FixedPoint,
    pub high: FixedPoint,
    pub low: FixedPoint,
    pub close: FixedPoint,
    /// Sum of volumes at `SCALE`
    pub volume: i128,
    /// Sum of price * volume at `TURNOVER_SCALE`
    pub turnover: i128,
    pub trade_count: u64,
}

impl BarAccumulator {
    /// Open a bar with its first trade
    pub fn new(trade: &Trade) -> Self {
        Self {
            open_time: trade.timestamp,
            close_time: trade.timestamp,
            open: trade.price,
            high: trade.price,
            low: trade.price,
            close: trade.price,
            volume: trade.volume.0 as i128,
            turnover: trade.transaction(),
            trade_count: 1,
        }
    }

    #[inline]
    pub fn update_with_trade(&mut self, trade: &Trade) {
        if trade.price > self.high {
            self.high = trade.price;
        }
        if trade.price < self.low {
            self.low = trade.price;
        }
        self.close = trade.price;
        self.close_time = trade.timestamp;
        self.volume += trade.volume.0 as i128;
        self.turnover += trade.transaction();
        self.trade_count += 1;
    }

    /// Close the bar; `label` overrides the closing timestamp (time bars)
    pub fn finish(&self, group_id: GroupId, label: Option<i64>) -> Result<Bar, ProcessingError> {
        let vwap = FixedPoint::from_ratio(self.turnover, self.volume).ok_or(
            ProcessingError::DegenerateGroup {
                group_id,
                close_time: self.close_time,
            },
        )?;

        debug_assert!(self.high >= self.open.max(self.close));
        debug_assert!(self.low <= self.open.min(self.close));

        Ok(Bar {
            date: label.unwrap_or(self.close_time),
            open_time: self.open_time,
            open: self.open,
            high: self.high,
            low: self.low,
            close: self.close,
            volume: self.volume,
            vwap,
            trade_count: self.trade_count,
        })
    }

    /// Snapshot of a forming bar; vwap falls back to the close while volume is zero
    pub fn provisional(&self, label: Option<i64>) -> Bar {
        Bar {
            date: label.unwrap_or(self.close_time),
            open_time: self.open_time,
            open: self.open,
            high: self.high,
            low: self.low,
            close: self.close,
            volume: self.volume,
            vwap: FixedPoint::from_ratio(self.turnover, self.volume).unwrap_or(self.close),
            trade_count: self.trade_count,
        }
    }
}

/// A maximal run of trades sharing one group id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupRun {
    pub group_id: GroupId,
    pub range: Range<usize>,
}

/// Split the index space on group boundaries, validating the id sequence
pub fn group_runs(trades_len: usize, group_ids: &[GroupId]) -> Result<Vec<GroupRun>, ProcessingError> {
    if trades_len != group_ids.len() {
        return Err(ProcessingError::InvalidGrouping {
            reason: format!(
                "{} group ids for {} trades",
                group_ids.len(),
                trades_len
            ),
        });
    }

    let mut runs: Vec<GroupRun> = Vec::new();
    let mut start = 0;
    for i in 1..=group_ids.len() {
        if i < group_ids.len() && group_ids[i] == group_ids[start] {
            continue;
        }
        if i < group_ids.len() && group_ids[i] < group_ids[start] {
            return Err(ProcessingError::InvalidGrouping {
                reason: format!(
                    "group id decreases at index {i}: {} -> {}",
                    group_ids[start], group_ids[i]
                ),
            });
        }
        runs.push(GroupRun {
            group_id: group_ids[start],
            range: start..i,
        });
        start = i;
    }

    Ok(runs)
}

fn check_labels(runs: &[GroupRun], labels: Option<&[i64]>) -> Result<(), ProcessingError> {
    match labels {
        Some(labels) if labels.len() != runs.len() => Err(ProcessingError::InvalidGrouping {
            reason: format!("{} labels for {} groups", labels.len(), runs.len()),
        }),
        _ => Ok(()),
    }
}

fn aggregate_run(trades: &[Trade], run: &GroupRun, label: Option<i64>) -> Result<Bar, ProcessingError> {
    let group = &trades[run.range.clone()];
    // Runs are never empty
    let mut acc = BarAccumulator::new(&group[0]);
    for trade in &group[1..] {
        acc.update_with_trade(trade);
    }
    acc.finish(run.group_id, label)
}

fn aggregate_labeled(
    trades: &[Trade],
    group_ids: &[GroupId],
    labels: Option<&[i64]>,
) -> Result<Vec<Bar>, ProcessingError> {
    let runs = group_runs(trades.len(), group_ids)?;
    check_labels(&runs, labels)?;

    runs.iter()
        .enumerate()
        .map(|(ordinal, run)| aggregate_run(trades, run, labels.map(|l| l[ordinal])))
        .collect()
}

/// Aggregate trades with a parallel group id sequence; bars are dated by their last trade
pub fn aggregate_groups(trades: &[Trade], group_ids: &[GroupId]) -> Result<Vec<Bar>, ProcessingError> {
    aggregate_labeled(trades, group_ids, None)
}

/// Aggregate a full assignment, dating bars by their group label when present
pub fn aggregate(trades: &[Trade], assignment: &GroupAssignment) -> Result<Vec<Bar>, ProcessingError> {
    aggregate_labeled(trades, &assignment.group_ids, assignment.labels.as_deref())
}

#[cfg(feature = "parallel")]
fn aggregate_labeled_parallel(
    trades: &[Trade],
    group_ids: &[GroupId],
    labels: Option<&[i64]>,
) -> Result<Vec<Bar>, ProcessingError> {
    use rayon::prelude::*;

    let runs = group_runs(trades.len(), group_ids)?;
    check_labels(&runs, labels)?;

    let results: Vec<Result<Bar, ProcessingError>> = runs
        .par_iter()
        .enumerate()
        .map(|(ordinal, run)| aggregate_run(trades, run, labels.map(|l| l[ordinal])))
        .collect();

    // Sequential collect reports the first failing group, same as the serial path
    results.into_iter().collect()
}

/// Parallel [`aggregate_groups`]: groups are reduced independently on the rayon pool
#[cfg(feature = "parallel")]
pub fn aggregate_groups_parallel(
    trades: &[Trade],
    group_ids: &[GroupId],
) -> Result<Vec<Bar>, ProcessingError> {
    aggregate_labeled_parallel(trades, group_ids, None)
}

/// Parallel [`aggregate`]
#[cfg(feature = "parallel")]
pub fn aggregate_parallel(
    trades: &[Trade],
    assignment: &GroupAssignment,
) -> Result<Vec<Bar>, ProcessingError> {
    aggregate_labeled_parallel(trades, &assignment.group_ids, assignment.labels.as_deref())
}
