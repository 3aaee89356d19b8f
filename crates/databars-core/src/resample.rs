//! Wall-clock interval grouping for time bars
//!
//! Intervals are right-closed: the bar labeled `T` covers trades with
//! timestamps in `(T - interval, T]`. Edges are anchored at midnight UTC of the
//! first trade's day, so `T = origin + k * interval`.

use crate::grouping::{GroupAssignment, GroupId};
use crate::timestamp::day_start;
use crate::trade::Trade;
use crate::types::Bar;

/// Maps timestamps onto right-closed interval labels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeResampler {
    interval_us: i64,
    origin: i64,
}

impl TimeResampler {
    /// Anchor the interval grid at midnight UTC of `first_timestamp`'s day
    pub fn anchored_at(first_timestamp: i64, interval_us: i64) -> Self {
        Self {
            interval_us,
            origin: day_start(first_timestamp),
        }
    }

    pub fn origin(&self) -> i64 {
        self.origin
    }

    pub fn interval_us(&self) -> i64 {
        self.interval_us
    }

    /// Right edge of the interval covering `timestamp`
    ///
    /// Saturates at `i64::MAX` when that edge lies past the representable range.
    #[inline]
    pub fn label_for(&self, timestamp: i64) -> i64 {
        let origin = self.origin as i128;
        let interval = self.interval_us as i128;
        // ceil(offset / interval) for either sign of offset
        let k = -(origin - timestamp as i128).div_euclid(interval);
        i64::try_from(origin + k * interval).unwrap_or(i64::MAX)
    }
}

/// Dense group ids plus right-edge labels for time bars
///
/// Expects trades in non-decreasing timestamp order; a new group starts every
/// time the covering interval changes.
pub fn assign_time_groups(trades: &[Trade], interval_us: i64) -> GroupAssignment {
    let Some(first) = trades.first() else {
        return GroupAssignment::with_labels(Vec::new(), Vec::new());
    };
    let resampler = TimeResampler::anchored_at(first.timestamp, interval_us);

    let mut group_ids: Vec<GroupId> = Vec::with_capacity(trades.len());
    let mut labels: Vec<i64> = Vec::new();

    for trade in trades {
        let label = resampler.label_for(trade.timestamp);
        if labels.last() != Some(&label) {
            labels.push(label);
        }
        group_ids.push(labels.len() - 1);
    }

    GroupAssignment::with_labels(group_ids, labels)
}

/// Insert a carried-forward bar for every empty interval between consecutive bars
///
/// `bars` must be time bars produced with the same `interval_us`. Each inserted
/// bar has zero volume, zero trades and all prices equal to the previous close.
pub fn fill_empty_intervals(bars: Vec<Bar>, interval_us: i64) -> Vec<Bar> {
    let mut filled: Vec<Bar> = Vec::with_capacity(bars.len());

    for bar in bars {
        if let Some(prev) = filled.last().copied() {
            let mut next = prev.date.checked_add(interval_us);
            while let Some(date) = next.filter(|&date| date < bar.date) {
                filled.push(Bar::carried_forward(&prev, date));
                next = date.checked_add(interval_us);
            }
        }
        filled.push(bar);
    }

    filled
}
