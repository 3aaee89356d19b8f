//! Group assignment: map every trade index to a bar group id
//!
//! Tick groups are a pure function of the index. Volume and dollar groups come
//! from a single sequential scan over a running, never-reset cumulative total
//! compared against successive multiples of the threshold.

use crate::resample::assign_time_groups;
use crate::scheme::BarSpec;
use crate::trade::Trade;
use std::num::NonZeroU64;

/// Bar group identifier, non-decreasing along the trade sequence
pub type GroupId = usize;

/// Per-trade group ids plus, for time bars, the right-edge label of each group
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GroupAssignment {
    /// One id per trade, starting at 0, non-decreasing
    pub group_ids: Vec<GroupId>,

    /// `labels[g]` is the closing timestamp of group `g` (time bars only)
    pub labels: Option<Vec<i64>>,
}

impl GroupAssignment {
    pub fn new(group_ids: Vec<GroupId>) -> Self {
        Self {
            group_ids,
            labels: None,
        }
    }

    pub fn with_labels(group_ids: Vec<GroupId>, labels: Vec<i64>) -> Self {
        Self {
            group_ids,
            labels: Some(labels),
        }
    }

    /// Number of distinct groups
    pub fn group_count(&self) -> usize {
        self.group_ids.last().map_or(0, |last| last + 1)
    }
}

/// Incremental cumulative-threshold state machine
///
/// Holds the running total and the current group. A trade that brings the
/// total to or past `threshold * (group + 1)` closes the current group and the
/// group advances by exactly one, even if the total jumped past several
/// multiples. Shared by the batch assigner and the streaming processor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThresholdGrouper {
    threshold: i128,
    cumulative: i128,
    group: GroupId,
}

impl ThresholdGrouper {
    /// `threshold` is in the raw scale of the metrics that will be pushed
    pub fn new(threshold: i128) -> Self {
        Self {
            threshold,
            cumulative: 0,
            group: 0,
        }
    }

    /// Add one trade's metric; returns its group and whether it closed that group
    #[inline]
    pub fn push(&mut self, metric: i128) -> (GroupId, bool) {
        self.cumulative = self.cumulative.saturating_add(metric);
        let group = self.group;
        if self.cumulative >= self.next_boundary() {
            self.group += 1;
            (group, true)
        } else {
            (group, false)
        }
    }

    /// Cumulative total the current group must reach to close
    #[inline]
    pub fn next_boundary(&self) -> i128 {
        self.threshold.saturating_mul(self.group as i128 + 1)
    }

    pub fn cumulative(&self) -> i128 {
        self.cumulative
    }

    pub fn current_group(&self) -> GroupId {
        self.group
    }
}

/// Tick groups: `i / count`
pub fn assign_tick_groups(len: usize, count: NonZeroU64) -> Vec<GroupId> {
    let count = usize::try_from(count.get()).unwrap_or(usize::MAX);
    (0..len).map(|i| i / count).collect()
}

/// Cumulative-threshold groups over a precomputed metric array
pub fn assign_threshold_groups(metrics: &[i128], threshold: i128) -> Vec<GroupId> {
    let mut grouper = ThresholdGrouper::new(threshold);
    metrics.iter().map(|&metric| grouper.push(metric).0).collect()
}

/// Raw volumes at `SCALE`
pub fn volume_metrics(trades: &[Trade]) -> Vec<i128> {
    trades.iter().map(|t| t.volume.0 as i128).collect()
}

/// Raw transaction values at `TURNOVER_SCALE`
pub fn transaction_metrics(trades: &[Trade]) -> Vec<i128> {
    trades.iter().map(Trade::transaction).collect()
}

/// Assign group ids for any scheme
///
/// Assumes `trades` is already in non-decreasing timestamp order.
pub fn assign_groups(trades: &[Trade], spec: &BarSpec) -> GroupAssignment {
    match *spec {
        BarSpec::Tick { count } => GroupAssignment::new(assign_tick_groups(trades.len(), count)),
        BarSpec::Volume { .. } | BarSpec::Dollar { .. } => {
            let metrics = match spec {
                BarSpec::Dollar { .. } => transaction_metrics(trades),
                _ => volume_metrics(trades),
            };
            // Threshold schemes always carry a raw threshold
            let threshold = spec.raw_threshold().unwrap_or(i128::MAX);
            GroupAssignment::new(assign_threshold_groups(&metrics, threshold))
        }
        BarSpec::Time { interval_us } => assign_time_groups(trades, interval_us),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::scenarios;

    fn nz(n: u64) -> NonZeroU64 {
        NonZeroU64::new(n).unwrap()
    }

    #[test]
    fn test_tick_groups() {
        assert_eq!(assign_tick_groups(5, nz(2)), vec![0, 0, 1, 1, 2]);
        assert_eq!(assign_tick_groups(4, nz(2)), vec![0, 0, 1, 1]);
        assert_eq!(assign_tick_groups(3, nz(10)), vec![0, 0, 0]);
        assert!(assign_tick_groups(0, nz(3)).is_empty());
    }

    #[test]
    fn test_threshold_groups_exact_boundary() {
        // cum: 1, 2, 3 (close g0), 4, 5, 6 (close g1), 7
        let ids = assign_threshold_groups(&[1, 1, 1, 1, 1, 1, 1], 3);
        assert_eq!(ids, vec![0, 0, 0, 1, 1, 1, 2]);
    }

    #[test]
    fn test_threshold_cumulative_not_reset() {
        // cum: 2, 4 (>=3 close g0), 5, 6 (>=6 close g1)
        // Overshoot of group 0 counts toward group 1
        let ids = assign_threshold_groups(&[2, 2, 1, 1], 3);
        assert_eq!(ids, vec![0, 0, 1, 1]);
    }

    #[test]
    fn test_threshold_jump_advances_by_one() {
        // cum: 10 (>=3 close g0), 11 (>=6 close g1), 12 (>=9 close g2), 13 (<12)
        let ids = assign_threshold_groups(&[10, 1, 1, 1], 3);
        assert_eq!(ids, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_threshold_zero_metrics_stay_in_group() {
        let ids = assign_threshold_groups(&[0, 0, 5, 0], 5);
        assert_eq!(ids, vec![0, 0, 0, 1]);
    }

    #[test]
    fn test_grouper_state() {
        let mut grouper = ThresholdGrouper::new(100);
        assert_eq!(grouper.next_boundary(), 100);
        assert_eq!(grouper.push(60), (0, false));
        assert_eq!(grouper.push(60), (0, true));
        assert_eq!(grouper.cumulative(), 120);
        assert_eq!(grouper.current_group(), 1);
        assert_eq!(grouper.next_boundary(), 200);
    }

    #[test]
    fn test_grouper_saturates() {
        let mut grouper = ThresholdGrouper::new(i128::MAX / 2);
        grouper.push(i128::MAX);
        grouper.push(i128::MAX);
        assert_eq!(grouper.cumulative(), i128::MAX);
    }

    #[test]
    fn test_assign_groups_volume_scenario() {
        let trades = scenarios::three_trade_sequence();
        let spec = BarSpec::volume(3.0).unwrap();
        // cum volume: 1, 2, 4 -> the third trade closes group 0
        assert_eq!(assign_groups(&trades, &spec).group_ids, vec![0, 0, 0]);
    }

    #[test]
    fn test_assign_groups_dollar() {
        let trades = scenarios::three_trade_sequence();
        // transactions: 10, 12, 22 -> cum 10, 22 (>=20 close g0), 44 (>=40 close g1)
        let spec = BarSpec::dollar(20.0).unwrap();
        let assignment = assign_groups(&trades, &spec);
        assert_eq!(assignment.group_ids, vec![0, 0, 1]);
        assert_eq!(assignment.group_count(), 2);
        assert!(assignment.labels.is_none());
    }
}
