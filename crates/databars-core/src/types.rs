//! Bar and bar-series types

use crate::fixed_point::{scaled_to_f64, FixedPoint, SCALE};
use crate::scheme::BarSpec;
use serde::{Deserialize, Serialize};

/// One aggregated bar
///
/// `date`, the four prices, `volume` and `vwap` form the tabular output.
/// `open_time` and `trade_count` are carried for in-memory consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Bar {
    /// Closing timestamp: last trade of the group, or the interval's right edge for time bars
    pub date: i64,

    /// Timestamp of the first trade of the group
    pub open_time: i64,

    pub open: FixedPoint,
    pub high: FixedPoint,
    pub low: FixedPoint,
    pub close: FixedPoint,

    /// Total volume at `SCALE` (i128 so sums over huge groups cannot overflow)
    pub volume: i128,

    /// Volume-weighted average price from the exact turnover ratio
    pub vwap: FixedPoint,

    /// Trades in the group; 0 only for carried-forward empty intervals
    pub trade_count: u64,
}

impl Bar {
    /// Zero-volume bar at `date` priced flat at `prev`'s close
    pub fn carried_forward(prev: &Bar, date: i64) -> Self {
        Self {
            date,
            open_time: date,
            open: prev.close,
            high: prev.close,
            low: prev.close,
            close: prev.close,
            volume: 0,
            vwap: prev.close,
            trade_count: 0,
        }
    }

    pub fn volume_f64(&self) -> f64 {
        scaled_to_f64(self.volume)
    }

    /// Volume as a `FixedPoint`, if it fits in i64 at `SCALE`
    pub fn volume_fixed(&self) -> Option<FixedPoint> {
        i64::try_from(self.volume).ok().map(FixedPoint)
    }

    pub fn vwap_f64(&self) -> f64 {
        self.vwap.to_f64()
    }

    /// Price range (high - low) as f64
    pub fn range_f64(&self) -> f64 {
        (self.high.0 - self.low.0) as f64 / SCALE as f64
    }

    /// Carried-forward empty interval
    pub fn is_empty_interval(&self) -> bool {
        self.trade_count == 0
    }

    /// `low <= open, close <= high`
    pub fn is_consistent(&self) -> bool {
        self.low <= self.high
            && self.low <= self.open
            && self.open <= self.high
            && self.low <= self.close
            && self.close <= self.high
    }
}

/// Ordered bars produced by one run, ascending by group / interval
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BarSeries {
    spec: BarSpec,
    bars: Vec<Bar>,
}

impl BarSeries {
    pub fn new(spec: BarSpec, bars: Vec<Bar>) -> Self {
        Self { spec, bars }
    }

    pub fn spec(&self) -> &BarSpec {
        &self.spec
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Bar> {
        self.bars.iter()
    }

    pub fn first(&self) -> Option<&Bar> {
        self.bars.first()
    }

    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }

    /// Exact sum of bar volumes at `SCALE`
    pub fn total_volume(&self) -> i128 {
        self.bars.iter().map(|b| b.volume).sum()
    }

    pub fn into_bars(self) -> Vec<Bar> {
        self.bars
    }
}

impl<'a> IntoIterator for &'a BarSeries {
    type Item = &'a Bar;
    type IntoIter = std::slice::Iter<'a, Bar>;

    fn into_iter(self) -> Self::IntoIter {
        self.bars.iter()
    }
}

impl IntoIterator for BarSeries {
    type Item = Bar;
    type IntoIter = std::vec::IntoIter<Bar>;

    fn into_iter(self) -> Self::IntoIter {
        self.bars.into_iter()
    }
}
