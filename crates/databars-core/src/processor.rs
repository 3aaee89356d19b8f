//! Bar construction entry points
//!
//! [`create_bars`] runs the batch pipeline (ordering check, group assignment,
//! aggregation). [`BarProcessor`] is the streaming equivalent that consumes one
//! trade at a time and emits each bar as soon as it is complete.

use crate::aggregate::{aggregate, BarAccumulator};
use crate::errors::ProcessingError;
use crate::grouping::{assign_groups, GroupId, ThresholdGrouper};
use crate::resample::{fill_empty_intervals, TimeResampler};
use crate::scheme::{BarSpec, EmptyIntervalPolicy};
use crate::trade::Trade;
use crate::types::{Bar, BarSeries};
use tracing::debug;

/// Build bars from time-ordered trades, skipping empty time intervals
///
/// Returns an empty series for empty input.
pub fn create_bars(trades: &[Trade], spec: &BarSpec) -> Result<BarSeries, ProcessingError> {
    create_bars_with_policy(trades, spec, EmptyIntervalPolicy::Skip)
}

/// Build bars with an explicit policy for empty time intervals
///
/// The policy only affects time bars.
pub fn create_bars_with_policy(
    trades: &[Trade],
    spec: &BarSpec,
    policy: EmptyIntervalPolicy,
) -> Result<BarSeries, ProcessingError> {
    validate_trade_ordering(trades)?;

    let assignment = assign_groups(trades, spec);
    let bars = aggregate(trades, &assignment)?;
    let bars = apply_policy(bars, spec, policy);

    debug!(
        scheme = %spec.kind(),
        units = spec.units(),
        trades = trades.len(),
        bars = bars.len(),
        "created bars"
    );

    Ok(BarSeries::new(*spec, bars))
}

/// [`create_bars_with_policy`] with groups reduced on the rayon pool
#[cfg(feature = "parallel")]
pub fn create_bars_parallel(
    trades: &[Trade],
    spec: &BarSpec,
    policy: EmptyIntervalPolicy,
) -> Result<BarSeries, ProcessingError> {
    validate_trade_ordering(trades)?;

    let assignment = assign_groups(trades, spec);
    let bars = crate::aggregate::aggregate_parallel(trades, &assignment)?;
    let bars = apply_policy(bars, spec, policy);

    debug!(
        scheme = %spec.kind(),
        units = spec.units(),
        trades = trades.len(),
        bars = bars.len(),
        parallel = true,
        "created bars"
    );

    Ok(BarSeries::new(*spec, bars))
}

/// Stringly-typed entry point: `scheme` is one of tick, volume, dollar, time
pub fn create_bars_from_str(
    trades: &[Trade],
    units: f64,
    scheme: &str,
) -> Result<BarSeries, ProcessingError> {
    let spec = BarSpec::parse(scheme, units)?;
    create_bars(trades, &spec)
}

fn apply_policy(bars: Vec<Bar>, spec: &BarSpec, policy: EmptyIntervalPolicy) -> Vec<Bar> {
    match (spec, policy) {
        (BarSpec::Time { interval_us }, EmptyIntervalPolicy::CarryForward) => {
            fill_empty_intervals(bars, *interval_us)
        }
        _ => bars,
    }
}

/// Fail on the first strictly decreasing timestamp; equal timestamps are allowed
pub fn validate_trade_ordering(trades: &[Trade]) -> Result<(), ProcessingError> {
    for i in 1..trades.len() {
        let prev = &trades[i - 1];
        let curr = &trades[i];

        if curr.timestamp < prev.timestamp {
            return Err(ProcessingError::UnsortedTrades {
                index: i,
                prev_time: prev.timestamp,
                curr_time: curr.timestamp,
            });
        }
    }

    Ok(())
}

/// Scheme-specific boundary state of the streaming processor
#[derive(Debug, Clone)]
enum Boundary {
    Tick { count: u64 },
    Threshold { grouper: ThresholdGrouper, dollar: bool },
    Time { resampler: Option<TimeResampler>, interval_us: i64 },
}

/// Streaming bar processor
///
/// Produces exactly the bars [`create_bars`] produces for the same trades
/// (empty time intervals are never emitted; run [`fill_empty_intervals`] over
/// the collected bars to carry them forward). After an error the processor
/// state is unspecified and it should be discarded.
#[derive(Debug, Clone)]
pub struct BarProcessor {
    spec: BarSpec,
    boundary: Boundary,

    /// Bar currently being built
    current_bar: Option<BarAccumulator>,

    /// Right-edge label of the current bar (time bars)
    current_label: Option<i64>,

    /// Group id of the current bar
    group: GroupId,

    /// Trades consumed so far (index of the next trade)
    trades_seen: usize,

    last_timestamp: Option<i64>,
}

impl BarProcessor {
    pub fn new(spec: BarSpec) -> Self {
        let boundary = match spec {
            BarSpec::Tick { count } => Boundary::Tick { count: count.get() },
            BarSpec::Volume { .. } | BarSpec::Dollar { .. } => Boundary::Threshold {
                grouper: ThresholdGrouper::new(spec.raw_threshold().unwrap_or(i128::MAX)),
                dollar: matches!(spec, BarSpec::Dollar { .. }),
            },
            BarSpec::Time { interval_us } => Boundary::Time {
                resampler: None,
                interval_us,
            },
        };

        Self {
            spec,
            boundary,
            current_bar: None,
            current_label: None,
            group: 0,
            trades_seen: 0,
            last_timestamp: None,
        }
    }

    pub fn spec(&self) -> &BarSpec {
        &self.spec
    }

    /// Trades consumed so far
    pub fn trades_processed(&self) -> usize {
        self.trades_seen
    }

    /// Process one trade and return the bar it completed, if any
    ///
    /// Volume, dollar and tick bars complete on the trade that closes them.
    /// Time bars complete when the first trade of a later interval arrives.
    pub fn process_single_trade(&mut self, trade: &Trade) -> Result<Option<Bar>, ProcessingError> {
        if let Some(prev_time) = self.last_timestamp {
            if trade.timestamp < prev_time {
                return Err(ProcessingError::UnsortedTrades {
                    index: self.trades_seen,
                    prev_time,
                    curr_time: trade.timestamp,
                });
            }
        }
        self.last_timestamp = Some(trade.timestamp);
        self.trades_seen += 1;

        match &mut self.boundary {
            Boundary::Tick { count } => {
                let closes = self.current_bar.as_ref().map_or(1, |bar| bar.trade_count + 1) >= *count;
                self.push_trade(trade);
                if closes {
                    return self.close_current().map(Some);
                }
                Ok(None)
            }
            Boundary::Threshold { grouper, dollar } => {
                let metric = if *dollar {
                    trade.transaction()
                } else {
                    trade.volume.0 as i128
                };
                let (_, closes) = grouper.push(metric);
                self.push_trade(trade);
                if closes {
                    return self.close_current().map(Some);
                }
                Ok(None)
            }
            Boundary::Time {
                resampler,
                interval_us,
            } => {
                let resampler =
                    *resampler.get_or_insert_with(|| TimeResampler::anchored_at(trade.timestamp, *interval_us));
                let label = resampler.label_for(trade.timestamp);

                let completed = match self.current_label {
                    Some(current) if current != label => Some(self.close_current()?),
                    _ => None,
                };
                self.current_label = Some(label);
                self.push_trade(trade);
                Ok(completed)
            }
        }
    }

    /// Process a slice of trades, returning every bar completed along the way
    pub fn process_trades(&mut self, trades: &[Trade]) -> Result<Vec<Bar>, ProcessingError> {
        let mut bars = Vec::new();
        for trade in trades {
            if let Some(bar) = self.process_single_trade(trade)? {
                bars.push(bar);
            }
        }
        Ok(bars)
    }

    /// Snapshot of the forming bar without consuming it
    ///
    /// The vwap is provisional and equals the last price while the forming
    /// bar has no volume.
    pub fn get_incomplete_bar(&self) -> Option<Bar> {
        self.current_bar
            .as_ref()
            .map(|bar| bar.provisional(self.current_label))
    }

    /// Flush the trailing partial bar
    pub fn finish(&mut self) -> Result<Option<Bar>, ProcessingError> {
        if self.current_bar.is_none() {
            return Ok(None);
        }
        self.close_current().map(Some)
    }

    fn push_trade(&mut self, trade: &Trade) {
        match &mut self.current_bar {
            Some(bar) => bar.update_with_trade(trade),
            None => self.current_bar = Some(BarAccumulator::new(trade)),
        }
    }

    fn close_current(&mut self) -> Result<Bar, ProcessingError> {
        let Some(acc) = self.current_bar.take() else {
            return Err(ProcessingError::InvalidGrouping {
                reason: "no open bar to close".to_string(),
            });
        };
        let label = self.current_label.take();
        let bar = acc.finish(self.group, label)?;
        self.group += 1;
        Ok(bar)
    }
}
