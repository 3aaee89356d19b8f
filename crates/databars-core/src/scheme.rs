//! Bar sampling schemes and their validated parameters

use crate::errors::ProcessingError;
use crate::fixed_point::SCALE;
use crate::timestamp::{minutes_to_micros, MICROS_PER_MINUTE};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU64;
use std::str::FromStr;

/// Bar-type selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BarKind {
    /// Fixed number of trades per bar
    Tick,
    /// Fixed cumulative traded volume per bar
    Volume,
    /// Fixed cumulative traded value (price * volume) per bar
    Dollar,
    /// Fixed wall-clock interval per bar
    Time,
}

impl BarKind {
    pub const ALL: [BarKind; 4] = [BarKind::Tick, BarKind::Volume, BarKind::Dollar, BarKind::Time];

    pub fn as_str(&self) -> &'static str {
        match self {
            BarKind::Tick => "tick",
            BarKind::Volume => "volume",
            BarKind::Dollar => "dollar",
            BarKind::Time => "time",
        }
    }
}

impl fmt::Display for BarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BarKind {
    type Err = ProcessingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tick" => Ok(BarKind::Tick),
            "volume" => Ok(BarKind::Volume),
            "dollar" => Ok(BarKind::Dollar),
            "time" => Ok(BarKind::Time),
            _ => Err(ProcessingError::InvalidScheme {
                scheme: s.to_string(),
            }),
        }
    }
}

/// A bar scheme together with its strongly-typed, already validated parameter
///
/// Construct through [`BarSpec::from_units`] or the per-scheme constructors;
/// invalid combinations are rejected there and never reach the grouping loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum BarSpec {
    /// `count` trades per bar
    Tick { count: NonZeroU64 },
    /// Bar closes once cumulative volume reaches the next multiple of `threshold`
    ///
    /// `threshold` is the raw amount at 10^8, like a `FixedPoint` but wide.
    Volume { threshold: i128 },
    /// Bar closes once cumulative transaction value reaches the next multiple of `threshold`
    ///
    /// `threshold` is the raw amount at 10^8; traded value itself is far larger
    /// than any single price or volume, so this does not fit a `FixedPoint`.
    Dollar { threshold: i128 },
    /// Right-closed wall-clock intervals of `interval_us` microseconds
    Time { interval_us: i64 },
}

impl BarSpec {
    pub fn tick(count: u64) -> Result<Self, ProcessingError> {
        NonZeroU64::new(count)
            .map(|count| BarSpec::Tick { count })
            .ok_or(ProcessingError::InvalidParameter {
                kind: BarKind::Tick,
                units: count as f64,
                reason: "trade count must be positive",
            })
    }

    pub fn volume(threshold: f64) -> Result<Self, ProcessingError> {
        raw_threshold_units(BarKind::Volume, threshold).map(|threshold| BarSpec::Volume { threshold })
    }

    pub fn dollar(threshold: f64) -> Result<Self, ProcessingError> {
        raw_threshold_units(BarKind::Dollar, threshold).map(|threshold| BarSpec::Dollar { threshold })
    }

    pub fn time_minutes(minutes: f64) -> Result<Self, ProcessingError> {
        minutes_to_micros(minutes)
            .map(|interval_us| BarSpec::Time { interval_us })
            .ok_or(ProcessingError::InvalidParameter {
                kind: BarKind::Time,
                units: minutes,
                reason: "interval must be a positive number of minutes",
            })
    }

    /// Validate `units` for the given scheme
    ///
    /// `units` means trade count, traded volume, traded value or minutes
    /// depending on `kind`. Tick counts must be whole numbers.
    pub fn from_units(kind: BarKind, units: f64) -> Result<Self, ProcessingError> {
        match kind {
            BarKind::Tick => {
                if !units.is_finite() || units < 1.0 || units.fract() != 0.0 || units > u64::MAX as f64 {
                    return Err(ProcessingError::InvalidParameter {
                        kind,
                        units,
                        reason: "trade count must be a positive whole number",
                    });
                }
                BarSpec::tick(units as u64)
            }
            BarKind::Volume => BarSpec::volume(units),
            BarKind::Dollar => BarSpec::dollar(units),
            BarKind::Time => BarSpec::time_minutes(units),
        }
    }

    /// Parse a scheme selector string and validate `units` for it
    pub fn parse(kind: &str, units: f64) -> Result<Self, ProcessingError> {
        BarSpec::from_units(kind.parse()?, units)
    }

    pub fn kind(&self) -> BarKind {
        match self {
            BarSpec::Tick { .. } => BarKind::Tick,
            BarSpec::Volume { .. } => BarKind::Volume,
            BarSpec::Dollar { .. } => BarKind::Dollar,
            BarSpec::Time { .. } => BarKind::Time,
        }
    }

    /// The parameter expressed in the caller's units (count, volume, value or minutes)
    pub fn units(&self) -> f64 {
        match self {
            BarSpec::Tick { count } => count.get() as f64,
            BarSpec::Volume { threshold } | BarSpec::Dollar { threshold } => {
                *threshold as f64 / SCALE as f64
            }
            BarSpec::Time { interval_us } => *interval_us as f64 / MICROS_PER_MINUTE as f64,
        }
    }

    /// Threshold in the raw scale of the cumulated metric
    ///
    /// Volume sums are at `SCALE`, transaction sums at `TURNOVER_SCALE`.
    /// `None` for schemes that do not accumulate a metric.
    pub fn raw_threshold(&self) -> Option<i128> {
        match self {
            BarSpec::Volume { threshold } => Some(*threshold),
            BarSpec::Dollar { threshold } => Some(threshold * SCALE as i128),
            BarSpec::Tick { .. } | BarSpec::Time { .. } => None,
        }
    }
}

impl fmt::Display for BarSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BarSpec::Tick { count } => write!(f, "tick({count})"),
            BarSpec::Volume { threshold } => write_scaled(f, "volume", *threshold),
            BarSpec::Dollar { threshold } => write_scaled(f, "dollar", *threshold),
            BarSpec::Time { .. } => write!(f, "time({}m)", self.units()),
        }
    }
}

/// Largest raw threshold; keeps the dollar threshold at 10^16 within `i128`
const MAX_RAW_THRESHOLD: i128 = i128::MAX / SCALE as i128;

/// Round `units` to 8 decimal places as a raw `i128`
fn raw_threshold_units(kind: BarKind, units: f64) -> Result<i128, ProcessingError> {
    let invalid = |reason| ProcessingError::InvalidParameter { kind, units, reason };

    if !units.is_finite() {
        return Err(invalid("threshold must be a finite number"));
    }
    let raw = (units * SCALE as f64).round();
    if raw < 1.0 {
        return Err(invalid("threshold must be positive"));
    }
    if raw >= MAX_RAW_THRESHOLD as f64 {
        return Err(invalid("threshold is too large"));
    }
    Ok(raw as i128)
}

fn write_scaled(f: &mut fmt::Formatter<'_>, name: &str, raw: i128) -> fmt::Result {
    let scale = SCALE as i128;
    let (whole, frac) = (raw / scale, raw % scale);
    if frac == 0 {
        write!(f, "{name}({whole})")
    } else {
        let digits = format!("{frac:08}");
        write!(f, "{name}({whole}.{})", digits.trim_end_matches('0'))
    }
}

/// What the time resampler does with intervals that contain no trades
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EmptyIntervalPolicy {
    /// Emit no bar for an empty interval
    #[default]
    Skip,
    /// Emit a zero-volume bar priced at the previous close
    CarryForward,
}

impl FromStr for EmptyIntervalPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "skip" => Ok(EmptyIntervalPolicy::Skip),
            "carry-forward" | "carry_forward" | "carryforward" => {
                Ok(EmptyIntervalPolicy::CarryForward)
            }
            other => Err(format!(
                "unknown empty interval policy '{other}': expected skip or carry-forward"
            )),
        }
    }
}
