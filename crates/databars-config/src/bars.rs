//! Bar construction defaults

use databars_core::{BarKind, BarSpec, EmptyIntervalPolicy, ProcessingError};
use serde::{Deserialize, Serialize};

/// Bar construction configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BarsConfig {
    /// Scheme used when none is given on the command line
    pub default_kind: BarKind,

    /// Units used when none are given (count, volume, value or minutes)
    pub default_units: f64,

    /// Treatment of time intervals without trades
    pub empty_intervals: EmptyIntervalPolicy,

    /// Reduce groups on the rayon pool
    pub parallel: bool,
}

impl Default for BarsConfig {
    fn default() -> Self {
        Self {
            default_kind: BarKind::Tick,
            default_units: 1000.0,
            empty_intervals: EmptyIntervalPolicy::Skip,
            parallel: false,
        }
    }
}

impl BarsConfig {
    /// Resolve a validated spec, falling back to the configured defaults
    pub fn spec(&self, kind: Option<BarKind>, units: Option<f64>) -> Result<BarSpec, ProcessingError> {
        BarSpec::from_units(
            kind.unwrap_or(self.default_kind),
            units.unwrap_or(self.default_units),
        )
    }
}
