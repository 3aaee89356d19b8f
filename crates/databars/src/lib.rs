//! Tick, volume, dollar and time bars from time-ordered trades.
//!
//! Meta-crate re-exporting the databars sub-crates:
//!
//! - `databars-core` - grouping, aggregation and the streaming processor
//! - `databars-config` - layered settings (`config` feature)
//! - `databars-io` - trade CSV reader, bar CSV writer, Polars export (`io`, `polars`)
//!
//! ## Features
//!
//! - `config` - configuration management (default)
//! - `io` - CSV input and output (default)
//! - `polars` - Parquet and Arrow IPC export
//! - `parallel` - rayon-backed per-group aggregation
//! - `full` - all of the above
//!
//! ## Basic Usage
//!
//! ```rust
//! use databars::{create_bars, BarSpec, Trade};
//!
//! let trades = vec![
//!     Trade::from_f64(1_609_459_200_000_000, 10.0, 1.0).unwrap(),
//!     Trade::from_f64(1_609_459_201_000_000, 12.0, 1.0).unwrap(),
//!     Trade::from_f64(1_609_459_202_000_000, 11.0, 2.0).unwrap(),
//! ];
//!
//! let series = create_bars(&trades, &BarSpec::tick(2).unwrap()).unwrap();
//! assert_eq!(series.len(), 2);
//! assert_eq!(series.bars()[0].vwap.to_string(), "11.00000000");
//! ```
//!
//! ## Streaming
//!
//! ```rust
//! use databars::{BarProcessor, BarSpec, Trade};
//!
//! let mut processor = BarProcessor::new(BarSpec::volume(3.0).unwrap());
//! let trade = Trade::from_f64(1_609_459_200_000_000, 10.0, 4.0).unwrap();
//!
//! let closed = processor.process_single_trade(&trade).unwrap();
//! assert!(closed.is_some());
//! assert!(processor.finish().unwrap().is_none());
//! ```

pub use databars_core as core;

#[cfg(feature = "config")]
pub use databars_config as config;

#[cfg(feature = "io")]
pub use databars_io as io;

pub use databars_core::{
    create_bars, create_bars_from_str, create_bars_with_policy, Bar, BarKind, BarProcessor,
    BarSeries, BarSpec, EmptyIntervalPolicy, FixedPoint, ProcessingError, Trade,
};

#[cfg(feature = "parallel")]
pub use databars_core::create_bars_parallel;

#[cfg(feature = "config")]
pub use databars_config::Settings;

#[cfg(feature = "io")]
pub use databars_io::{BarCsvWriter, TradeCsvLayout, TradeCsvReader};

#[cfg(feature = "polars")]
pub use databars_io::PolarsExporter;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
