//! `create-bars` command line

use clap::Parser;
use databars_config::{CliConfigMerge, OutputFormat, Settings};
use databars_core::{BarKind, EmptyIntervalPolicy};
use std::path::PathBuf;

/// Build bars from a trade CSV file
#[derive(Parser, Debug, Clone)]
#[command(
    name = "create-bars",
    version,
    about = "Aggregate time-ordered trades into tick, volume, dollar or time bars",
    long_about = "
Reads a trade CSV (TickData.com `Date,Time,Price,Volume` by default), groups the
trades by the chosen scheme and writes one row per bar:
date,open,high,low,close,volume,vwap

Units per scheme:
  tick    trades per bar (whole number)
  volume  traded quantity per bar
  dollar  traded value (price x volume) per bar
  time    bar length in minutes

Examples:
  create-bars --input trades.csv --kind dollar --units 35638840 --output dollar_bars.csv
  create-bars -i trades.csv -k time -u 5 -o bars.csv --empty-intervals carry-forward
  create-bars -i trades.csv -k volume -u 2500 -o bars.parquet --format parquet
"
)]
pub struct CreateBarsArgs {
    /// Trade CSV file
    #[arg(short, long, value_name = "FILE")]
    pub input: PathBuf,

    /// Output file; bare names are placed under `export.output_dir`
    #[arg(short, long, value_name = "FILE")]
    pub output: PathBuf,

    /// Bar scheme: tick, volume, dollar or time (default from config)
    #[arg(short, long)]
    pub kind: Option<BarKind>,

    /// Units per bar for the chosen scheme (default from config)
    #[arg(short, long)]
    pub units: Option<f64>,

    /// Configuration file (TOML); `databars.toml` in the working directory otherwise
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Time bars only: skip or carry-forward intervals without trades
    #[arg(long, value_name = "POLICY")]
    pub empty_intervals: Option<EmptyIntervalPolicy>,

    /// Output format: csv, parquet or ipc (inferred from the extension otherwise)
    #[arg(short, long)]
    pub format: Option<OutputFormat>,

    /// Reduce groups on a rayon pool
    #[arg(long)]
    pub parallel: bool,

    /// Worker threads for --parallel
    #[arg(long)]
    pub workers: Option<usize>,
}

impl CliConfigMerge for CreateBarsArgs {
    fn merge_into_config(&self, config: &mut Settings) {
        if let Some(kind) = self.kind {
            config.bars.default_kind = kind;
        }
        if let Some(units) = self.units {
            config.bars.default_units = units;
        }
        if let Some(policy) = self.empty_intervals {
            config.bars.empty_intervals = policy;
        }
        if let Some(format) = self.format {
            config.export.format = format;
        }
        if self.parallel {
            config.bars.parallel = true;
        }
        if let Some(workers) = self.workers {
            config.app.worker_threads = Some(workers);
        }
    }
}
