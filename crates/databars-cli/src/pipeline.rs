//! Reader -> bar construction -> writer

use databars_config::{InputConfig, OutputFormat, Settings};
use databars_core::{create_bars_with_policy, BarSeries, ProcessingError, Trade};
use databars_io::{
    BarCsvWriter, ReadError, TimestampColumns, TradeCsvLayout, TradeCsvReader, WriteError,
};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Reading trades failed: {0}")]
    Read(#[from] ReadError),

    #[error("Bar construction failed: {0}")]
    Processing(#[from] ProcessingError),

    #[error("Writing bars failed: {0}")]
    Write(#[from] WriteError),

    #[cfg(feature = "polars")]
    #[error("Columnar export failed: {0}")]
    Export(#[from] databars_io::ExportError),

    #[error("{format} output requires building with the `polars` feature")]
    FormatUnavailable { format: OutputFormat },

    #[cfg(feature = "parallel")]
    #[error("Failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Counts and timing of a completed run
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub trades: usize,
    pub bars: usize,
    pub output: PathBuf,
    pub format: OutputFormat,
    pub elapsed: Duration,
}

/// Trade CSV layout described by the `input` section
pub fn trade_layout(input: &InputConfig) -> TradeCsvLayout {
    let timestamp = match &input.timestamp_column {
        Some(column) => TimestampColumns::Epoch {
            column: column.clone(),
        },
        None => TimestampColumns::DateTime {
            date: input.date_column.clone(),
            time: input.time_column.clone(),
            format: input.datetime_format.clone(),
        },
    };

    TradeCsvLayout {
        timestamp,
        price_column: input.price_column.clone(),
        volume_column: input.volume_column.clone(),
        delimiter: input.delimiter_byte().unwrap_or(b','),
    }
}

/// Read `input`, build bars per `settings.bars`, write them to `output`
///
/// An explicit `format` wins over the output file extension, which wins over
/// `export.format`.
pub fn run(
    settings: &Settings,
    input: &Path,
    output: &Path,
    format: Option<OutputFormat>,
) -> Result<RunSummary, CliError> {
    let started = Instant::now();
    let spec = settings.bars.spec(None, None)?;
    let output = settings.export.resolve_output_path(output);
    let format = format.unwrap_or_else(|| settings.export.format_for(&output));

    info!(input = %input.display(), scheme = %spec, format = %format, "starting");

    let trades = TradeCsvReader::new(trade_layout(&settings.input)).read_path(input)?;
    let series = build_series(settings, &trades)?;
    info!(trades = trades.len(), bars = series.len(), "built bars");

    write_series(settings, &series, &output, format)?;

    let summary = RunSummary {
        trades: trades.len(),
        bars: series.len(),
        output,
        format,
        elapsed: started.elapsed(),
    };
    info!(
        output = %summary.output.display(),
        bars = summary.bars,
        elapsed_ms = summary.elapsed.as_millis() as u64,
        "done"
    );
    Ok(summary)
}

fn build_series(settings: &Settings, trades: &[Trade]) -> Result<BarSeries, CliError> {
    let spec = settings.bars.spec(None, None)?;
    let policy = settings.bars.empty_intervals;

    if settings.bars.parallel {
        #[cfg(feature = "parallel")]
        {
            let workers = settings.app.worker_threads();
            let pool = rayon::ThreadPoolBuilder::new().num_threads(workers).build()?;
            info!(workers, "aggregating in parallel");
            return Ok(pool.install(|| {
                databars_core::create_bars_parallel(trades, &spec, policy)
            })?);
        }
        #[cfg(not(feature = "parallel"))]
        tracing::warn!("bars.parallel is set but this build lacks the `parallel` feature; aggregating sequentially");
    }

    Ok(create_bars_with_policy(trades, &spec, policy)?)
}

fn write_series(
    settings: &Settings,
    series: &BarSeries,
    output: &Path,
    format: OutputFormat,
) -> Result<(), CliError> {
    match format {
        OutputFormat::Csv => {
            BarCsvWriter::new()
                .with_precision(settings.export.float_precision)
                .write_path(series.bars(), output)?;
        }
        #[cfg(feature = "polars")]
        OutputFormat::Parquet | OutputFormat::Ipc if series.is_empty() => {
            tracing::warn!(output = %output.display(), "no bars to write; columnar output skipped");
        }
        #[cfg(feature = "polars")]
        OutputFormat::Parquet => {
            databars_io::PolarsExporter::new().export_parquet(series.bars(), output)?;
        }
        #[cfg(feature = "polars")]
        OutputFormat::Ipc => {
            databars_io::PolarsExporter::new().export_arrow_ipc(series.bars(), output)?;
        }
        #[cfg(not(feature = "polars"))]
        OutputFormat::Parquet | OutputFormat::Ipc => {
            return Err(CliError::FormatUnavailable { format });
        }
    }
    Ok(())
}
