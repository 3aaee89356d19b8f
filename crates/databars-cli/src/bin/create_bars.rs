//! create-bars: trade CSV in, bar table out

use clap::Parser;
use databars_cli::{run, CliError, CreateBarsArgs};
use databars_config::Settings;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::EnvFilter;

fn load_settings(args: &CreateBarsArgs) -> Result<Settings, CliError> {
    let settings = match &args.config {
        Some(path) => Settings::load_from_file(path)?,
        None => Settings::load()?,
    };
    Ok(settings.merge_cli_args(args))
}

fn init_tracing(settings: &Settings) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(settings.app.log_directive()))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(settings.app.is_debug())
        .init();
}

fn main() -> ExitCode {
    let args = CreateBarsArgs::parse();

    let settings = match load_settings(&args) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("create-bars: {e}");
            return ExitCode::FAILURE;
        }
    };
    init_tracing(&settings);

    match run(&settings, &args.input, &args.output, args.format) {
        Ok(summary) => {
            println!(
                "{} trades -> {} bars ({}) in {:.2?}: {}",
                summary.trades,
                summary.bars,
                summary.format,
                summary.elapsed,
                summary.output.display()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "create-bars failed");
            ExitCode::FAILURE
        }
    }
}
