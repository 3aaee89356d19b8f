//! `create-bars` command line front end
//!
//! Argument parsing, settings merge and the read -> build -> write pipeline.

pub mod args;
pub mod pipeline;

pub use args::CreateBarsArgs;
pub use pipeline::{run, trade_layout, CliError, RunSummary};
