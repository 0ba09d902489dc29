//! Command line interface for dockpanel_bundler.
//!
//! Parses arguments, layers the configuration file under them and runs the
//! selected packaging pipeline with colored progress output.

pub(crate) mod args;
pub mod commands;
mod output;

pub use args::{Args, Command, NameArgs, RuntimeConfig};
pub use commands::execute_command;
pub use output::OutputManager;

use crate::error::Result;

/// Main CLI entry point
pub async fn run() -> Result<i32> {
    let args = Args::parse_args();
    execute_command(args).await
}
