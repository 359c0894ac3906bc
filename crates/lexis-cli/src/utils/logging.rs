//! Logging initialization and configuration.
//!
//! Sets up the tracing subscriber and color control based on CLI flags and
//! environment variables.

use anyhow::Result;
use colored::control as color_control;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use crate::cli::Cli;
use crate::output::OutputFormat;

/// Log level for the given flags.
///
/// Machine-readable output keeps stderr quiet unless `--verbose` was given.
pub fn level_for(cli: &Cli) -> Level {
    if cli.verbose {
        Level::DEBUG
    } else if matches!(cli.output_format(), Some(OutputFormat::Json)) {
        Level::ERROR
    } else {
        Level::WARN
    }
}

/// Initialize the logging subsystem based on CLI flags.
///
/// # Errors
///
/// Returns an error if the global tracing subscriber cannot be set.
pub fn initialize_logging(cli: &Cli) -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level_for(cli))
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let machine_output = matches!(cli.output_format(), Some(OutputFormat::Json));
    if std::env::var_os("NO_COLOR").is_some() || machine_output {
        color_control::set_override(false);
    }
    Ok(())
}
