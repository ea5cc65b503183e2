//! circuit-pricer binary entry point.
//!
//! All logic lives in the library (`circuit_pricer`); this file wires
//! configuration, logging and output together.

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing::debug;

use circuit_pricer::config::{LoggingSettings, PricerConfig};
use circuit_pricer::{execute, init_tracing, Cli};

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let logging = init_tracing(&LoggingSettings::default().filter);

    let mut config = PricerConfig::load(cli.config.clone())
        .context("Failed to load pricer configuration")?
        .with_store_path(cli.store.clone());
    config.output.pretty |= cli.pretty;
    config.validate().context("Invalid pricer configuration")?;

    logging.apply(&config.logging.filter);
    debug!(store = ?config.store_path(), command = ?cli.command, "Starting circuit-pricer");

    let (output, exit_code) = match execute(&cli.command, config.store_path()) {
        Ok(value) => (value, ExitCode::SUCCESS),
        Err(err) => {
            let code = ExitCode::from(err.code.exit_code());
            (serde_json::to_value(&err)?, code)
        }
    };

    let rendered = if config.output.pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    println!("{}", rendered);

    Ok(exit_code)
}
