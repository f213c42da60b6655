//! Rotor CLI Binary
//!
//! Command-line interface for the map rotation generator.

use clap::Parser;
use rotor::cli::{self, Cli};
use rotor::config::RotorConfig;
use rotor::error::ConfigError;
use rotor::logging::{init_logging, LoggingConfig};
use std::path::Path;
use std::process;
use tracing::{error, info};

fn main() {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    };

    let logging_config = build_logging_config(&cli, &config);
    if let Err(e) = init_logging(Some(&logging_config)) {
        eprintln!("Failed to initialize logging: {}", e);
        process::exit(1);
    }

    info!("rotor starting");

    match cli::execute(&cli, &config) {
        Ok(output) => {
            info!("command completed successfully");
            println!("{}", output);
        }
        Err(e) => {
            error!("command failed: {}", e);
            eprintln!("{}", cli::map_error(&e));
            process::exit(1);
        }
    }
}

fn load_config(cli: &Cli) -> Result<RotorConfig, ConfigError> {
    match &cli.config {
        Some(path) => RotorConfig::load_from_file(path),
        None => RotorConfig::load(Path::new(".")),
    }
}

/// Build logging configuration from CLI args, environment, and config file.
/// Precedence: CLI flags override config file override defaults.
fn build_logging_config(cli: &Cli, config: &RotorConfig) -> LoggingConfig {
    let mut logging = config.logging.clone();

    if cli.quiet {
        logging.level = "off".to_string();
    }
    if cli.verbose {
        logging.level = "debug".to_string();
    }
    if let Some(ref level) = cli.log_level {
        logging.level = level.clone();
    }
    if let Some(ref format) = cli.log_format {
        logging.format = format.clone();
    }
    if let Some(ref output) = cli.log_output {
        logging.output = output.clone();
    }

    logging
}
