//! odactk -- ODA component conformance scenario runner.
//!
//! Parses arguments, loads `odactk.toml`, initialises logging and dispatches
//! to one handler per subcommand. Errors are printed to stderr and mapped
//! to exit codes by [`CliError::exit_code`].

mod cli;
mod commands;
mod error;
mod logging;
mod output;

use std::path::Path;

use clap::Parser;

use odactk_core::config::{CtkConfig, GeneralConfig};

use crate::cli::{Cli, Commands};
use crate::error::CliError;
use crate::output::OutputWriter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let writer = OutputWriter::new(cli.output);

    let code = match run(cli, &writer).await {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("error: {e}");
            e.exit_code()
        }
    };
    std::process::exit(code);
}

async fn run(cli: Cli, writer: &OutputWriter) -> Result<(), CliError> {
    let log_level = cli.log_level.as_deref();

    match cli.command {
        // `config validate` must report a broken file instead of failing on load.
        Commands::Config(args) => {
            let mut general = GeneralConfig::default();
            if let Some(level) = log_level {
                general.log_level = level.to_owned();
            }
            init_logging(&general)?;
            commands::config::execute(args, &cli.config, writer).await
        }
        Commands::Run(args) => {
            let config = load_config(&cli.config, log_level).await?;
            commands::run::execute(args, config, writer).await
        }
        Commands::Resolve(args) => {
            let config = load_config(&cli.config, log_level).await?;
            commands::resolve::execute(args, &config, writer).await
        }
        Commands::Stub(args) => {
            let config = load_config(&cli.config, log_level).await?;
            commands::stub::execute(args, &config, writer).await
        }
    }
}

async fn load_config(path: &Path, log_level: Option<&str>) -> Result<CtkConfig, CliError> {
    let mut config = CtkConfig::load(path).await?;
    if let Some(level) = log_level {
        config.general.log_level = level.to_owned();
    }
    init_logging(&config.general)?;
    tracing::debug!(path = %path.display(), "configuration loaded");
    Ok(config)
}

fn init_logging(general: &GeneralConfig) -> Result<(), CliError> {
    logging::init_tracing(general).map_err(|e| CliError::Config(e.to_string()))
}
