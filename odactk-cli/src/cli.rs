//! CLI argument parsing using clap derive API
//!
//! This module defines the command-line interface structure using clap's derive macros.
//! It is purely declarative with no side effects or I/O.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// odactk -- ODA component conformance scenarios against a live cluster.
///
/// Use `odactk <COMMAND> --help` for subcommand details.
#[derive(Parser, Debug)]
#[command(name = "odactk", version, about, long_about = None)]
pub struct Cli {
    /// Path to the odactk.toml configuration file.
    #[arg(short, long, default_value = "odactk.toml")]
    pub config: PathBuf,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Output format.
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON.
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run every feature scenario tagged for the component.
    Run(RunArgs),

    /// Discover the exposed and dependent API base URLs.
    Resolve(ResolveArgs),

    /// Find the stub release serving a dependent API URL.
    Stub(StubArgs),

    /// Manage configuration.
    Config(ConfigArgs),
}

// ---- run ----

/// Run feature scenarios and write the JSON run report.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Feature directory (overrides `run.features_dir`).
    #[arg(long)]
    pub features: Option<PathBuf>,

    /// Component to run (overrides `run.component_to_run`).
    #[arg(long)]
    pub component: Option<String>,

    /// Report directory (overrides `run.results_dir`).
    #[arg(long)]
    pub results: Option<PathBuf>,
}

// ---- resolve ----

/// Resolve API base URLs of the component under test.
#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Exposed API identifier (e.g. TMF632).
    #[arg(long)]
    pub exposed: String,

    /// Dependent API identifier (e.g. TMF669).
    #[arg(long)]
    pub dependent: String,
}

// ---- stub ----

/// Match configured stub candidates against a dependent API URL.
#[derive(Args, Debug)]
pub struct StubArgs {
    /// Resolved dependent API base URL.
    #[arg(long)]
    pub dependent_url: String,

    /// Component under test (overrides `run.component_to_run`).
    #[arg(long)]
    pub component: Option<String>,

    /// Dependent component name, used for logging only.
    #[arg(long, default_value = "")]
    pub dependent_component: String,
}

// ---- config ----

/// Manage odactk configuration.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Validate the configuration file and report errors.
    Validate,
    /// Show the effective configuration (file + env overrides + defaults).
    Show {
        /// Show only a specific section (general, cluster, run, http, retry, dependent_stubs).
        #[arg(long)]
        section: Option<String>,
    },
}
