//! `odactk` errors and their process exit codes

use odactk_cluster::DiscoveryError;
use odactk_core::error::CtkError;
use odactk_scenario::RunnerError;

/// Error returned by every subcommand.
///
/// `main` turns it into an exit status with [`CliError::exit_code`].
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Invalid or missing settings (including an unmapped component).
    #[error("configuration error: {0}")]
    Config(String),

    /// The subcommand ran but could not produce its result.
    #[error("{0}")]
    Command(String),

    /// The run finished but some scenarios failed.
    #[error("{failed} scenario(s) failed")]
    ScenarioFailures { failed: usize },

    /// `--output json` serialization failed.
    #[error("json output error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    /// Report or stdout write failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapped domain error from odactk-core.
    #[error("{0}")]
    Core(#[from] CtkError),
}

impl CliError {
    /// Process exit status for this error.
    ///
    /// | Code | Meaning                              |
    /// |------|--------------------------------------|
    /// | 0    | Success                              |
    /// | 1    | General / command error              |
    /// | 2    | Configuration error                  |
    /// | 5    | One or more scenarios failed         |
    /// | 10   | IO error                             |
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Core(CtkError::Config(_)) => 2,
            Self::ScenarioFailures { .. } => 5,
            Self::Io(_) | Self::Core(CtkError::Io(_)) => 10,
            Self::JsonSerialize(_) | Self::Command(_) | Self::Core(_) => 1,
        }
    }
}

impl From<RunnerError> for CliError {
    fn from(e: RunnerError) -> Self {
        Self::Core(e.into())
    }
}

impl From<DiscoveryError> for CliError {
    fn from(e: DiscoveryError) -> Self {
        Self::Core(e.into())
    }
}
