//! Process exit statuses.

use std::process::ExitCode;

use crate::config::ConfigError;
use crate::lifecycle::startup::BootstrapError;

/// Exit status of a bootstrap run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitStatus {
    /// Listening run ended cleanly, or there was nothing to serve.
    Success = 0,
    /// Any other fatal startup failure.
    Failure = 1,
    /// TLS credentials missing or unusable.
    InvalidCredentials = 2,
}

impl ExitStatus {
    pub fn code(self) -> u8 {
        self as u8
    }
}

impl From<ExitStatus> for ExitCode {
    fn from(status: ExitStatus) -> Self {
        ExitCode::from(status.code())
    }
}

impl From<&BootstrapError> for ExitStatus {
    fn from(err: &BootstrapError) -> Self {
        match err {
            BootstrapError::Credentials(_) | BootstrapError::Transport(_) => {
                ExitStatus::InvalidCredentials
            }
            BootstrapError::PluginResolution(_)
            | BootstrapError::PluginSync { .. }
            | BootstrapError::Bind { .. } => ExitStatus::Failure,
        }
    }
}

impl From<&ConfigError> for ExitStatus {
    fn from(_: &ConfigError) -> Self {
        ExitStatus::Failure
    }
}
