use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SetupError>;

/// Errors surfaced by lifecycle commands, status discovery and waits.
#[derive(Error, Debug)]
pub enum SetupError {
    /// The orchestration tool could not be launched or exited abnormally.
    #[error("failed to run `{command}`: {reason}")]
    Execution { command: String, reason: String },

    /// The status listing could not be decoded.
    #[error("failed to parse status listing: {reason}")]
    Parse { reason: String },

    #[error("no container found for service `{service}`")]
    ServiceNotFound { service: String },

    #[error("config file `{name}` not found under {root:?}")]
    ConfigNotFound { name: String, root: PathBuf },

    #[error("timed out waiting for service `{service}` after {attempts} attempts ({last})")]
    Timeout {
        service: String,
        attempts: u32,
        last: LastObservation,
    },

    #[error("wait for service `{service}` was cancelled")]
    Cancelled { service: String },

    /// The outcome was already taken, or the waiting thread died without
    /// reporting one.
    #[error("no outcome available for `{service}`")]
    WaiterLost { service: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SetupError {
    /// Name of the service a wait failed on, if this is a wait failure.
    pub fn service(&self) -> Option<&str> {
        match self {
            Self::Timeout { service, .. }
            | Self::Cancelled { service }
            | Self::WaiterLost { service }
            | Self::ServiceNotFound { service } => Some(service),
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// What the last poll of a timed-out wait saw.
///
/// Not-found and not-ready polls consume the retry budget alike; this only
/// records which one the budget ran out on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LastObservation {
    NeverPolled,
    NotFound,
    DiscoveryFailed(String),
    NotReady {
        state: String,
        exit_code: i64,
        health: String,
    },
}

impl fmt::Display for LastObservation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NeverPolled => f.write_str("never polled"),
            Self::NotFound => f.write_str("service not listed"),
            Self::DiscoveryFailed(reason) => write!(f, "discovery failed: {reason}"),
            Self::NotReady {
                state,
                exit_code,
                health,
            } => {
                write!(f, "state `{state}`, exit code {exit_code}")?;
                if !health.is_empty() {
                    write!(f, ", health `{health}`")?;
                }
                Ok(())
            }
        }
    }
}
