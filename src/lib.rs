//! Bring up a docker compose stack and block until its services are ready.
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use stackwait::{CancelToken, ComposeClient, WaitOptions, config};
//!
//! # fn main() -> Result<(), stackwait::SetupError> {
//! let client = ComposeClient::new(config::root_config_path("docker-compose.yml")?);
//! client.up()?;
//!
//! let options = WaitOptions::new(60, Duration::from_secs(1));
//! client
//!     .wait_many(&["db", "cache"], options, CancelToken::new())
//!     .recv()?;
//!
//! // ... run tests against the stack ...
//!
//! client.down()?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod docker;
pub mod error;
pub mod status;
pub mod wait;

pub use client::{ComposeClient, DownOptions};
pub use docker::CancelToken;
pub use error::{LastObservation, Result, SetupError};
pub use status::{Publisher, ServiceStatus};
pub use wait::{Readiness, WaitOptions};
