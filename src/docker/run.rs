use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::debug;

use crate::error::{Result, SetupError};

/// Runs one `docker compose` command against a compose file and returns
/// its captured standard output.
///
/// `command` is everything after `compose -f <file>`, e.g. `"ps --format=json"`.
pub trait ComposeRunner: Send + Sync {
    fn run(&self, compose_file: &Path, command: &str) -> Result<Vec<u8>>;
}

/// [`ComposeRunner`] backed by the real `docker` binary.
#[derive(Debug, Clone)]
pub struct DockerCompose {
    binary: PathBuf,
}

impl DockerCompose {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl Default for DockerCompose {
    fn default() -> Self {
        Self::new("docker")
    }
}

impl ComposeRunner for DockerCompose {
    fn run(&self, compose_file: &Path, command: &str) -> Result<Vec<u8>> {
        let args = shell_words::split(command).map_err(|e| SetupError::Execution {
            command: command.to_string(),
            reason: format!("malformed command line: {e}"),
        })?;

        debug!(binary = %self.binary.display(), file = %compose_file.display(), command, "running docker compose");

        let output = Command::new(&self.binary)
            .arg("compose")
            .arg("-f")
            .arg(compose_file)
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| SetupError::Execution {
                command: command.to_string(),
                reason: format!("failed to invoke `{}`: {e}", self.binary.display()),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stderr = stderr.trim();
            let reason = if stderr.is_empty() {
                output.status.to_string()
            } else {
                format!("{}: {stderr}", output.status)
            };
            return Err(SetupError::Execution {
                command: command.to_string(),
                reason,
            });
        }

        Ok(output.stdout)
    }
}

/// Verify that `<binary> compose` is installed and usable.
pub fn ensure_available(binary: &Path) -> Result<()> {
    let status = Command::new(binary)
        .args(["compose", "version"])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map_err(|e| SetupError::Execution {
            command: "compose version".into(),
            reason: format!("failed to invoke `{}`: {e}", binary.display()),
        })?;

    if !status.success() {
        return Err(SetupError::Execution {
            command: "compose version".into(),
            reason: format!("docker compose is not available ({status})"),
        });
    }
    Ok(())
}
