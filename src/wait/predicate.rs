use serde::{Deserialize, Serialize};

use crate::status::ServiceStatus;

/// Which condition counts as "ready".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Readiness {
    /// State is `running` and the exit code is zero.
    #[default]
    Running,
    /// As `Running`, and a reported health token must be `healthy`.
    /// Units without a healthcheck report no token and pass.
    Healthy,
}

impl Readiness {
    pub fn accepts(self, status: &ServiceStatus) -> bool {
        match self {
            Readiness::Running => is_ready(status),
            Readiness::Healthy => {
                is_ready(status) && (status.health.is_empty() || status.health == "healthy")
            }
        }
    }
}

/// Ready iff the unit is `running` with exit code 0.
///
/// A unit that exited cleanly is not ready, and nothing here tells "still
/// starting" apart from "never going to start"; the retry budget bounds that.
pub fn is_ready(status: &ServiceStatus) -> bool {
    status.is_running() && status.exit_code == 0
}
