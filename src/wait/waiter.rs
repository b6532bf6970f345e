use std::sync::Arc;
use std::sync::mpsc;

use tracing::{debug, info, warn};

use crate::docker::CancelToken;
use crate::error::{LastObservation, Result, SetupError};
use crate::status::ServiceStatus;

use super::types::{StatusProbe, WaitHandle, WaitOptions, WaitOutcome};

/// Poll `service` on a background thread until it is ready, the retry
/// budget runs out, or `cancel` fires.
pub fn wait<P>(probe: Arc<P>, service: &str, options: WaitOptions, cancel: CancelToken) -> WaitHandle
where
    P: StatusProbe + ?Sized + 'static,
{
    let (tx, rx) = mpsc::channel();
    spawn_waiter(probe, service.to_string(), options, cancel, move |outcome| {
        // Receiver may be dropped; ignore send errors.
        let _ = tx.send(outcome);
    });
    WaitHandle::new(service.to_string(), rx)
}

/// Run one wait loop on its own thread and hand its outcome to `report`.
pub(crate) fn spawn_waiter<P, F>(
    probe: Arc<P>,
    service: String,
    options: WaitOptions,
    cancel: CancelToken,
    report: F,
) where
    P: StatusProbe + ?Sized + 'static,
    F: FnOnce(WaitOutcome) + Send + 'static,
{
    std::thread::spawn(move || {
        let outcome = poll_until_ready(&*probe, &service, &options, &cancel);
        report(outcome.into());
    });
}

/// The wait loop itself, run on the calling thread.
///
/// Makes at most `options.retries` polls, sleeping `options.interval`
/// between them. Not-found, discovery failures and not-ready results all
/// consume one attempt; only the last one is kept for the timeout error.
pub fn poll_until_ready<P>(
    probe: &P,
    service: &str,
    options: &WaitOptions,
    cancel: &CancelToken,
) -> Result<ServiceStatus>
where
    P: StatusProbe + ?Sized,
{
    let mut last = LastObservation::NeverPolled;

    for attempt in 1..=options.retries {
        if cancel.is_cancelled() {
            return Err(cancelled(service));
        }

        match probe.find_status(service) {
            Ok(status) if options.readiness.accepts(&status) => {
                info!(service, attempt, "service ready");
                return Ok(status);
            }
            Ok(status) => {
                debug!(service, attempt, state = %status.state, exit_code = status.exit_code, "service not ready");
                last = LastObservation::NotReady {
                    state: status.state,
                    exit_code: status.exit_code,
                    health: status.health,
                };
            }
            Err(SetupError::ServiceNotFound { .. }) => {
                debug!(service, attempt, "service not listed yet");
                last = LastObservation::NotFound;
            }
            Err(err) => {
                debug!(service, attempt, error = %err, "status discovery failed");
                last = LastObservation::DiscoveryFailed(err.to_string());
            }
        }

        if attempt < options.retries && cancel.sleep(options.interval) {
            return Err(cancelled(service));
        }
    }

    warn!(service, attempts = options.retries, last = %last, "timed out waiting for service");
    Err(SetupError::Timeout {
        service: service.to_string(),
        attempts: options.retries,
        last,
    })
}

fn cancelled(service: &str) -> SetupError {
    debug!(service, "wait cancelled");
    SetupError::Cancelled {
        service: service.to_string(),
    }
}
