use std::sync::Arc;
use std::sync::mpsc;

use tracing::{debug, info, warn};

use crate::docker::CancelToken;
use crate::error::SetupError;

use super::types::{ManyHandle, StatusProbe, WaitOptions, WaitOutcome};
use super::waiter::spawn_waiter;

/// Wait for every service in `services` concurrently.
///
/// One waiter thread runs per distinct service. The handle yields `Ok(())`
/// only after all of them reported ready; the first failure is reported
/// as soon as it arrives and cancels the waiters still polling. An empty
/// set succeeds immediately.
pub fn wait_many<P, S>(
    probe: Arc<P>,
    services: &[S],
    options: WaitOptions,
    cancel: CancelToken,
) -> ManyHandle
where
    P: StatusProbe + ?Sized + 'static,
    S: AsRef<str>,
{
    let mut names: Vec<String> = Vec::with_capacity(services.len());
    for service in services {
        let service = service.as_ref();
        if !names.iter().any(|n| n == service) {
            names.push(service.to_string());
        }
    }

    let (done_tx, done_rx) = mpsc::channel();
    let handle = ManyHandle::new(names.clone(), done_rx);

    if names.is_empty() {
        let _ = done_tx.send(Ok(()));
        return handle;
    }

    // Cancelling the group stops our own waiters without touching the
    // caller's token.
    let group = cancel.child();
    let (outcome_tx, outcome_rx) = mpsc::channel::<(String, WaitOutcome)>();

    for name in &names {
        let tx = outcome_tx.clone();
        let service = name.clone();
        spawn_waiter(probe.clone(), name.clone(), options, group.child(), move |outcome| {
            let _ = tx.send((service, outcome));
        });
    }
    drop(outcome_tx);

    let total = names.len();
    std::thread::spawn(move || {
        let mut pending = total;
        // Detach before reporting so a long-lived caller token does not
        // accumulate finished groups.
        let finish = |result| {
            cancel.release(&group);
            let _ = done_tx.send(result);
        };

        for (service, outcome) in outcome_rx {
            match outcome {
                WaitOutcome::Ready(_) => {
                    pending -= 1;
                    debug!(service, pending, "waiter reported ready");
                    if pending == 0 {
                        info!(services = total, "all services ready");
                        finish(Ok(()));
                        return;
                    }
                }
                WaitOutcome::Failed(err) => {
                    warn!(service, error = %err, "wait failed, cancelling remaining waiters");
                    group.cancel();
                    finish(Err(err));
                    return;
                }
            }
        }

        // Every sender is gone but not every waiter reported.
        finish(Err(SetupError::WaiterLost {
            service: names.join(", "),
        }));
    });

    handle
}
