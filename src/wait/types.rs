use std::sync::mpsc::{Receiver, RecvTimeoutError, TryRecvError};
use std::time::Duration;

use crate::error::{Result, SetupError};
use crate::status::ServiceStatus;

use super::Readiness;

pub const DEFAULT_RETRIES: u32 = 10;
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Looks up the current status of one service. Single-shot, no retries.
pub trait StatusProbe: Send + Sync {
    /// Returns [`SetupError::ServiceNotFound`] when no unit has that
    /// service key.
    fn find_status(&self, service: &str) -> Result<ServiceStatus>;
}

/// Retry budget and policy for one wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    /// Number of poll attempts. Zero times out without polling.
    pub retries: u32,
    /// Pause between attempts. Not applied after the last one.
    pub interval: Duration,
    pub readiness: Readiness,
}

impl WaitOptions {
    pub fn new(retries: u32, interval: Duration) -> Self {
        Self {
            retries,
            interval,
            readiness: Readiness::Running,
        }
    }

    pub fn with_readiness(mut self, readiness: Readiness) -> Self {
        self.readiness = readiness;
        self
    }
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self::new(DEFAULT_RETRIES, DEFAULT_POLL_INTERVAL)
    }
}

/// Terminal result of a single-service wait.
#[derive(Debug)]
pub enum WaitOutcome {
    Ready(ServiceStatus),
    Failed(SetupError),
}

impl WaitOutcome {
    pub fn into_result(self) -> Result<ServiceStatus> {
        match self {
            WaitOutcome::Ready(status) => Ok(status),
            WaitOutcome::Failed(err) => Err(err),
        }
    }
}

impl From<Result<ServiceStatus>> for WaitOutcome {
    fn from(result: Result<ServiceStatus>) -> Self {
        match result {
            Ok(status) => WaitOutcome::Ready(status),
            Err(err) => WaitOutcome::Failed(err),
        }
    }
}

/// Receiving end of a running single-service wait.
///
/// Exactly one outcome is ever delivered. Once it has been taken the channel
/// is closed, so further receives return [`SetupError::WaiterLost`] at once.
#[derive(Debug)]
pub struct WaitHandle {
    service: String,
    rx: Receiver<WaitOutcome>,
}

impl WaitHandle {
    pub(crate) fn new(service: String, rx: Receiver<WaitOutcome>) -> Self {
        Self { service, rx }
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    /// Block until the wait finishes.
    pub fn recv(&self) -> Result<ServiceStatus> {
        match self.rx.recv() {
            Ok(outcome) => outcome.into_result(),
            Err(_) => Err(self.lost()),
        }
    }

    /// `None` while the wait is still polling.
    pub fn try_recv(&self) -> Option<Result<ServiceStatus>> {
        match self.rx.try_recv() {
            Ok(outcome) => Some(outcome.into_result()),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(self.lost())),
        }
    }

    /// `None` if the wait is still polling after `timeout`.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<Result<ServiceStatus>> {
        match self.rx.recv_timeout(timeout) {
            Ok(outcome) => Some(outcome.into_result()),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => Some(Err(self.lost())),
        }
    }

    fn lost(&self) -> SetupError {
        SetupError::WaiterLost {
            service: self.service.clone(),
        }
    }
}

/// Receiving end of a multi-service wait. Delivers `Ok(())` once every
/// service is ready, or the first failure.
#[derive(Debug)]
pub struct ManyHandle {
    services: Vec<String>,
    rx: Receiver<Result<()>>,
}

impl ManyHandle {
    pub(crate) fn new(services: Vec<String>, rx: Receiver<Result<()>>) -> Self {
        Self { services, rx }
    }

    /// Services being waited on, duplicates removed.
    pub fn services(&self) -> &[String] {
        &self.services
    }

    pub fn recv(&self) -> Result<()> {
        self.rx.recv().unwrap_or_else(|_| Err(self.lost()))
    }

    pub fn try_recv(&self) -> Option<Result<()>> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(self.lost())),
        }
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<Result<()>> {
        match self.rx.recv_timeout(timeout) {
            Ok(result) => Some(result),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => Some(Err(self.lost())),
        }
    }

    fn lost(&self) -> SetupError {
        SetupError::WaiterLost {
            service: self.services.join(", "),
        }
    }
}
