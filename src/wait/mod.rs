// Readiness polling: one waiter per service, fanned in by the coordinator.

mod coordinator;
mod predicate;
mod types;
mod waiter;

pub use coordinator::wait_many;
pub use predicate::{Readiness, is_ready};
pub use types::{
    DEFAULT_POLL_INTERVAL, DEFAULT_RETRIES, ManyHandle, StatusProbe, WaitHandle, WaitOptions,
    WaitOutcome,
};
pub use waiter::{poll_until_ready, wait};
