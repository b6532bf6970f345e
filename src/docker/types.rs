use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

/// Cooperative cancellation token shared between a caller and its waiters.
///
/// Cancelling wakes any thread parked in [`CancelToken::sleep`] and cascades
/// to every token created through [`CancelToken::child`]. Cancelling a child
/// leaves its parent untouched. A parent only holds weak references to its
/// children, so dropped children are pruned rather than kept alive.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<Inner>);

#[derive(Debug, Default)]
struct Inner {
    cancelled: Mutex<bool>,
    wake: Condvar,
    children: Mutex<Vec<Weak<Inner>>>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal cancellation. Idempotent.
    pub fn cancel(&self) {
        {
            let mut cancelled = lock(&self.0.cancelled);
            if *cancelled {
                return;
            }
            *cancelled = true;
        }
        self.0.wake.notify_all();

        let children = std::mem::take(&mut *lock(&self.0.children));
        for child in children.iter().filter_map(Weak::upgrade) {
            CancelToken(child).cancel();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        *lock(&self.0.cancelled)
    }

    /// A token that is cancelled together with `self`, but can also be
    /// cancelled on its own.
    pub fn child(&self) -> CancelToken {
        let child = CancelToken::new();
        let mut children = lock(&self.0.children);
        children.retain(|weak| weak.strong_count() > 0);
        if self.is_cancelled() {
            child.cancel();
        } else {
            children.push(Arc::downgrade(&child.0));
        }
        child
    }

    /// Stop cascading cancellation from `self` to `child`.
    pub fn release(&self, child: &CancelToken) {
        let target = Arc::as_ptr(&child.0);
        lock(&self.0.children).retain(|weak| weak.strong_count() > 0 && weak.as_ptr() != target);
    }

    #[cfg(test)]
    pub(crate) fn child_count(&self) -> usize {
        lock(&self.0.children).len()
    }

    /// Sleep for `duration` or until cancelled, whichever comes first.
    ///
    /// Returns `true` if the token was cancelled.
    pub fn sleep(&self, duration: Duration) -> bool {
        let guard = lock(&self.0.cancelled);
        let (guard, _) = self
            .0
            .wake
            .wait_timeout_while(guard, duration, |cancelled| !*cancelled)
            .unwrap_or_else(PoisonError::into_inner);
        *guard
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
