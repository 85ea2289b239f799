//! A debouncer for pacing rapid-fire input, such as search-as-you-type.
//!
//! Each `submit` restarts the delay; the action only runs for the last value once the input
//! has been quiet for the full delay. The timer is a real, cancellable task handle rather
//! than a closure over ambient timer state, so `dispose` (or dropping the debouncer) reliably
//! stops anything pending.

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Debounces calls to an action. Owns at most one pending timer at a time.
pub struct Debouncer<T: Send + 'static> {
    delay: Duration,
    action: Arc<dyn Fn(T) + Send + Sync>,
    pending: Option<JoinHandle<()>>,
}

impl<T: Send + 'static> Debouncer<T> {
    /// Creates a debouncer that invokes `action` with the most recent submitted value after
    /// `delay` of quiet.
    pub fn new(delay: Duration, action: impl Fn(T) + Send + Sync + 'static) -> Self {
        Self {
            delay,
            action: Arc::new(action),
            pending: None,
        }
    }

    /// Submits a new value, cancelling any pending one.
    pub fn submit(&mut self, value: T) {
        self.cancel_pending();
        let delay = self.delay;
        let action = Arc::clone(&self.action);
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            action(value);
        }));
    }

    /// Cancels any pending submission. Safe to call repeatedly.
    pub fn dispose(&mut self) {
        self.cancel_pending();
    }

    fn cancel_pending(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

impl<T: Send + 'static> Drop for Debouncer<T> {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}
