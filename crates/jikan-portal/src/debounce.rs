//! Settling-delay debouncer.
//!
//! Each [`Debouncer`] owns the handle of its one pending timer. Scheduling
//! cancels that timer and starts a new one; when a timer fires, the work it
//! guards runs in its own task, so later cancellations never abort a request
//! that has already started.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::trace;

/// One scheduled invocation: the timer task and whether it has fired
#[derive(Debug)]
struct Scheduled {
    timer: JoinHandle<()>,
    fired: Arc<AtomicBool>,
}

/// Cancel-then-reschedule timer for one input
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    pending: Option<Scheduled>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Run `work` after the settling delay unless rescheduled first
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule<F>(&mut self, work: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.cancel();

        let delay = self.delay;
        let fired = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&fired);
        let timer = tokio::spawn(async move {
            sleep(delay).await;
            flag.store(true, Ordering::SeqCst);
            // Detached from the timer: aborting the timer from here on
            // leaves the work running.
            let _ = tokio::spawn(work).await;
        });

        self.pending = Some(Scheduled { timer, fired });
    }

    /// Cancel the pending timer, if it has not fired yet
    pub fn cancel(&mut self) {
        if let Some(scheduled) = self.pending.take() {
            if scheduled.fired.load(Ordering::SeqCst) {
                trace!("Timer already fired, leaving started work running");
            } else {
                trace!("Cancelling pending invocation");
            }
            scheduled.timer.abort();
        }
    }

    /// True while the settling delay of a scheduled invocation is running
    pub fn is_pending(&self) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|s| !s.fired.load(Ordering::SeqCst) && !s.timer.is_finished())
    }

    /// Wait for the pending invocation, including the work it started
    pub async fn flush(&mut self) {
        if let Some(scheduled) = self.pending.take() {
            let _ = scheduled.timer.await;
        }
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
