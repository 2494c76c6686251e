//! Fixed-cadence refresh loop. The first round runs immediately, then every
//! interval until cancelled. Rounds receive a guard they must check before
//! every state commit, so a cancelled or superseded round can never clobber
//! newer state.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::debug;

/// Staleness guard handed to each poll round.
#[derive(Debug, Clone)]
pub struct RoundGuard {
    cancelled: Arc<AtomicBool>,
}

impl RoundGuard {
    pub fn new(cancelled: Arc<AtomicBool>) -> Self {
        Self { cancelled }
    }

    /// Fresh guard that is always current, for one-shot rounds.
    pub fn standalone() -> Self {
        Self::new(Arc::new(AtomicBool::new(false)))
    }

    /// Check immediately before committing results to shared state.
    pub fn is_current(&self) -> bool {
        !self.cancelled.load(Ordering::SeqCst)
    }
}

pub struct PollHandle {
    cancelled: Arc<AtomicBool>,
    task: JoinHandle<()>,
}

impl PollHandle {
    /// Stop the timer and poison the guard. In-flight requests are not
    /// aborted at the transport level; their commits are refused instead.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        self.task.abort();
        debug!("polling cancelled");
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

pub struct PollingController;

impl PollingController {
    pub fn start<F, Fut>(interval: Duration, round: F) -> PollHandle
    where
        F: Fn(RoundGuard) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = cancelled.clone();
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                // First tick completes immediately.
                ticker.tick().await;
                if flag.load(Ordering::SeqCst) {
                    break;
                }
                round(RoundGuard::new(flag.clone())).await;
            }
        });
        PollHandle { cancelled, task }
    }
}
