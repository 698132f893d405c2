// ABOUTME: Wall-clock deadlines for a unit of work, one independent deadline per call.
// ABOUTME: Blocking (worker thread + timed wait) and async (tokio) guards share a cooperative CancelToken.

//! Per-call deadlines.
//!
//! Every call owns its own timer and its own [`CancelToken`]; nothing is
//! process-global, so guards nest and run concurrently without interfering.
//! When a guard returns, for any reason, no timer is left armed: the waiting
//! side simply stops waiting and flips the token so the worker can bail out
//! at its next checkpoint.

use std::panic;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Raised when a unit of work overruns its budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("deadline of {budget:?} elapsed")]
pub struct TimeoutError {
    budget: Duration,
}

impl TimeoutError {
    pub fn new(budget: Duration) -> Self {
        Self { budget }
    }

    /// The budget that was exceeded.
    pub fn budget(&self) -> Duration {
        self.budget
    }
}

/// Cooperative cancellation handle handed to guarded work.
///
/// The token trips either when its own expiry passes or when the guard that
/// issued it gives up waiting. Long-running work should call [`check`](Self::check)
/// between stages.
#[derive(Debug, Clone)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
    expires_at: Option<Instant>,
    budget: Duration,
}

impl CancelToken {
    /// A token that expires `budget` from now.
    pub fn with_budget(budget: Duration) -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
            expires_at: Instant::now().checked_add(budget),
            budget,
        }
    }

    /// A token that only trips when cancelled explicitly.
    pub fn unbounded() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
            expires_at: None,
            budget: Duration::MAX,
        }
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        if self.cancelled.load(Ordering::SeqCst) {
            return true;
        }
        self.expires_at.is_some_and(|at| Instant::now() >= at)
    }

    /// Returns `Err` once the token has tripped.
    pub fn check(&self) -> Result<(), TimeoutError> {
        if self.is_cancelled() {
            Err(TimeoutError::new(self.budget))
        } else {
            Ok(())
        }
    }
}

/// Runs `work` on a worker thread and waits at most `budget` for it.
///
/// Returns the work's result, or [`TimeoutError`] if the budget elapses first.
/// A panic inside `work` is re-raised on the calling thread. A zero budget
/// fails immediately without starting the work.
pub fn run_with_deadline<T, F>(budget: Duration, work: F) -> Result<T, TimeoutError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    run_with_token(budget, move |_| work())
}

/// Like [`run_with_deadline`], but hands the work a [`CancelToken`] it can poll.
pub fn run_with_token<T, F>(budget: Duration, work: F) -> Result<T, TimeoutError>
where
    F: FnOnce(CancelToken) -> T + Send + 'static,
    T: Send + 'static,
{
    if budget.is_zero() {
        return Err(TimeoutError::new(budget));
    }

    let token = CancelToken::with_budget(budget);
    let worker_token = token.clone();
    let (tx, rx) = mpsc::sync_channel(1);

    let handle = thread::spawn(move || {
        // The receiver is gone once the guard has timed out; the result is dropped.
        let _ = tx.send(work(worker_token));
    });

    match rx.recv_timeout(budget) {
        Ok(value) => Ok(value),
        Err(RecvTimeoutError::Timeout) => {
            token.cancel();
            tracing::debug!(?budget, "deadline elapsed");
            Err(TimeoutError::new(budget))
        }
        Err(RecvTimeoutError::Disconnected) => match handle.join() {
            Err(payload) => panic::resume_unwind(payload),
            Ok(()) => Err(TimeoutError::new(budget)),
        },
    }
}

/// Async counterpart of [`run_with_token`] for use inside a tokio runtime.
///
/// The work runs on the blocking pool; the calling task waits with
/// `tokio::time::timeout`.
pub async fn within_deadline<T, F>(budget: Duration, work: F) -> Result<T, TimeoutError>
where
    F: FnOnce(CancelToken) -> T + Send + 'static,
    T: Send + 'static,
{
    if budget.is_zero() {
        return Err(TimeoutError::new(budget));
    }

    let token = CancelToken::with_budget(budget);
    let worker_token = token.clone();
    let handle = tokio::task::spawn_blocking(move || work(worker_token));

    match tokio::time::timeout(budget, handle).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(join_err)) if join_err.is_panic() => panic::resume_unwind(join_err.into_panic()),
        // Runtime shutdown cancelled the task before it produced a value.
        Ok(Err(_)) => Err(TimeoutError::new(budget)),
        Err(_) => {
            token.cancel();
            tracing::debug!(?budget, "deadline elapsed");
            Err(TimeoutError::new(budget))
        }
    }
}
