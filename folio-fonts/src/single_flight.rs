//! Single-flight guard for one-time asynchronous setup.
//!
//! At most one operation runs at a time. Callers arriving while it runs wait
//! for the same outcome instead of starting another. After a success every
//! call returns immediately; after a failure the guard falls back to idle so
//! the next call starts a fresh attempt.
//!
//! A generation counter lets [`SingleFlight::reset`] invalidate an in-flight
//! run: the stale run still reports to the callers already waiting on it, but
//! it can no longer settle the guard or commit its results.

use std::future::Future;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;

use crate::error::{FontError, Result};

/// Shared outcome of one run. `None` while the run is still going.
type Outcome = Option<std::result::Result<(), Arc<FontError>>>;

enum State {
    Idle,
    Pending(watch::Receiver<Outcome>),
    Done,
}

struct Inner {
    state: State,
    generation: u64,
}

pub struct SingleFlight {
    inner: Mutex<Inner>,
}

impl Default for SingleFlight {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SingleFlight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        let state = match inner.state {
            State::Idle => "idle",
            State::Pending(_) => "pending",
            State::Done => "done",
        };
        f.debug_struct("SingleFlight")
            .field("state", &state)
            .field("generation", &inner.generation)
            .finish()
    }
}

impl SingleFlight {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                state: State::Idle,
                generation: 0,
            }),
        }
    }

    /// Whether the last run of the current generation succeeded.
    pub fn is_done(&self) -> bool {
        matches!(self.inner.lock().state, State::Done)
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.inner.lock().state, State::Pending(_))
    }

    pub fn generation(&self) -> u64 {
        self.inner.lock().generation
    }

    /// Run `op` unless it already succeeded, joining a run in progress.
    ///
    /// `op` receives the generation it runs under and is spawned onto the
    /// tokio runtime, so it completes even if every caller stops waiting.
    pub async fn run<F, Fut>(self: &Arc<Self>, op: F) -> std::result::Result<(), Arc<FontError>>
    where
        F: FnOnce(u64) -> Fut,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        let (mut rx, generation) = {
            let mut inner = self.inner.lock();
            let generation = inner.generation;
            let joined = match &inner.state {
                State::Done => return Ok(()),
                State::Pending(rx) => Some(rx.clone()),
                State::Idle => None,
            };
            match joined {
                Some(rx) => (rx, generation),
                None => {
                    let (tx, rx) = watch::channel(None);
                    inner.state = State::Pending(rx.clone());
                    let fut = op(generation);
                    let guard = Arc::clone(self);
                    tokio::spawn(async move {
                        let outcome = fut.await.map_err(Arc::new);
                        guard.settle(generation, outcome.is_ok());
                        // Nobody waiting is fine
                        let _ = tx.send(Some(outcome));
                    });
                    (rx, generation)
                }
            }
        };

        let outcome = match rx.wait_for(Option::is_some).await {
            Ok(outcome) => outcome.clone(),
            Err(_) => None,
        };
        outcome.unwrap_or_else(|| {
            log::error!("Single-flight operation ended without reporting an outcome");
            self.settle(generation, false);
            Err(Arc::new(FontError::InitAborted))
        })
    }

    /// Forget any previous outcome and start a new generation.
    ///
    /// `on_reset` runs while the guard is locked, so no run of the new
    /// generation can commit before it finishes.
    pub fn reset(&self, on_reset: impl FnOnce()) {
        let mut inner = self.inner.lock();
        inner.generation = inner.generation.wrapping_add(1);
        inner.state = State::Idle;
        on_reset();
    }

    /// Run `commit` only if `generation` is still current.
    ///
    /// Returns `false` when the run was invalidated by a reset.
    pub fn commit_if_current(&self, generation: u64, commit: impl FnOnce()) -> bool {
        let inner = self.inner.lock();
        if inner.generation != generation {
            return false;
        }
        commit();
        true
    }

    fn settle(&self, generation: u64, success: bool) {
        let mut inner = self.inner.lock();
        if inner.generation != generation || !matches!(inner.state, State::Pending(_)) {
            return;
        }
        inner.state = if success { State::Done } else { State::Idle };
    }
}
