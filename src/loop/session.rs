//! Cooperative run driver and the in-process session contract.
//!
//! A [`LoopSession`] is a cloneable handle over one [`LoopEngine`]. Manual
//! commands lock the engine for the length of one synchronous step. `run`
//! alternates a step with an async pause, so the only suspension point is
//! between steps; `stop` raises a flag that the run loop reads before each
//! step.
//!
//! # Example
//!
//! ```rust,ignore
//! let session = LoopSession::new(&VerifierConfig::default());
//! session.initialize(Sequence::new(vec![1, 2, 3]), LoopMode::PrefixSum, 0).await;
//!
//! let stopper = session.clone();
//! let outcome = session
//!     .run(move |snapshot| {
//!         if snapshot.position == 2 {
//!             stopper.stop();
//!         }
//!     })
//!     .await?;
//! assert_eq!(outcome.status, RunStatus::Cancelled);
//! ```

use super::engine::LoopEngine;
use super::mode::{InvariantDescriptor, LoopMode};
use super::state::{LoopPhase, LoopStateSnapshot};
use crate::config::VerifierConfig;
use crate::error::{LoopCheckError, Result};
use crate::log::LogEntry;
use crate::sequence::Sequence;
use crate::wp::{self, WpAnnotation};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{info, warn};

/// How a call to [`LoopSession::run`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    /// The loop reached `j = n`.
    Completed,
    /// `stop` was observed before the next step.
    Cancelled,
    /// Another run already drives this session; nothing was done.
    AlreadyRunning,
}

/// Result of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunOutcome {
    pub status: RunStatus,
    /// Steps executed by this run.
    pub steps: usize,
    /// Snapshot after the last executed step, if any state is bound.
    pub last: Option<LoopStateSnapshot>,
}

/// Run flags shared by every clone of a session.
#[derive(Debug, Default)]
struct RunControl {
    running: AtomicBool,
    cancel_requested: AtomicBool,
    /// Bumped under the engine lock by every re-initialization.
    generation: AtomicU64,
}

/// Clears the run flags when a run ends, however it ends.
///
/// A pending stop is dropped here rather than when the next run starts, so
/// a stop raised while a run is claiming the flag cannot be lost.
struct RunningGuard<'a>(&'a RunControl);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.cancel_requested.store(false, Ordering::SeqCst);
        self.0.running.store(false, Ordering::SeqCst);
    }
}

/// Cloneable handle to one loop engine.
#[derive(Debug, Clone)]
pub struct LoopSession {
    engine: Arc<Mutex<LoopEngine>>,
    control: Arc<RunControl>,
    step_delay: Duration,
}

impl LoopSession {
    /// Create a session with an uninitialized engine.
    #[must_use]
    pub fn new(config: &VerifierConfig) -> Self {
        Self::with_engine(
            LoopEngine::new().with_log_capacity(config.log_capacity),
            config.step_delay(),
        )
    }

    /// Wrap an existing engine.
    #[must_use]
    pub fn with_engine(engine: LoopEngine, step_delay: Duration) -> Self {
        Self {
            engine: Arc::new(Mutex::new(engine)),
            control: Arc::new(RunControl::default()),
            step_delay,
        }
    }

    // =========================================================================
    // Commands
    // =========================================================================

    /// Bind a sequence, mode and threshold.
    ///
    /// An in-flight run is asked to stop first; it will find the flag before
    /// touching the new state.
    pub async fn initialize(
        &self,
        sequence: Sequence,
        mode: LoopMode,
        threshold: i64,
    ) -> LoopStateSnapshot {
        self.stop_if_running();
        let mut engine = self.engine.lock().await;
        self.control.generation.fetch_add(1, Ordering::SeqCst);
        engine.initialize(sequence, mode, threshold)
    }

    /// Return to `Ready` with the current binding.
    ///
    /// # Errors
    ///
    /// Returns [`LoopCheckError::NotInitialized`] if nothing is bound.
    pub async fn reset(&self) -> Result<LoopStateSnapshot> {
        self.stop_if_running();
        let mut engine = self.engine.lock().await;
        self.control.generation.fetch_add(1, Ordering::SeqCst);
        engine.reset()
    }

    /// Execute one step.
    ///
    /// # Errors
    ///
    /// - [`LoopCheckError::RunInProgress`] while `run` drives the engine.
    /// - Any error of [`LoopEngine::step`].
    pub async fn step(&self) -> Result<LoopStateSnapshot> {
        if self.is_running() {
            return Err(LoopCheckError::RunInProgress);
        }
        let mut engine = self.engine.lock().await;
        engine.step()
    }

    /// Step until completion or until [`stop`](Self::stop) is observed.
    ///
    /// `observer` sees the snapshot after every step. Between steps the
    /// task sleeps for the configured delay. Calling `run` while another
    /// run is active returns [`RunStatus::AlreadyRunning`] immediately.
    ///
    /// # Errors
    ///
    /// Propagates the first engine error; the run stops there.
    pub async fn run<F>(&self, mut observer: F) -> Result<RunOutcome>
    where
        F: FnMut(&LoopStateSnapshot),
    {
        if self
            .control
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            warn!("Run requested while another run is active; ignoring");
            return Ok(RunOutcome {
                status: RunStatus::AlreadyRunning,
                steps: 0,
                last: self.snapshot().await,
            });
        }
        let _guard = RunningGuard(&self.control);
        let generation = {
            let _engine = self.engine.lock().await;
            self.control.generation.load(Ordering::SeqCst)
        };

        let mut steps = 0;
        let mut last = None;

        loop {
            let snapshot = {
                let mut engine = self.engine.lock().await;
                // Checked under the lock: a re-initialization that raced
                // past the stop request must still end this run.
                if self.control.cancel_requested.load(Ordering::SeqCst)
                    || self.control.generation.load(Ordering::SeqCst) != generation
                {
                    info!("Run cancelled after {} steps", steps);
                    engine.note("Run stopped");
                    return Ok(RunOutcome {
                        status: RunStatus::Cancelled,
                        steps,
                        last,
                    });
                }
                if engine.phase() == LoopPhase::Uninitialized {
                    return Err(LoopCheckError::NotInitialized);
                }
                if engine.is_completed() {
                    let last = last.or_else(|| engine.snapshot());
                    return Ok(RunOutcome {
                        status: RunStatus::Completed,
                        steps,
                        last,
                    });
                }
                engine.step()?
            };
            steps += 1;
            observer(&snapshot);

            let completed = snapshot.completed;
            last = Some(snapshot);
            if completed {
                return Ok(RunOutcome {
                    status: RunStatus::Completed,
                    steps,
                    last,
                });
            }

            tokio::time::sleep(self.step_delay).await;
        }
    }

    /// Ask an in-flight run to stop before its next step.
    ///
    /// Has no effect when no run is active.
    pub fn stop(&self) {
        if self.is_running() {
            self.control.cancel_requested.store(true, Ordering::SeqCst);
        }
    }

    fn stop_if_running(&self) {
        if self.is_running() {
            info!("Stopping active run before re-initialization");
            self.stop();
        }
    }

    // =========================================================================
    // Observation
    // =========================================================================

    /// Whether a run is currently driving the engine.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.control.running.load(Ordering::SeqCst)
    }

    /// Current snapshot, `None` before `initialize`.
    pub async fn snapshot(&self) -> Option<LoopStateSnapshot> {
        self.engine.lock().await.snapshot()
    }

    /// Run log entries, newest first.
    pub async fn log(&self) -> Vec<LogEntry> {
        self.engine.lock().await.log().entries()
    }

    /// Invariant descriptor for `mode`.
    #[must_use]
    pub fn describe(mode: LoopMode) -> InvariantDescriptor {
        mode.describe()
    }

    /// Weakest-precondition annotation for `mode`.
    #[must_use]
    pub fn annotate(mode: LoopMode) -> WpAnnotation {
        wp::annotate(mode)
    }
}
