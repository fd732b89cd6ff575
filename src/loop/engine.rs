//! Loop engine state machine.
//!
//! The engine owns the live [`LoopState`] and moves it through
//! `Uninitialized → Ready → Running → Completed`. Every step samples the
//! invariant on both sides of the transition through the independent
//! [`verifier`](super::verifier) and checks that the variant function
//! dropped by exactly one.
//!
//! # Example
//!
//! ```
//! use loopcheck::r#loop::engine::LoopEngine;
//! use loopcheck::r#loop::mode::LoopMode;
//! use loopcheck::sequence::Sequence;
//!
//! let mut engine = LoopEngine::new();
//! engine.initialize(Sequence::new(vec![1, 2, 3]), LoopMode::PrefixSum, 0);
//! while !engine.is_completed() {
//!     engine.step().unwrap();
//! }
//! assert_eq!(engine.snapshot().unwrap().accumulator, 6);
//! ```

use super::mode::LoopMode;
use super::rule::{RegistryRule, UpdateRule};
use super::state::{LoopPhase, LoopState, LoopStateSnapshot};
use super::verifier::{self, InvariantCheck};
use crate::error::{Checkpoint, LoopCheckError, Result};
use crate::log::{LogEntry, RunLog, DEFAULT_LOG_CAPACITY};
use crate::sequence::Sequence;
use tracing::{debug, error, info};

/// Sequence, mode and threshold a run is bound to.
#[derive(Debug, Clone)]
struct Binding {
    sequence: Sequence,
    mode: LoopMode,
    threshold: i64,
}

/// Single owner of one loop run's state.
#[derive(Debug)]
pub struct LoopEngine {
    binding: Option<Binding>,
    state: LoopState,
    rule: Box<dyn UpdateRule>,
    contaminated: bool,
    log: RunLog,
}

impl Default for LoopEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl LoopEngine {
    /// Create an uninitialized engine using the registry update rule.
    #[must_use]
    pub fn new() -> Self {
        Self {
            binding: None,
            state: LoopState::new(LoopMode::PrefixSum, 0),
            rule: Box::new(RegistryRule),
            contaminated: false,
            log: RunLog::with_capacity(DEFAULT_LOG_CAPACITY),
        }
    }

    /// Replace the incremental update rule.
    #[must_use]
    pub fn with_rule(mut self, rule: impl UpdateRule + 'static) -> Self {
        self.rule = Box::new(rule);
        self
    }

    /// Bound the run log to `capacity` entries.
    #[must_use]
    pub fn with_log_capacity(mut self, capacity: usize) -> Self {
        self.log = RunLog::with_capacity(capacity);
        self
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    /// Bind a sequence, mode and threshold and return to `Ready`.
    ///
    /// Discards any previous state, including a recorded fault. An empty
    /// sequence lands directly in `Completed`.
    pub fn initialize(
        &mut self,
        sequence: Sequence,
        mode: LoopMode,
        threshold: i64,
    ) -> LoopStateSnapshot {
        let length = sequence.len();
        let mut state = LoopState::new(mode, length);
        state.accumulator = self.rule.initial_value(mode);

        let check = verifier::verify(&sequence, 0, state.accumulator, mode, threshold);
        state.record_checks(check.held, check.held);

        self.binding = Some(Binding {
            sequence,
            mode,
            threshold,
        });
        self.state = state;
        self.contaminated = false;

        info!(
            "Loop initialized: mode={}, n={}, threshold={}",
            mode, length, threshold
        );
        self.log.push(format!(
            "Loop initialized ({}, n={}, res={})",
            mode,
            length,
            mode.format_accumulator(self.state.accumulator)
        ));

        if !check.held {
            self.record_fault(mode, Checkpoint::BeforeStep, check);
        } else if self.state.completed {
            self.log.push("Loop completed");
        }

        self.current_snapshot(mode, threshold, length)
    }

    /// Re-initialize with the current sequence, mode and threshold.
    ///
    /// # Errors
    ///
    /// Returns [`LoopCheckError::NotInitialized`] if nothing is bound.
    pub fn reset(&mut self) -> Result<LoopStateSnapshot> {
        let binding = self.binding.clone().ok_or(LoopCheckError::NotInitialized)?;
        Ok(self.initialize(binding.sequence, binding.mode, binding.threshold))
    }

    /// Re-initialize the current sequence under a different mode.
    ///
    /// # Errors
    ///
    /// Returns [`LoopCheckError::NotInitialized`] if nothing is bound.
    pub fn switch_mode(&mut self, mode: LoopMode) -> Result<LoopStateSnapshot> {
        let binding = self.binding.clone().ok_or(LoopCheckError::NotInitialized)?;
        Ok(self.initialize(binding.sequence, mode, binding.threshold))
    }

    /// Execute one loop iteration.
    ///
    /// A completed engine is left untouched and its snapshot returned.
    ///
    /// # Errors
    ///
    /// - [`LoopCheckError::NotInitialized`] before the first `initialize`.
    /// - [`LoopCheckError::InvariantViolation`] when the invariant fails
    ///   before the step (state untouched) or after it (state advanced and
    ///   marked contaminated).
    /// - [`LoopCheckError::VariantViolation`] when `n − j` did not drop by
    ///   exactly one.
    pub fn step(&mut self) -> Result<LoopStateSnapshot> {
        let Binding {
            sequence,
            mode,
            threshold,
        } = self.binding.clone().ok_or(LoopCheckError::NotInitialized)?;
        let length = sequence.len();

        if self.state.completed {
            return Ok(self.current_snapshot(mode, threshold, length));
        }

        let j = self.state.position;
        let before = verifier::verify(&sequence, j, self.state.accumulator, mode, threshold);
        if !before.held {
            self.state.record_checks(false, false);
            return Err(self.record_fault(mode, Checkpoint::BeforeStep, before));
        }

        let Some(element) = sequence.get(j) else {
            // Position past the end with the flag unset; settle the flag.
            self.state.completed = true;
            return Ok(self.current_snapshot(mode, threshold, length));
        };

        let accumulator = self
            .rule
            .update(mode, self.state.accumulator, element, threshold, j);
        let next = j + 1;

        let after = verifier::verify(&sequence, next, accumulator, mode, threshold);

        let variant_before = self.state.variant;
        let variant_after = length - next;
        if variant_before.checked_sub(1) != Some(variant_after) {
            self.contaminated = true;
            let fault = LoopCheckError::VariantViolation {
                before: variant_before,
                after: variant_after,
            };
            error!("{}", fault);
            self.log.push(fault.to_string());
            return Err(fault);
        }

        if mode.records(element, threshold) {
            self.state.auxiliary.push(element);
        }
        self.state.accumulator = accumulator;
        self.state.position = next;
        self.state.step_count += 1;
        self.state.variant = variant_after;
        self.state.completed = next == length;
        self.state.record_checks(true, after.held);

        debug!(
            "Step {}: j={}, res={}, t={} -> {}",
            self.state.step_count,
            next,
            accumulator,
            variant_before,
            variant_after
        );
        self.log.push(format!(
            "Step executed: j={}, res={}",
            next,
            mode.format_accumulator(accumulator)
        ));
        self.log.push(format!(
            "Variant function: {} -> {}",
            variant_before, variant_after
        ));

        if !after.held {
            return Err(self.record_fault(mode, Checkpoint::AfterStep, after));
        }

        if self.state.completed {
            info!(
                "Loop completed after {} steps: res={}",
                self.state.step_count,
                mode.format_accumulator(accumulator)
            );
            self.log.push("Loop completed");
        }

        Ok(self.current_snapshot(mode, threshold, length))
    }

    /// Mark the run contaminated and build the matching fault.
    fn record_fault(
        &mut self,
        mode: LoopMode,
        checkpoint: Checkpoint,
        check: InvariantCheck,
    ) -> LoopCheckError {
        self.contaminated = true;
        let fault = LoopCheckError::InvariantViolation {
            mode,
            checkpoint,
            position: check.position,
            accumulator: check.actual,
            expected: check.expected,
        };
        error!("{}", fault);
        self.log.push(fault.to_string());
        fault
    }

    // =========================================================================
    // Observation
    // =========================================================================

    /// Snapshot of the current state, `None` before `initialize`.
    #[must_use]
    pub fn snapshot(&self) -> Option<LoopStateSnapshot> {
        self.binding
            .as_ref()
            .map(|b| self.current_snapshot(b.mode, b.threshold, b.sequence.len()))
    }

    fn current_snapshot(&self, mode: LoopMode, threshold: i64, length: usize) -> LoopStateSnapshot {
        LoopStateSnapshot {
            mode,
            threshold,
            length,
            phase: self.state.phase(length),
            position: self.state.position,
            accumulator: self.state.accumulator,
            step_count: self.state.step_count,
            variant: self.state.variant,
            completed: self.state.completed,
            invariant_held_before: self.state.invariant_held_before,
            invariant_held_after: self.state.invariant_held_after,
            auxiliary: self.state.auxiliary.clone(),
            contaminated: self.contaminated,
        }
    }

    /// Current state-machine phase.
    #[must_use]
    pub fn phase(&self) -> LoopPhase {
        match &self.binding {
            None => LoopPhase::Uninitialized,
            Some(b) => self.state.phase(b.sequence.len()),
        }
    }

    /// Whether the bound loop has reached `j = n`.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.binding.is_some() && self.state.completed
    }

    /// Whether an engine fault was detected since the last `initialize`.
    #[must_use]
    pub fn is_contaminated(&self) -> bool {
        self.contaminated
    }

    /// Re-run the independent check against the current state.
    #[must_use]
    pub fn invariant_holds(&self) -> bool {
        self.binding.as_ref().is_some_and(|b| {
            verifier::check(
                &b.sequence,
                self.state.position,
                self.state.accumulator,
                b.mode,
                b.threshold,
            )
        })
    }

    /// The in-memory run log.
    #[must_use]
    pub fn log(&self) -> &RunLog {
        &self.log
    }

    /// Append a note from a driver (for example a cancelled run).
    pub fn note(&mut self, message: impl Into<String>) {
        self.log.push_entry(LogEntry::now(message));
    }
}
