//! Loop state types and transitions.
//!
//! [`LoopState`] is the engine-owned mutable state; [`LoopStateSnapshot`]
//! is the owned, read-only copy handed to callers after every transition.

use super::mode::LoopMode;
use serde::{Deserialize, Serialize};

/// Coarse state-machine phase, derived from the position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoopPhase {
    /// No sequence bound yet.
    Uninitialized,
    /// `j = 0` with elements left to scan.
    Ready,
    /// `0 < j < n`.
    Running,
    /// `j = n`; terminal.
    Completed,
}

impl std::fmt::Display for LoopPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoopPhase::Uninitialized => write!(f, "uninitialized"),
            LoopPhase::Ready => write!(f, "ready"),
            LoopPhase::Running => write!(f, "running"),
            LoopPhase::Completed => write!(f, "completed"),
        }
    }
}

/// Live state of one loop run.
///
/// # Example
///
/// ```
/// use loopcheck::r#loop::mode::LoopMode;
/// use loopcheck::r#loop::state::{LoopPhase, LoopState};
///
/// let state = LoopState::new(LoopMode::PrefixSum, 3);
/// assert_eq!(state.position, 0);
/// assert_eq!(state.variant, 3);
/// assert_eq!(state.phase(3), LoopPhase::Ready);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoopState {
    /// Index of the next element to scan (`j`).
    pub position: usize,
    /// Running result (`res`).
    pub accumulator: i64,
    /// Steps executed since initialization.
    pub step_count: usize,
    /// Variant function value `n − j`.
    pub variant: usize,
    /// Set exactly when `j = n`.
    pub completed: bool,
    /// Elements recorded by the mode, in discovery order.
    pub auxiliary: Vec<i64>,
    /// Invariant result sampled before the most recent step.
    pub invariant_held_before: bool,
    /// Invariant result sampled after the most recent step.
    pub invariant_held_after: bool,
}

impl LoopState {
    /// Fresh state for a sequence of `length` elements.
    #[must_use]
    pub fn new(mode: LoopMode, length: usize) -> Self {
        Self {
            position: 0,
            accumulator: mode.initial_value(),
            step_count: 0,
            variant: length,
            completed: length == 0,
            auxiliary: Vec::new(),
            invariant_held_before: false,
            invariant_held_after: false,
        }
    }

    /// Phase of the state machine for a sequence of `length` elements.
    #[must_use]
    pub fn phase(&self, length: usize) -> LoopPhase {
        if self.completed || self.position >= length {
            LoopPhase::Completed
        } else if self.position == 0 {
            LoopPhase::Ready
        } else {
            LoopPhase::Running
        }
    }

    /// Record the invariant samples of the latest transition.
    pub fn record_checks(&mut self, before: bool, after: bool) {
        self.invariant_held_before = before;
        self.invariant_held_after = after;
    }
}

/// Read-only view of the engine after a transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoopStateSnapshot {
    pub mode: LoopMode,
    pub threshold: i64,
    /// Sequence length `n`.
    pub length: usize,
    pub phase: LoopPhase,
    /// `j`
    pub position: usize,
    /// `res`
    pub accumulator: i64,
    pub step_count: usize,
    /// `n − j`
    pub variant: usize,
    pub completed: bool,
    pub invariant_held_before: bool,
    pub invariant_held_after: bool,
    pub auxiliary: Vec<i64>,
    /// Set once an engine fault was detected; later snapshots are untrusted.
    pub contaminated: bool,
}

impl LoopStateSnapshot {
    /// Accumulator rendered for display (`-∞` for the max sentinel).
    #[must_use]
    pub fn accumulator_display(&self) -> String {
        self.mode.format_accumulator(self.accumulator)
    }

    /// One-line summary such as `j=2, res=3, t=1`.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "j={}, res={}, t={}",
            self.position,
            self.accumulator_display(),
            self.variant
        )
    }
}
