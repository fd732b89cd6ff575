//! Test doubles for the engine's seams.
//!
//! These mocks let tests break the engine on purpose and observe what a
//! run reported, without touching the production update rule.

use crate::r#loop::mode::LoopMode;
use crate::r#loop::rule::UpdateRule;
use crate::r#loop::state::LoopStateSnapshot;
use std::sync::{Arc, Mutex};

/// Update rule that adds `skew` to the registry result at one index.
///
/// # Example
///
/// ```
/// use loopcheck::r#loop::mode::LoopMode;
/// use loopcheck::r#loop::rule::UpdateRule;
/// use loopcheck::testing::FaultyRule;
///
/// let rule = FaultyRule::at_index(2).with_skew(10);
/// assert_eq!(rule.update(LoopMode::PrefixSum, 0, 1, 0, 1), 1);
/// assert_eq!(rule.update(LoopMode::PrefixSum, 0, 1, 0, 2), 11);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct FaultyRule {
    index: usize,
    skew: i64,
}

impl FaultyRule {
    /// Corrupt the update at position `index` by one.
    #[must_use]
    pub fn at_index(index: usize) -> Self {
        Self { index, skew: 1 }
    }

    /// Set the amount added to the corrupted update.
    #[must_use]
    pub fn with_skew(mut self, skew: i64) -> Self {
        self.skew = skew;
        self
    }
}

impl UpdateRule for FaultyRule {
    fn initial_value(&self, mode: LoopMode) -> i64 {
        mode.initial_value()
    }

    fn update(&self, mode: LoopMode, acc: i64, element: i64, threshold: i64, j: usize) -> i64 {
        let correct = mode.update(acc, element, threshold, j);
        if j == self.index {
            correct.wrapping_add(self.skew)
        } else {
            correct
        }
    }
}

/// Update rule whose initial accumulator is off by `skew`.
#[derive(Debug, Clone, Copy)]
pub struct SkewedInitialRule {
    skew: i64,
}

impl SkewedInitialRule {
    #[must_use]
    pub fn new(skew: i64) -> Self {
        Self { skew }
    }
}

impl UpdateRule for SkewedInitialRule {
    fn initial_value(&self, mode: LoopMode) -> i64 {
        mode.initial_value().wrapping_add(self.skew)
    }

    fn update(&self, mode: LoopMode, acc: i64, element: i64, threshold: i64, j: usize) -> i64 {
        mode.update(acc, element, threshold, j)
    }
}

/// Update rule that forgets the `j = 0` special case of the max scan.
///
/// Starting from the sentinel this still yields the right answer, which is
/// exactly why the verifier folds the registry instead of trusting it.
#[derive(Debug, Clone, Copy, Default)]
pub struct NaiveMaxRule;

impl UpdateRule for NaiveMaxRule {
    fn initial_value(&self, mode: LoopMode) -> i64 {
        mode.initial_value()
    }

    fn update(&self, mode: LoopMode, acc: i64, element: i64, threshold: i64, j: usize) -> i64 {
        match mode {
            LoopMode::PrefixMax => acc.max(element),
            _ => mode.update(acc, element, threshold, j),
        }
    }
}

/// Observer that records every snapshot a run reports.
///
/// Clones share the same buffer, so one clone can be moved into
/// [`LoopSession::run`](crate::r#loop::session::LoopSession::run) while
/// the test keeps another.
#[derive(Debug, Clone, Default)]
pub struct RecordingObserver {
    seen: Arc<Mutex<Vec<LoopStateSnapshot>>>,
}

impl RecordingObserver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one snapshot.
    pub fn observe(&self, snapshot: &LoopStateSnapshot) {
        if let Ok(mut seen) = self.seen.lock() {
            seen.push(snapshot.clone());
        }
    }

    /// Everything recorded so far.
    #[must_use]
    pub fn snapshots(&self) -> Vec<LoopStateSnapshot> {
        self.seen.lock().map(|s| s.clone()).unwrap_or_default()
    }

    /// Number of snapshots recorded.
    #[must_use]
    pub fn count(&self) -> usize {
        self.seen.lock().map(|s| s.len()).unwrap_or(0)
    }
}
