//! Independent invariant re-derivation.
//!
//! The verifier never looks at the engine's running accumulator except to
//! compare against it. It folds the registry update over the raw prefix
//! `a[0..j)` from scratch on every call, which makes each check O(j). The
//! engine's incremental update is O(1); keeping the two computations apart
//! is what lets one catch a regression in the other.

use super::mode::LoopMode;
use crate::sequence::Sequence;
use serde::{Deserialize, Serialize};

/// Outcome of one invariant check, with the recomputed value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvariantCheck {
    /// Position the invariant was checked at.
    pub position: usize,
    /// Accumulator supplied by the caller.
    pub actual: i64,
    /// Accumulator recomputed from the prefix, `None` when `j > n`.
    pub expected: Option<i64>,
    /// Whether the invariant holds.
    pub held: bool,
}

/// Recompute the accumulator the invariant demands at position `j`.
///
/// Returns `None` when `j` is outside `[0, n]`. For
/// [`LoopMode::PrefixMax`] at `j = 0` this is the sentinel.
///
/// # Example
///
/// ```
/// use loopcheck::r#loop::mode::LoopMode;
/// use loopcheck::r#loop::verifier::expected_accumulator;
/// use loopcheck::sequence::Sequence;
///
/// let seq = Sequence::new(vec![1, 5, 3, 6, 2]);
/// assert_eq!(expected_accumulator(&seq, 3, LoopMode::PrefixSum, 0), Some(9));
/// assert_eq!(expected_accumulator(&seq, 6, LoopMode::PrefixSum, 0), None);
/// ```
#[must_use]
pub fn expected_accumulator(
    sequence: &Sequence,
    j: usize,
    mode: LoopMode,
    threshold: i64,
) -> Option<i64> {
    let prefix = sequence.prefix(j)?;
    Some(
        prefix
            .iter()
            .enumerate()
            .fold(mode.initial_value(), |acc, (i, &element)| {
                mode.update(acc, element, threshold, i)
            }),
    )
}

/// Check the invariant of `mode` at `(j, acc)`, keeping the evidence.
#[must_use]
pub fn verify(
    sequence: &Sequence,
    j: usize,
    acc: i64,
    mode: LoopMode,
    threshold: i64,
) -> InvariantCheck {
    let expected = expected_accumulator(sequence, j, mode, threshold);
    InvariantCheck {
        position: j,
        actual: acc,
        expected,
        held: expected == Some(acc),
    }
}

/// Check the invariant of `mode` at `(j, acc)`.
///
/// Fails closed: a position past the end of the sequence yields `false`
/// rather than an error.
#[must_use]
pub fn check(sequence: &Sequence, j: usize, acc: i64, mode: LoopMode, threshold: i64) -> bool {
    verify(sequence, j, acc, mode, threshold).held
}
