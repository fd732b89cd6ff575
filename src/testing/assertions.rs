//! Custom assertions for domain-specific testing.
//!
//! Provides expressive assertions over snapshot traces.

use crate::r#loop::state::LoopStateSnapshot;

/// Assert that the invariant held on both sides of every recorded step.
///
/// # Panics
///
/// Panics naming the first snapshot whose invariant failed.
///
/// # Example
///
/// ```rust,ignore
/// let trace = run_collecting(&mut engine);
/// assert_invariant_preserved(&trace);
/// ```
pub fn assert_invariant_preserved(trace: &[LoopStateSnapshot]) {
    for (i, snapshot) in trace.iter().enumerate() {
        assert!(
            snapshot.invariant_held_before && snapshot.invariant_held_after,
            "Invariant failed at trace index {} ({}): before={}, after={}",
            i,
            snapshot.summary(),
            snapshot.invariant_held_before,
            snapshot.invariant_held_after
        );
        assert!(
            !snapshot.contaminated,
            "Run contaminated at trace index {} ({})",
            i,
            snapshot.summary()
        );
    }
}

/// Assert that the variant dropped by exactly one per step down to zero.
///
/// The trace must start with the snapshot taken at initialization.
///
/// # Panics
///
/// Panics if any step failed to decrease the variant by one, or if the
/// final variant is not zero exactly when the run completed.
pub fn assert_variant_decreasing(trace: &[LoopStateSnapshot]) {
    for pair in trace.windows(2) {
        assert_eq!(
            pair[1].variant + 1,
            pair[0].variant,
            "Variant must drop by one per step: {} -> {}",
            pair[0].variant,
            pair[1].variant
        );
    }
    for snapshot in trace {
        assert_eq!(
            snapshot.variant == 0,
            snapshot.completed,
            "Variant is zero iff completed ({})",
            snapshot.summary()
        );
        assert_eq!(snapshot.variant, snapshot.length - snapshot.position);
    }
}

/// Assert the final accumulator of a trace.
///
/// # Panics
///
/// Panics if the trace is empty or the last accumulator differs.
pub fn assert_final_accumulator(trace: &[LoopStateSnapshot], expected: i64) {
    let last = trace.last().expect("trace must not be empty");
    assert_eq!(
        last.accumulator, expected,
        "Expected final res={}, got {}",
        expected, last.accumulator
    );
}
