//! Update rule abstraction used by the engine.
//!
//! The engine advances its accumulator through an [`UpdateRule`] while the
//! verifier always folds the registry directly. Production code uses
//! [`RegistryRule`]; tests substitute deliberately broken rules to prove the
//! verifier notices.

use super::mode::LoopMode;

/// Incremental accumulator update performed by one loop step.
pub trait UpdateRule: Send + Sync + std::fmt::Debug {
    /// Accumulator before the first step.
    fn initial_value(&self, mode: LoopMode) -> i64;

    /// Fold `element = a[j]` into `acc`.
    fn update(&self, mode: LoopMode, acc: i64, element: i64, threshold: i64, j: usize) -> i64;
}

/// The mode registry's own update rule.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegistryRule;

impl UpdateRule for RegistryRule {
    fn initial_value(&self, mode: LoopMode) -> i64 {
        mode.initial_value()
    }

    fn update(&self, mode: LoopMode, acc: i64, element: i64, threshold: i64, j: usize) -> i64 {
        mode.update(acc, element, threshold, j)
    }
}
