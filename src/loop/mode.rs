//! Loop mode registry.
//!
//! Each [`LoopMode`] is one textbook prefix-scan loop. The registry is the
//! single source of the per-mode initial accumulator, the per-element
//! update rule and the descriptive text shown next to a run.

use crate::error::LoopCheckError;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Accumulator value meaning "no maximum computed yet".
pub const SENTINEL: i64 = i64::MIN;

/// Variant function shared by every mode.
pub const VARIANT_FORMULA: &str = "t = n − j";

/// Loop guard shared by every mode.
pub const LOOP_GUARD: &str = "j < n";

/// Prefix-scan loop being verified.
///
/// # Example
///
/// ```
/// use loopcheck::r#loop::mode::LoopMode;
///
/// let mode: LoopMode = "Count > T".parse().unwrap();
/// assert_eq!(mode, LoopMode::CountAboveThreshold);
/// assert_eq!(mode.to_string(), "count-above-threshold");
/// ```
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LoopMode {
    /// `res` is the sum of `a[0..j)`
    #[value(alias = "sum")]
    PrefixSum,
    /// `res` counts the elements of `a[0..j)` greater than `T`
    #[value(alias = "count")]
    CountAboveThreshold,
    /// `res` is the maximum of `a[0..j)`
    #[value(alias = "max")]
    PrefixMax,
}

impl std::fmt::Display for LoopMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoopMode::PrefixSum => write!(f, "prefix-sum"),
            LoopMode::CountAboveThreshold => write!(f, "count-above-threshold"),
            LoopMode::PrefixMax => write!(f, "prefix-max"),
        }
    }
}

impl FromStr for LoopMode {
    type Err = LoopCheckError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        match normalized.as_str() {
            "prefix-sum" | "prefix sum" | "prefixsum" | "sum" => Ok(LoopMode::PrefixSum),
            "count-above-threshold" | "count > t" | "countgreaterthant" | "count" => {
                Ok(LoopMode::CountAboveThreshold)
            }
            "prefix-max" | "prefix max" | "prefixmax" | "max" => Ok(LoopMode::PrefixMax),
            _ => Err(LoopCheckError::invalid_mode(s)),
        }
    }
}

/// Human-readable description of a mode's proof obligations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvariantDescriptor {
    pub mode: LoopMode,
    /// The invariant in words.
    pub invariant_words: String,
    /// The invariant as a formula over `res`, `a`, `j` and `n`.
    pub invariant_formula: String,
    /// The variant function proving termination.
    pub variant_formula: String,
    /// The loop guard `B`.
    pub loop_guard: String,
    /// The loop body `S`.
    pub loop_body: String,
}

impl LoopMode {
    /// All supported modes, in menu order.
    pub const ALL: [LoopMode; 3] = [
        LoopMode::PrefixSum,
        LoopMode::CountAboveThreshold,
        LoopMode::PrefixMax,
    ];

    /// Accumulator value before the first iteration.
    #[must_use]
    pub fn initial_value(self) -> i64 {
        match self {
            LoopMode::PrefixSum | LoopMode::CountAboveThreshold => 0,
            LoopMode::PrefixMax => SENTINEL,
        }
    }

    /// Fold element `a[j]` into the accumulator.
    ///
    /// `threshold` is ignored outside [`LoopMode::CountAboveThreshold`].
    /// Sums wrap on overflow so the fold is total.
    #[must_use]
    pub fn update(self, acc: i64, element: i64, threshold: i64, j: usize) -> i64 {
        match self {
            LoopMode::PrefixSum => acc.wrapping_add(element),
            LoopMode::CountAboveThreshold => {
                if element > threshold {
                    acc + 1
                } else {
                    acc
                }
            }
            LoopMode::PrefixMax => {
                if j == 0 {
                    element
                } else {
                    acc.max(element)
                }
            }
        }
    }

    /// Whether the element at `j` is recorded in the auxiliary list.
    #[must_use]
    pub fn records(self, element: i64, threshold: i64) -> bool {
        self == LoopMode::CountAboveThreshold && element > threshold
    }

    /// Loop body executed by one step, in the notation used by [`crate::wp`].
    #[must_use]
    pub fn loop_body(self) -> &'static str {
        match self {
            LoopMode::PrefixSum => "res := res + a[j]; j := j + 1",
            LoopMode::CountAboveThreshold => "if a[j] > T then res := res + 1; j := j + 1",
            LoopMode::PrefixMax => {
                "if j = 0 then res := a[0] else res := max(res, a[j]); j := j + 1"
            }
        }
    }

    /// Invariant as a formula.
    #[must_use]
    pub fn invariant_formula(self) -> &'static str {
        match self {
            LoopMode::PrefixSum => "res = Σ_{i=0}^{j-1} a[i] ∧ 0 ≤ j ≤ n",
            LoopMode::CountAboveThreshold => "res = |{i < j : a[i] > T}| ∧ 0 ≤ j ≤ n",
            LoopMode::PrefixMax => "res = max(a[0..j)) ∧ 0 ≤ j ≤ n",
        }
    }

    /// Invariant in words.
    #[must_use]
    pub fn invariant_words(self) -> &'static str {
        match self {
            LoopMode::PrefixSum => "res holds the sum of the elements a[0] through a[j-1]",
            LoopMode::CountAboveThreshold => {
                "res holds the number of elements greater than T among a[0] through a[j-1]"
            }
            LoopMode::PrefixMax => {
                "res holds the largest element among a[0] through a[j-1] (no value while j = 0)"
            }
        }
    }

    /// Full descriptor for display.
    #[must_use]
    pub fn describe(self) -> InvariantDescriptor {
        InvariantDescriptor {
            mode: self,
            invariant_words: self.invariant_words().to_string(),
            invariant_formula: self.invariant_formula().to_string(),
            variant_formula: VARIANT_FORMULA.to_string(),
            loop_guard: LOOP_GUARD.to_string(),
            loop_body: self.loop_body().to_string(),
        }
    }

    /// Render an accumulator for display, showing the sentinel as `-∞`.
    #[must_use]
    pub fn format_accumulator(self, acc: i64) -> String {
        if self == LoopMode::PrefixMax && acc == SENTINEL {
            "-∞".to_string()
        } else {
            acc.to_string()
        }
    }
}
