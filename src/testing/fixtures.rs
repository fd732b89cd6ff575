//! Reproducible test data.
//!
//! Provides the canonical worked scenarios and a deterministic sequence
//! generator for exhaustive-style checks without pulling in a random
//! number crate.

use crate::r#loop::mode::LoopMode;
use crate::sequence::Sequence;

/// A worked example with its known final result.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub name: &'static str,
    pub mode: LoopMode,
    pub threshold: i64,
    pub sequence: Sequence,
    pub final_accumulator: i64,
    pub auxiliary: Vec<i64>,
}

impl Scenario {
    fn new(
        name: &'static str,
        mode: LoopMode,
        threshold: i64,
        values: &[i64],
        final_accumulator: i64,
    ) -> Self {
        Self {
            name,
            mode,
            threshold,
            sequence: Sequence::from(values),
            final_accumulator,
            auxiliary: Vec::new(),
        }
    }

    fn with_auxiliary(mut self, auxiliary: &[i64]) -> Self {
        self.auxiliary = auxiliary.to_vec();
        self
    }

    /// The canonical scenarios, including empty and single-element runs.
    #[must_use]
    pub fn all() -> Vec<Scenario> {
        vec![
            Scenario::new("sum of 1..3", LoopMode::PrefixSum, 0, &[1, 2, 3], 6),
            Scenario::new("sum of zeros", LoopMode::PrefixSum, 0, &[0, 0, 0], 0),
            Scenario::new("alternating sum", LoopMode::PrefixSum, 0, &[-1, 1, -1], -1),
            Scenario::new("single sum", LoopMode::PrefixSum, 0, &[10], 10),
            Scenario::new("empty sum", LoopMode::PrefixSum, 0, &[], 0),
            Scenario::new(
                "count above 3",
                LoopMode::CountAboveThreshold,
                3,
                &[1, 5, 3, 6, 2],
                2,
            )
            .with_auxiliary(&[5, 6]),
            Scenario::new("max of five", LoopMode::PrefixMax, 0, &[1, 5, 3, 6, 2], 6),
            Scenario::new("single max", LoopMode::PrefixMax, 0, &[42], 42),
        ]
    }
}

/// Deterministic pseudo-random sequences.
///
/// A linear congruential generator; the same seed always yields the same
/// sequences. Values fall in `[-10, 10]`, lengths in `[0, max_len]`.
#[derive(Debug, Clone)]
pub struct SequenceGenerator {
    state: u64,
    max_len: usize,
}

impl SequenceGenerator {
    #[must_use]
    pub fn new(seed: u64, max_len: usize) -> Self {
        Self {
            state: seed ^ 0x9E37_79B9_7F4A_7C15,
            max_len,
        }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        self.state >> 33
    }

    /// Next integer in `[low, high]`.
    pub fn next_in(&mut self, low: i64, high: i64) -> i64 {
        let span = (high - low + 1) as u64;
        low + (self.next_u64() % span) as i64
    }

    /// Next sequence.
    pub fn next_sequence(&mut self) -> Sequence {
        let len = (self.next_u64() % (self.max_len as u64 + 1)) as usize;
        let values: Vec<i64> = (0..len).map(|_| self.next_in(-10, 10)).collect();
        Sequence::new(values)
    }
}

impl Iterator for SequenceGenerator {
    type Item = Sequence;

    fn next(&mut self) -> Option<Sequence> {
        Some(self.next_sequence())
    }
}
