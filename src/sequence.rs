//! The integer sequence a loop scans.
//!
//! A [`Sequence`] is immutable once built and cheap to clone: every clone
//! shares the same backing slice, so a run and its snapshots can hold it
//! without copying and nothing can mutate it underneath the verifier.

use crate::error::{LoopCheckError, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;

/// Fixed-length, read-only sequence of signed integers.
///
/// # Example
///
/// ```
/// use loopcheck::sequence::Sequence;
///
/// let seq: Sequence = "1, 5, -3".parse().unwrap();
/// assert_eq!(seq.len(), 3);
/// assert_eq!(seq.get(2), Some(-3));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sequence {
    values: Arc<[i64]>,
}

impl Sequence {
    /// Create a sequence from owned values.
    #[must_use]
    pub fn new(values: Vec<i64>) -> Self {
        Self {
            values: Arc::from(values),
        }
    }

    /// Create the empty sequence.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of elements (`n`).
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the sequence has no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Element at `index`, if in range.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<i64> {
        self.values.get(index).copied()
    }

    /// Borrow the elements.
    #[must_use]
    pub fn as_slice(&self) -> &[i64] {
        &self.values
    }

    /// The prefix `a[0..j)`, or `None` when `j > n`.
    #[must_use]
    pub fn prefix(&self, j: usize) -> Option<&[i64]> {
        self.values.get(..j)
    }

}

impl From<Vec<i64>> for Sequence {
    fn from(values: Vec<i64>) -> Self {
        Self::new(values)
    }
}

impl From<&[i64]> for Sequence {
    fn from(values: &[i64]) -> Self {
        Self::new(values.to_vec())
    }
}

impl std::fmt::Display for Sequence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[")?;
        for (i, v) in self.values.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", v)?;
        }
        write!(f, "]")
    }
}

impl FromStr for Sequence {
    type Err = LoopCheckError;

    /// Parse integers separated by commas and/or whitespace.
    ///
    /// Surrounding brackets are tolerated so that the output of
    /// [`Display`](std::fmt::Display) parses back.
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let inner = trimmed
            .strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'))
            .unwrap_or(trimmed);

        let values = inner
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|token| !token.is_empty())
            .map(|token| {
                token
                    .parse::<i64>()
                    .map_err(|e| LoopCheckError::invalid_sequence(token, e.to_string()))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self::new(values))
    }
}
