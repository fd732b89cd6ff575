//! loopcheck - loop invariant verification for prefix scans
//!
//! Steps, runs and inspects three textbook prefix-scan loops (running sum,
//! running count above a threshold, running maximum) while re-deriving the
//! loop invariant from scratch at every step and checking that the variant
//! function strictly decreases.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`r#loop`] - Mode registry, verifier, engine state machine and session
//! - [`wp`] - Weakest-precondition annotations for each mode
//! - [`sequence`] - The immutable integer sequence under analysis
//! - [`log`] - Bounded in-memory run log
//! - [`config`] - Configuration loading and validation
//! - [`error`] - Custom error types and handling
//! - [`testing`] - Testing infrastructure (mocks, fixtures, assertions)
//!
//! # Example
//!
//! ```
//! use loopcheck::{LoopEngine, LoopMode, Sequence};
//!
//! let mut engine = LoopEngine::new();
//! engine.initialize(Sequence::new(vec![1, 5, 3, 6, 2]), LoopMode::CountAboveThreshold, 3);
//! while !engine.is_completed() {
//!     engine.step().unwrap();
//! }
//!
//! let snapshot = engine.snapshot().unwrap();
//! assert_eq!(snapshot.accumulator, 2);
//! assert_eq!(snapshot.auxiliary, vec![5, 6]);
//! ```

pub mod config;
pub mod error;
pub mod log;
pub mod r#loop;
pub mod sequence;
pub mod testing;
pub mod wp;

// Re-export commonly used types
pub use error::{Checkpoint, IntoLoopCheckError, LoopCheckError, Result};

pub use config::VerifierConfig;
pub use log::{LogEntry, RunLog};
pub use r#loop::{
    InvariantDescriptor, LoopEngine, LoopMode, LoopPhase, LoopSession, LoopStateSnapshot,
    RunOutcome, RunStatus,
};
pub use sequence::Sequence;
pub use wp::{annotate, calculate_wp, WpAnnotation};
