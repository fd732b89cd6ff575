//! Loop verification module.
//!
//! This module contains the verification core:
//!
//! - [`mode`] - Mode registry: initial values, update rules, invariant text
//! - [`verifier`] - Independent from-scratch invariant re-derivation
//! - [`rule`] - Update rule seam used by the engine
//! - [`state`] - Loop state and read-only snapshots
//! - [`engine`] - The state machine that steps a loop
//! - [`session`] - Cloneable handle with the cooperative `run`/`stop` driver
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐     ┌─────────────┐
//! │ LoopSession │────>│ LoopEngine   │────>│ UpdateRule  │
//! │ run / stop  │     │ LoopState    │     │ (registry)  │
//! └─────────────┘     └──────────────┘     └─────────────┘
//!                            │
//!                            v
//!                     ┌──────────────┐
//!                     │ Verifier     │  folds the registry over a[0..j)
//!                     └──────────────┘
//! ```

pub mod engine;
pub mod mode;
pub mod rule;
pub mod session;
pub mod state;
pub mod verifier;

// Re-exports for convenience
pub use engine::LoopEngine;
pub use mode::{InvariantDescriptor, LoopMode};
pub use session::{LoopSession, RunOutcome, RunStatus};
pub use state::{LoopPhase, LoopState, LoopStateSnapshot};
