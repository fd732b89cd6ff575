//! Testing infrastructure for loopcheck.
//!
//! This module provides mocks, fixtures, and assertions for exercising the
//! engine and the session driver.
//!
//! # Architecture
//!
//! - **Mocks**: broken update rules and a recording observer
//! - **Fixtures**: the worked scenarios and a deterministic sequence generator
//! - **Assertions**: trace-level checks of the invariant and variant obligations
//!
//! # Example
//!
//! ```rust,ignore
//! use loopcheck::testing::{FaultyRule, Scenario};
//!
//! let engine = LoopEngine::new().with_rule(FaultyRule::at_index(2));
//! for scenario in Scenario::all() { /* ... */ }
//! ```

pub mod assertions;
pub mod fixtures;
pub mod mocks;

pub use assertions::*;
pub use fixtures::*;
pub use mocks::*;
