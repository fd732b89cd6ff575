//! Custom error types for loopcheck.
//!
//! Errors fall into two families that callers must treat differently:
//! input problems (bad mode names, unparseable sequences, broken
//! configuration) are rejected before any state changes, while engine
//! faults (invariant or variant violations) mean the engine's own update
//! logic disagreed with the independent re-derivation.

use crate::r#loop::mode::LoopMode;
use std::path::PathBuf;
use thiserror::Error;

/// Point in a step at which the invariant was sampled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Checkpoint {
    /// Before the loop body executed.
    BeforeStep,
    /// After the loop body and the index increment executed.
    AfterStep,
}

impl std::fmt::Display for Checkpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Checkpoint::BeforeStep => write!(f, "before step"),
            Checkpoint::AfterStep => write!(f, "after step"),
        }
    }
}

/// Main error type for loopcheck operations
#[derive(Error, Debug)]
pub enum LoopCheckError {
    // =========================================================================
    // Input Errors
    // =========================================================================
    /// Mode name outside the supported variants
    #[error("Invalid mode '{name}': expected prefix-sum, count-above-threshold or prefix-max")]
    InvalidMode { name: String },

    /// Sequence text could not be parsed
    #[error("Invalid sequence element '{token}': {reason}")]
    InvalidSequence { token: String, reason: String },

    // =========================================================================
    // Engine Faults
    // =========================================================================
    /// The independent re-derivation disagreed with the engine's accumulator
    #[error(
        "Invariant violated {checkpoint} in {mode} mode at j={position}: acc={accumulator}, expected {}",
        expected.map_or_else(|| "<out of range>".to_string(), |v| v.to_string())
    )]
    InvariantViolation {
        mode: LoopMode,
        checkpoint: Checkpoint,
        position: usize,
        accumulator: i64,
        expected: Option<i64>,
    },

    /// The variant function did not decrease by exactly one
    #[error("Variant function did not decrease by one: {before} -> {after}")]
    VariantViolation { before: usize, after: usize },

    // =========================================================================
    // Session Errors
    // =========================================================================
    /// Step requested before any sequence was bound
    #[error("Loop has not been initialized")]
    NotInitialized,

    /// Manual step requested while `run` drives the engine
    #[error("A run is already in progress")]
    RunInProgress,

    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Failed to load configuration
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        path: Option<PathBuf>,
    },

    /// Invalid configuration value
    #[error("Invalid configuration: {field} - {reason}")]
    InvalidConfig { field: String, reason: String },

    // =========================================================================
    // Wrapped Errors
    // =========================================================================
    /// IO error wrapper
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON error wrapper
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Generic error wrapper
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl LoopCheckError {
    // =========================================================================
    // Constructor helpers
    // =========================================================================

    /// Create an invalid mode error
    pub fn invalid_mode(name: impl Into<String>) -> Self {
        Self::InvalidMode { name: name.into() }
    }

    /// Create an invalid sequence error
    pub fn invalid_sequence(token: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidSequence {
            token: token.into(),
            reason: reason.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            path: None,
        }
    }

    /// Create a configuration error with path
    pub fn config_with_path(message: impl Into<String>, path: PathBuf) -> Self {
        Self::Config {
            message: message.into(),
            path: Some(path),
        }
    }

    /// Create an invalid configuration value error
    pub fn invalid_config(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field: field.into(),
            reason: reason.into(),
        }
    }

    // =========================================================================
    // Classification helpers
    // =========================================================================

    /// Check if this error is a defect in the engine's own update logic
    pub fn is_engine_fault(&self) -> bool {
        matches!(
            self,
            Self::InvariantViolation { .. } | Self::VariantViolation { .. }
        )
    }

    /// Check if this error was caused by caller-supplied input
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidMode { .. }
                | Self::InvalidSequence { .. }
                | Self::Config { .. }
                | Self::InvalidConfig { .. }
        )
    }

    /// Get error code for exit status
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidMode { .. } | Self::InvalidSequence { .. } => 2,
            Self::InvariantViolation { .. } | Self::VariantViolation { .. } => 3,
            Self::NotInitialized | Self::RunInProgress => 4,
            Self::Config { .. } | Self::InvalidConfig { .. } => 7,
            _ => 1,
        }
    }
}

/// Type alias for loopcheck results
pub type Result<T> = std::result::Result<T, LoopCheckError>;

/// Extension trait for converting foreign errors to `LoopCheckError`
pub trait IntoLoopCheckError<T> {
    fn into_config_error(self) -> Result<T>;
    fn into_config_error_at(self, path: &std::path::Path) -> Result<T>;
}

impl<T, E: Into<anyhow::Error>> IntoLoopCheckError<T> for std::result::Result<T, E> {
    fn into_config_error(self) -> Result<T> {
        self.map_err(|e| LoopCheckError::config(e.into().to_string()))
    }

    fn into_config_error_at(self, path: &std::path::Path) -> Result<T> {
        self.map_err(|e| LoopCheckError::config_with_path(e.into().to_string(), path.to_path_buf()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn violation() -> LoopCheckError {
        LoopCheckError::InvariantViolation {
            mode: LoopMode::PrefixSum,
            checkpoint: Checkpoint::AfterStep,
            position: 2,
            accumulator: 7,
            expected: Some(3),
        }
    }

    #[test]
    fn test_violation_display_is_reproducible() {
        let msg = violation().to_string();
        assert!(msg.contains("after step"));
        assert!(msg.contains("j=2"));
        assert!(msg.contains("acc=7"));
        assert!(msg.contains("expected 3"));
        assert!(msg.contains("prefix-sum"));
    }

    #[test]
    fn test_violation_display_out_of_range() {
        let err = LoopCheckError::InvariantViolation {
            mode: LoopMode::PrefixMax,
            checkpoint: Checkpoint::BeforeStep,
            position: 9,
            accumulator: 1,
            expected: None,
        };
        assert!(err.to_string().contains("<out of range>"));
    }

    #[test]
    fn test_is_engine_fault() {
        assert!(violation().is_engine_fault());
        assert!(LoopCheckError::VariantViolation {
            before: 3,
            after: 3
        }
        .is_engine_fault());
        assert!(!LoopCheckError::invalid_mode("bogus").is_engine_fault());
    }

    #[test]
    fn test_is_input_error() {
        assert!(LoopCheckError::invalid_mode("bogus").is_input_error());
        assert!(LoopCheckError::invalid_sequence("x", "not a number").is_input_error());
        assert!(LoopCheckError::config("broken").is_input_error());
        assert!(!violation().is_input_error());
        assert!(!LoopCheckError::NotInitialized.is_input_error());
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(LoopCheckError::invalid_mode("x").exit_code(), 2);
        assert_eq!(violation().exit_code(), 3);
        assert_eq!(LoopCheckError::RunInProgress.exit_code(), 4);
        assert_eq!(LoopCheckError::config("x").exit_code(), 7);
        assert_eq!(
            LoopCheckError::Io(std::io::Error::other("boom")).exit_code(),
            1
        );
    }

    #[test]
    fn test_config_with_path() {
        let path = PathBuf::from("/tmp/settings.json");
        let err = LoopCheckError::config_with_path("failed to parse", path.clone());
        if let LoopCheckError::Config {
            message,
            path: opt_path,
        } = err
        {
            assert_eq!(message, "failed to parse");
            assert_eq!(opt_path, Some(path));
        } else {
            panic!("Wrong error variant");
        }
    }

    #[test]
    fn test_into_config_error_trait() {
        let result: std::result::Result<(), std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "file not found",
        ));

        match result.into_config_error() {
            Err(LoopCheckError::Config { message, path }) => {
                assert!(message.contains("file not found"));
                assert!(path.is_none());
            }
            other => panic!("Wrong error variant after conversion: {other:?}"),
        }
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err: LoopCheckError = io_err.into();
        assert!(matches!(err, LoopCheckError::Io(_)));
        assert!(err.to_string().contains("access denied"));
    }
}
