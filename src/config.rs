//! Configuration management for loopcheck.
//!
//! Settings live in `<project>/.loopcheck/settings.json`. A missing file
//! means defaults; a present but malformed file is an error.

use crate::error::{IntoLoopCheckError, LoopCheckError, Result};
use crate::log::DEFAULT_LOG_CAPACITY;
use crate::r#loop::mode::LoopMode;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default pause between steps of a run, in milliseconds.
pub const DEFAULT_STEP_DELAY_MS: u64 = 500;

/// Longest pause accepted by [`VerifierConfig::validate`].
pub const MAX_STEP_DELAY_MS: u64 = 60_000;

/// Verifier settings loaded from `.loopcheck/settings.json`.
///
/// # Example settings.json
///
/// ```json
/// {
///   "stepDelayMs": 250,
///   "logCapacity": 100,
///   "defaultThreshold": 3,
///   "defaultMode": "CountAboveThreshold"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifierConfig {
    /// Visualization delay between steps of `run`.
    #[serde(default = "default_step_delay_ms")]
    pub step_delay_ms: u64,

    /// Entries kept in the in-memory run log.
    #[serde(default = "default_log_capacity")]
    pub log_capacity: usize,

    /// Threshold used when none is given.
    #[serde(default)]
    pub default_threshold: i64,

    /// Mode used when none is given.
    #[serde(default = "default_mode")]
    pub default_mode: LoopMode,
}

fn default_step_delay_ms() -> u64 {
    DEFAULT_STEP_DELAY_MS
}

fn default_log_capacity() -> usize {
    DEFAULT_LOG_CAPACITY
}

fn default_mode() -> LoopMode {
    LoopMode::PrefixSum
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            step_delay_ms: DEFAULT_STEP_DELAY_MS,
            log_capacity: DEFAULT_LOG_CAPACITY,
            default_threshold: 0,
            default_mode: LoopMode::PrefixSum,
        }
    }
}

impl VerifierConfig {
    /// Create the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a project directory.
    ///
    /// # Errors
    ///
    /// Returns [`LoopCheckError::Config`] if the file exists but cannot be
    /// read or parsed.
    pub fn load(project_dir: &Path) -> Result<Self> {
        let settings_path = Self::settings_path(project_dir);

        if settings_path.exists() {
            let content =
                std::fs::read_to_string(&settings_path).into_config_error_at(&settings_path)?;
            let config: VerifierConfig =
                serde_json::from_str(&content).into_config_error_at(&settings_path)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Get the settings.json path for a project
    pub fn settings_path(project_dir: &Path) -> PathBuf {
        project_dir.join(".loopcheck/settings.json")
    }

    /// Check value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`LoopCheckError::InvalidConfig`] naming the first bad field.
    pub fn validate(&self) -> Result<()> {
        if self.log_capacity == 0 {
            return Err(LoopCheckError::invalid_config(
                "logCapacity",
                "must be at least 1",
            ));
        }
        if self.step_delay_ms > MAX_STEP_DELAY_MS {
            return Err(LoopCheckError::invalid_config(
                "stepDelayMs",
                format!("must not exceed {} ms", MAX_STEP_DELAY_MS),
            ));
        }
        Ok(())
    }

    /// Step delay as a [`Duration`].
    #[must_use]
    pub fn step_delay(&self) -> Duration {
        Duration::from_millis(self.step_delay_ms)
    }

    #[must_use]
    pub fn with_step_delay_ms(mut self, ms: u64) -> Self {
        self.step_delay_ms = ms;
        self
    }

    #[must_use]
    pub fn with_log_capacity(mut self, capacity: usize) -> Self {
        self.log_capacity = capacity;
        self
    }

    #[must_use]
    pub fn with_default_threshold(mut self, threshold: i64) -> Self {
        self.default_threshold = threshold;
        self
    }

    #[must_use]
    pub fn with_default_mode(mut self, mode: LoopMode) -> Self {
        self.default_mode = mode;
        self
    }
}
