//! Scheduler configuration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::engine::conflict::ConflictPolicy;

/// Configuration loading errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The JSON document could not be decoded.
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Behaviour switches for a [`crate::core::directory::Directory`].
///
/// Missing fields fall back to [`SchedulerConfig::default`], which keeps the
/// reference conflict semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Rule used to detect clashing appointments.
    pub conflict: ConflictPolicy,
    /// Reject appointments whose end is not after their start.
    pub require_end_after_start: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            conflict: ConflictPolicy::default(),
            require_end_after_start: true,
        }
    }
}

impl SchedulerConfig {
    /// Parses a JSON document such as
    /// `{"conflict": {"rule": "half_open", "scope": "same_date"}}`.
    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        let config = serde_json::from_str(content)?;
        tracing::debug!(?config, "loaded scheduler config");
        Ok(config)
    }
}
