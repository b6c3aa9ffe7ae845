//! Per-account coordinator preferences.

use crate::defaults;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tunables read when an account becomes active.
///
/// Every field has a serde default so partially written files (or files
/// from older versions) still load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    /// Maximum number of note tabs kept open before the oldest are evicted.
    #[serde(default = "defaults::max_tabs")]
    pub max_tabs: usize,

    /// Silently expunge notes that were created, never edited, and closed.
    #[serde(default = "defaults::expunge_empty_new_notes")]
    pub expunge_empty_new_notes: bool,

    /// Deadline for the save-before-close wait.
    #[serde(default = "defaults::save_timeout_ms")]
    pub save_timeout_ms: u64,

    /// Deadline for the expunge-before-close wait.
    #[serde(default = "defaults::expunge_timeout_ms")]
    pub expunge_timeout_ms: u64,

    /// Delay before a window resize is written to persisted geometry.
    #[serde(default = "defaults::geometry_debounce_ms")]
    pub geometry_debounce_ms: u64,

    /// Value stamped into the source-application attribute of new notes.
    #[serde(default = "defaults::source_application")]
    pub source_application: String,

    /// Remember the last focused tab and reselect it on restore.
    #[serde(default = "defaults::track_last_focused_tab")]
    pub track_last_focused_tab: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            max_tabs: defaults::max_tabs(),
            expunge_empty_new_notes: defaults::expunge_empty_new_notes(),
            save_timeout_ms: defaults::save_timeout_ms(),
            expunge_timeout_ms: defaults::expunge_timeout_ms(),
            geometry_debounce_ms: defaults::geometry_debounce_ms(),
            source_application: defaults::source_application(),
            track_last_focused_tab: defaults::track_last_focused_tab(),
        }
    }
}

impl Preferences {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_tabs == 0 {
            return Err(ConfigError::Validation(
                "max_tabs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Copy with out-of-range values clamped to their nearest legal value.
    pub fn normalized(mut self) -> Self {
        if self.max_tabs == 0 {
            log::warn!("max_tabs of 0 in preferences, using 1");
            self.max_tabs = 1;
        }
        self
    }

    /// Save-before-close deadline, never below the blocking floor.
    pub fn save_timeout(&self) -> Duration {
        Duration::from_millis(
            self.save_timeout_ms
                .max(defaults::min_blocking_timeout_ms()),
        )
    }

    /// Expunge-before-close deadline, never below the blocking floor.
    pub fn expunge_timeout(&self) -> Duration {
        Duration::from_millis(
            self.expunge_timeout_ms
                .max(defaults::min_blocking_timeout_ms()),
        )
    }

    pub fn geometry_debounce(&self) -> Duration {
        Duration::from_millis(self.geometry_debounce_ms)
    }
}
