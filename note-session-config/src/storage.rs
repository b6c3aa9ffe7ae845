//! Persistence backends for preferences and account-scoped state.
//!
//! YAML files live under `~/.config/note-session/accounts/<account>/`:
//! `state.yaml` for open notes and window geometry, `preferences.yaml` for
//! tunables. A missing or empty file loads as defaults; a corrupt file is an
//! error the caller decides how to survive.

use crate::account_state::AccountState;
use crate::error::ConfigError;
use crate::preferences::Preferences;
use crate::types::Account;
use parking_lot::Mutex;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

const STATE_FILE: &str = "state.yaml";
const PREFERENCES_FILE: &str = "preferences.yaml";

/// Account-keyed storage for preferences and open-note state.
pub trait StateStore: Send + Sync {
    fn load_state(&self, account: &Account) -> Result<AccountState, ConfigError>;
    fn save_state(&self, account: &Account, state: &AccountState) -> Result<(), ConfigError>;
    fn load_preferences(&self, account: &Account) -> Result<Preferences, ConfigError>;
    fn save_preferences(&self, account: &Account, prefs: &Preferences)
    -> Result<(), ConfigError>;
}

/// YAML-file backend, one directory per account.
#[derive(Debug, Clone)]
pub struct YamlStateStore {
    root: PathBuf,
}

impl YamlStateStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Store rooted at the platform config directory.
    pub fn at_default_location() -> Self {
        Self::new(Self::default_root())
    }

    pub fn default_root() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("note-session")
            .join("accounts")
    }

    pub fn account_dir(&self, account: &Account) -> PathBuf {
        self.root.join(account.storage_key())
    }

    fn read_yaml<T: DeserializeOwned + Default>(path: &Path) -> Result<T, ConfigError> {
        if !path.exists() {
            log::debug!("No state file at {:?}, using defaults", path);
            return Ok(T::default());
        }

        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;

        if contents.trim().is_empty() {
            return Ok(T::default());
        }

        serde_yaml_ng::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    fn write_yaml<T: Serialize>(
        path: &Path,
        value: &T,
        what: &'static str,
    ) -> Result<(), ConfigError> {
        let io_err = |source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let yaml =
            serde_yaml_ng::to_string(value).map_err(|source| ConfigError::Serialize { what, source })?;

        // Atomic save: write to temp file then rename to prevent corruption on crash
        let temp_path = path.with_extension("yaml.tmp");
        fs::write(&temp_path, &yaml).map_err(io_err)?;
        fs::rename(&temp_path, path).map_err(io_err)?;

        log::trace!("Wrote {} to {:?}", what, path);
        Ok(())
    }
}

impl StateStore for YamlStateStore {
    fn load_state(&self, account: &Account) -> Result<AccountState, ConfigError> {
        Self::read_yaml(&self.account_dir(account).join(STATE_FILE))
    }

    fn save_state(&self, account: &Account, state: &AccountState) -> Result<(), ConfigError> {
        Self::write_yaml(
            &self.account_dir(account).join(STATE_FILE),
            state,
            "account state",
        )
    }

    fn load_preferences(&self, account: &Account) -> Result<Preferences, ConfigError> {
        let prefs: Preferences =
            Self::read_yaml(&self.account_dir(account).join(PREFERENCES_FILE))?;
        Ok(prefs.normalized())
    }

    fn save_preferences(
        &self,
        account: &Account,
        prefs: &Preferences,
    ) -> Result<(), ConfigError> {
        prefs.validate()?;
        Self::write_yaml(
            &self.account_dir(account).join(PREFERENCES_FILE),
            prefs,
            "preferences",
        )
    }
}

/// In-memory backend for hosts without a disk and for tests.
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    states: Mutex<HashMap<String, AccountState>>,
    preferences: Mutex<HashMap<String, Preferences>>,
    state_writes: Mutex<usize>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `save_state` calls so far.
    pub fn state_writes(&self) -> usize {
        *self.state_writes.lock()
    }

    /// Current state for an account without going through the trait.
    pub fn snapshot(&self, account: &Account) -> AccountState {
        self.states
            .lock()
            .get(&account.storage_key())
            .cloned()
            .unwrap_or_default()
    }
}

impl StateStore for MemoryStateStore {
    fn load_state(&self, account: &Account) -> Result<AccountState, ConfigError> {
        Ok(self.snapshot(account))
    }

    fn save_state(&self, account: &Account, state: &AccountState) -> Result<(), ConfigError> {
        self.states
            .lock()
            .insert(account.storage_key(), state.clone());
        *self.state_writes.lock() += 1;
        Ok(())
    }

    fn load_preferences(&self, account: &Account) -> Result<Preferences, ConfigError> {
        Ok(self
            .preferences
            .lock()
            .get(&account.storage_key())
            .cloned()
            .unwrap_or_default())
    }

    fn save_preferences(
        &self,
        account: &Account,
        prefs: &Preferences,
    ) -> Result<(), ConfigError> {
        prefs.validate()?;
        self.preferences
            .lock()
            .insert(account.storage_key(), prefs.clone());
        Ok(())
    }
}
