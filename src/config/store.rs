//! Thread-safe settings storage.
//!
//! Provides an in-memory config container with interior mutability; setting
//! updates are written back to the config file, replacing the original
//! system's browser-local persistence.

use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use crate::config::loader::ConfigError;
use crate::config::types::{Config, Settings};

/// Thread-safe config container with interior mutability.
///
/// Allows multiple readers to access config concurrently while
/// supporting atomic updates when needed.
#[derive(Clone)]
pub struct SettingsStore {
    inner: Arc<RwLock<Config>>,
    path: PathBuf,
}

impl SettingsStore {
    /// Create a new SettingsStore from initial config and path.
    pub fn new(config: Config, path: PathBuf) -> Self {
        Self {
            inner: Arc::new(RwLock::new(config)),
            path,
        }
    }

    /// Get a clone of the current config.
    ///
    /// This is cheap because Config is Clone.
    /// Multiple readers can call this concurrently.
    pub fn get(&self) -> Config {
        self.inner.read().expect("settings lock poisoned").clone()
    }

    /// Get a clone of the current settings section.
    pub fn settings(&self) -> Settings {
        self.inner
            .read()
            .expect("settings lock poisoned")
            .settings
            .clone()
    }

    /// Update the settings section and persist the result.
    ///
    /// On write failure the in-memory update is kept and the error returned;
    /// the next successful update will persist both.
    pub fn update(&self, f: impl FnOnce(&mut Settings)) -> Result<(), ConfigError> {
        let snapshot = {
            let mut guard = self.inner.write().expect("settings lock poisoned");
            f(&mut guard.settings);
            guard.clone()
        };
        snapshot.save_to(&self.path)
    }

    /// Get the config file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}
