//! Persisted user preferences
//!
//! A small JSON document in the platform data directory holding the mock AI
//! switch and the onboarding flag.

use crate::error::{JournalError, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// User preferences
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Use the local question engine and extractor instead of the pipeline
    #[serde(default = "default_true")]
    pub mock_ai_enabled: bool,

    /// The user has not finished onboarding yet
    #[serde(default = "default_true")]
    pub needs_onboarding: bool,
}

fn default_true() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            mock_ai_enabled: true,
            needs_onboarding: true,
        }
    }
}

/// File-backed settings store
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
    settings: Settings,
}

impl SettingsStore {
    /// Open the settings file in the user's data directory
    ///
    /// The `DAYJOT_SETTINGS_PATH` environment variable overrides the
    /// location.
    pub fn new() -> Result<Self> {
        if let Ok(override_path) = std::env::var("DAYJOT_SETTINGS_PATH") {
            return Ok(Self::new_with_path(override_path));
        }

        let proj_dirs = ProjectDirs::from("com", "dayjot", "dayjot")
            .ok_or_else(|| JournalError::Storage("Could not determine data directory".into()))?;

        Ok(Self::new_with_path(proj_dirs.data_dir().join("settings.json")))
    }

    /// Open the settings file at `path`
    ///
    /// A missing or unreadable file yields the defaults; nothing is written
    /// until a setting changes.
    ///
    /// # Examples
    ///
    /// ```
    /// use dayjot::settings::SettingsStore;
    ///
    /// let dir = tempfile::tempdir().unwrap();
    /// let mut store = SettingsStore::new_with_path(dir.path().join("settings.json"));
    /// assert!(store.settings().mock_ai_enabled);
    /// assert!(!store.toggle_mock_ai().unwrap());
    /// ```
    pub fn new_with_path<P: Into<PathBuf>>(path: P) -> Self {
        let path = path.into();
        let settings = match std::fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|e| {
                tracing::warn!("Ignoring unreadable settings file {}: {}", path.display(), e);
                Settings::default()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Settings::default(),
            Err(e) => {
                tracing::warn!("Failed to read settings file {}: {}", path.display(), e);
                Settings::default()
            }
        };
        Self { path, settings }
    }

    /// Location of the settings file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current settings
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Flip the mock AI switch and persist it, returning the new value
    pub fn toggle_mock_ai(&mut self) -> Result<bool> {
        self.settings.mock_ai_enabled = !self.settings.mock_ai_enabled;
        self.save()?;
        tracing::info!(enabled = self.settings.mock_ai_enabled, "Toggled mock AI");
        Ok(self.settings.mock_ai_enabled)
    }

    /// Mark onboarding as finished and persist it
    pub fn complete_onboarding(&mut self) -> Result<()> {
        self.settings.needs_onboarding = false;
        self.save()
    }

    fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(JournalError::Io)?;
        }
        let contents =
            serde_json::to_string_pretty(&self.settings).map_err(JournalError::Serialization)?;
        std::fs::write(&self.path, contents).map_err(JournalError::Io)?;
        tracing::debug!("Saved settings to {}", self.path.display());
        Ok(())
    }
}
