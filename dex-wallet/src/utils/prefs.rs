//! Persisted user preferences
//!
//! A small JSON file under the configured data directory. Anything unreadable
//! is treated as a fresh install.

use lib_core::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const PREFS_FILE: &str = "prefs.json";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Prefs {
    /// The welcome flow has been completed once
    pub welcome_shown: bool,
}

impl Prefs {
    pub fn path(data_dir: &Path) -> PathBuf {
        data_dir.join(PREFS_FILE)
    }

    /// Load from `data_dir`. A missing or corrupt file yields the defaults.
    pub fn load(data_dir: &Path) -> Self {
        let path = Self::path(data_dir);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No preferences file, using defaults");
                return Self::default();
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Preferences unreadable, using defaults");
                return Self::default();
            }
        };

        serde_json::from_str(&raw).unwrap_or_else(|e| {
            warn!(path = %path.display(), error = %e, "Preferences corrupt, using defaults");
            Self::default()
        })
    }

    pub fn save(&self, data_dir: &Path) -> Result<()> {
        fs::create_dir_all(data_dir)
            .map_err(|e| AppError::Config(format!("Cannot create {}: {}", data_dir.display(), e)))?;

        let path = Self::path(data_dir);
        let json = serde_json::to_string_pretty(self).map_err(|e| AppError::Internal(e.to_string()))?;
        fs::write(&path, json).map_err(|e| AppError::Config(format!("Cannot write {}: {}", path.display(), e)))?;

        debug!(path = %path.display(), "Preferences saved");
        Ok(())
    }

    /// Record that the welcome flow ran. Returns true if this was the first time.
    pub fn mark_welcome_shown(data_dir: &Path) -> Result<bool> {
        let mut prefs = Self::load(data_dir);
        if prefs.welcome_shown {
            return Ok(false);
        }
        prefs.welcome_shown = true;
        prefs.save(data_dir)?;
        Ok(true)
    }
}
