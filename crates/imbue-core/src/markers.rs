//! Durable bootstrap markers
//!
//! The marker record carries the one-time setup facts that must survive
//! process restarts: whether the canonical dataset has been imported, and
//! which database name was decided at first seeding. The record is stored
//! as a single JSON document and replaced atomically, so no observer can
//! see a half-updated combination.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Errors from the marker store.
#[derive(Debug, thiserror::Error)]
pub enum MarkerError {
    #[error("Marker IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Marker serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// The one-time setup facts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BootstrapState {
    /// True once the canonical dataset has been imported.
    #[serde(default)]
    pub seeded: bool,
    /// Name of the active database, decided at first seeding.
    #[serde(default)]
    pub database_name: Option<String>,
    /// When the one-time provisioning completed.
    #[serde(default)]
    pub provisioned_at: Option<DateTime<Utc>>,
}

impl BootstrapState {
    /// The record written by a successful cold provisioning.
    pub fn provisioned(database_name: &str) -> Self {
        Self {
            seeded: true,
            database_name: Some(database_name.to_string()),
            provisioned_at: Some(Utc::now()),
        }
    }
}

/// Durable storage for the bootstrap record.
///
/// `store` replaces the whole record at once; a reader observes either the
/// previous record or the new one, never a torn mix.
pub trait MarkerStore: Send + Sync {
    fn load(&self) -> Result<BootstrapState, MarkerError>;
    fn store(&self, state: &BootstrapState) -> Result<(), MarkerError>;

    fn is_seeded(&self) -> Result<bool, MarkerError> {
        Ok(self.load()?.seeded)
    }

    fn active_database_name(&self) -> Result<Option<String>, MarkerError> {
        Ok(self.load()?.database_name)
    }

    fn set_seeded(&self) -> Result<(), MarkerError> {
        let mut state = self.load()?;
        state.seeded = true;
        self.store(&state)
    }

    fn set_active_database_name(&self, name: &str) -> Result<(), MarkerError> {
        let mut state = self.load()?;
        state.database_name = Some(name.to_string());
        self.store(&state)
    }
}

/// Marker store backed by one JSON file in the data directory.
///
/// A missing file reads as the default record, which is what a fresh
/// install looks like.
pub struct FileMarkerStore {
    path: PathBuf,
}

impl FileMarkerStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl MarkerStore for FileMarkerStore {
    fn load(&self) -> Result<BootstrapState, MarkerError> {
        match fs::read_to_string(&self.path) {
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BootstrapState::default()),
            Err(e) => Err(e.into()),
        }
    }

    fn store(&self, state: &BootstrapState) -> Result<(), MarkerError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        // Write-then-rename keeps the swap atomic on every platform we ship.
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(state)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// In-memory marker store for tests and previews.
#[derive(Default)]
pub struct MemoryMarkerStore {
    state: Mutex<BootstrapState>,
}

impl MemoryMarkerStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MarkerStore for MemoryMarkerStore {
    fn load(&self) -> Result<BootstrapState, MarkerError> {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        Ok(state.clone())
    }

    fn store(&self, state: &BootstrapState) -> Result<(), MarkerError> {
        let mut guard = self.state.lock().unwrap_or_else(|e| e.into_inner());
        *guard = state.clone();
        Ok(())
    }
}
