//! Store configuration supplied by the host shell

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::platform::Platform;
use crate::seed::SeedSource;

/// Errors validating a configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Configuration for opening an [`ImbueStore`](crate::ImbueStore).
///
/// Everything is optional: with no overrides the store detects the platform
/// itself and keeps its files under the user data directory. A seed source
/// is only required the first time a device provisions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Record))]
pub struct StoreConfig {
    /// Directory holding the database, snapshot, and marker files.
    /// Defaults to `<user data dir>/imbue`.
    pub data_dir: Option<String>,
    /// HTTP location of the bundled seed export.
    pub seed_url: Option<String>,
    /// Filesystem location of the bundled seed export.
    pub seed_path: Option<String>,
    /// Platform override from the host shell; detected when absent.
    pub platform: Option<Platform>,
}

impl StoreConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(dir) = &self.data_dir {
            if dir.trim().is_empty() {
                return Err(ConfigError::Invalid("data_dir must not be empty".into()));
            }
        }
        if self.seed_url.is_some() && self.seed_path.is_some() {
            return Err(ConfigError::Invalid(
                "provide either seed_url or seed_path, not both".into(),
            ));
        }
        Ok(())
    }

    /// The resolved data directory.
    pub fn resolved_data_dir(&self) -> PathBuf {
        match &self.data_dir {
            Some(dir) => PathBuf::from(dir),
            None => dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("imbue"),
        }
    }

    /// The configured seed source, when any.
    pub(crate) fn seed_source(&self) -> Option<SeedSource> {
        if let Some(path) = &self.seed_path {
            return Some(SeedSource::Path(PathBuf::from(path)));
        }
        self.seed_url.as_ref().map(|url| SeedSource::Url(url.clone()))
    }
}
