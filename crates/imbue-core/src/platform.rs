//! Runtime platform detection

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Errors from platform detection.
#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    #[error("Unknown platform: {0}")]
    Unknown(String),
    #[error("Platform could not be determined")]
    Undetermined,
}

/// The runtime platform of the host shell.
///
/// This is a closed set: every platform branch in the crate matches it
/// exhaustively, so adding a platform is a compile-checked change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "uniffi", derive(uniffi::Enum))]
pub enum Platform {
    Web,
    Android,
    Ios,
}

impl Platform {
    /// Detect the runtime platform.
    ///
    /// The `IMBUE_PLATFORM` environment variable set by the host shell wins;
    /// otherwise the compile target decides. Desktop test builds carry no
    /// platform of their own and must rely on one of the overrides.
    pub fn detect() -> Result<Self, PlatformError> {
        if let Ok(name) = std::env::var("IMBUE_PLATFORM") {
            return name.parse();
        }
        Self::from_target().ok_or(PlatformError::Undetermined)
    }

    fn from_target() -> Option<Self> {
        if cfg!(target_arch = "wasm32") {
            Some(Platform::Web)
        } else if cfg!(target_os = "android") {
            Some(Platform::Android)
        } else if cfg!(target_os = "ios") {
            Some(Platform::Ios)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Web => "web",
            Platform::Android => "android",
            Platform::Ios => "ios",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = PlatformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "web" => Ok(Platform::Web),
            "android" => Ok(Platform::Android),
            "ios" => Ok(Platform::Ios),
            other => Err(PlatformError::Unknown(other.to_string())),
        }
    }
}
