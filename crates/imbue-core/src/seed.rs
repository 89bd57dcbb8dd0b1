//! Seed dataset acquisition
//!
//! The canonical dataset ships with the app shell, either as a static asset
//! served over HTTP (web) or as a bundled file. Acquisition is one GET or
//! one read; there is no retry policy, a failed fetch fails provisioning.

use std::path::PathBuf;

use imbue_sqlite::Dataset;

/// Errors acquiring or parsing the seed dataset.
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("Seed fetch failed: {0}")]
    Fetch(String),
    #[error("Seed source not supported by this build: {0}")]
    UnsupportedSource(String),
    #[error("Seed IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Seed parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Where the bundled seed export comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeedSource {
    /// HTTP GET of a static asset. Requires the `http` feature.
    Url(String),
    /// File bundled with the shell.
    Path(PathBuf),
}

impl SeedSource {
    /// Fetch and parse the seed dataset.
    pub async fn fetch(&self) -> Result<Dataset, SeedError> {
        match self {
            SeedSource::Path(path) => {
                let text = std::fs::read_to_string(path)?;
                Ok(serde_json::from_str(&text)?)
            }
            #[cfg(feature = "http")]
            SeedSource::Url(url) => fetch_url(url).await,
            #[cfg(not(feature = "http"))]
            SeedSource::Url(url) => Err(SeedError::UnsupportedSource(url.clone())),
        }
    }
}

#[cfg(feature = "http")]
async fn fetch_url(url: &str) -> Result<Dataset, SeedError> {
    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(30))
        .build()
        .map_err(|e| SeedError::Fetch(e.to_string()))?;

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| SeedError::Fetch(format!("{}: {}", url, e)))?;

    if !response.status().is_success() {
        return Err(SeedError::Fetch(format!(
            "{}: HTTP {}",
            url,
            response.status().as_u16()
        )));
    }

    response
        .json::<Dataset>()
        .await
        .map_err(|e| SeedError::Fetch(format!("{}: {}", url, e)))
}
