//! Retrieval and local persistence of TLE text.
//!
//! The network side is a single blocking GET with no retry. [`TextFetcher`]
//! is the seam the pipeline depends on, so tests and offline runs can supply
//! text without a network.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{debug, info};
use thiserror::Error;

/// Public ISS element set maintained by ARISS.
pub const DEFAULT_TLE_URL: &str = "https://live.ariss.org/iss.txt";

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP request to {url} failed: {message}")]
    Http { url: String, message: String },

    #[error("Failed to read response body from {url}: {source}")]
    Body {
        url: String,
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to create data directory {path:?}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write {path:?}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Anything that can turn a URL into UTF-8 text.
pub trait TextFetcher {
    fn fetch_text(&self, url: &str) -> Result<String, FetchError>;
}

/// Blocking HTTP fetcher backed by `ureq`.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    agent: ureq::Agent,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        HttpFetcher { agent }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}

impl TextFetcher for HttpFetcher {
    fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        info!("Fetching TLE from {url}");
        let response = self.agent.get(url).call().map_err(|e| FetchError::Http {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        let body = response.into_string().map_err(|e| FetchError::Body {
            url: url.to_string(),
            source: e,
        })?;

        debug!("Received {} bytes", body.len());
        Ok(body)
    }
}

/// Text file holding the most recently downloaded TLE.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TleStore {
    dir: PathBuf,
    file_name: String,
}

impl TleStore {
    pub fn new(dir: impl Into<PathBuf>, file_name: impl Into<String>) -> Self {
        TleStore {
            dir: dir.into(),
            file_name: file_name.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(&self.file_name)
    }

    pub fn exists(&self) -> bool {
        self.path().is_file()
    }

    /// Write `text`, creating the data directory first if needed.
    pub fn save(&self, text: &str) -> Result<PathBuf, StoreError> {
        fs::create_dir_all(&self.dir).map_err(|e| StoreError::CreateDir {
            path: self.dir.clone(),
            source: e,
        })?;

        let path = self.path();
        fs::write(&path, text).map_err(|e| StoreError::Write {
            path: path.clone(),
            source: e,
        })?;

        info!("TLE file saved to {:?}", path);
        Ok(path)
    }

    pub fn load(&self) -> Result<String, StoreError> {
        let path = self.path();
        debug!("Loading TLE file {:?}", path);
        fs::read_to_string(&path).map_err(|e| StoreError::Read { path, source: e })
    }
}

impl Default for TleStore {
    fn default() -> Self {
        Self::new("./data", "file.txt")
    }
}
