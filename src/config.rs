//! Run configuration.
//!
//! Defaults reproduce the stock run: ISS feed from ARISS, `./data/file.txt`,
//! and the two sample reference positions. A JSON file may override any
//! subset of fields; command-line flags are applied on top by the binary.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::fetch::{HttpFetcher, TleStore, DEFAULT_TLE_URL};
use crate::kepler::KeplerSolver;
use crate::vector::Vector3;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to open config file {path:?}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Source of the TLE text.
    pub tle_url: String,
    /// Directory the downloaded TLE is written to.
    pub data_dir: PathBuf,
    /// File name inside `data_dir`.
    pub file_name: String,
    /// Skip the download and use the stored file.
    pub offline: bool,
    /// HTTP timeout (seconds).
    pub timeout_secs: u64,
    /// Kepler solver tolerance and iteration cap.
    pub solver: KeplerSolver,
    /// Two positions (km) spanning the projection plane.
    pub reference_positions: [Vector3; 2],
}

impl Default for Config {
    fn default() -> Self {
        Config {
            tle_url: DEFAULT_TLE_URL.to_string(),
            data_dir: PathBuf::from("./data"),
            file_name: "file.txt".to_string(),
            offline: false,
            timeout_secs: 30,
            solver: KeplerSolver::default(),
            reference_positions: [
                Vector3::new(1000.0, 2000.0, 500.0),
                Vector3::new(2000.0, 3000.0, 1000.0),
            ],
        }
    }
}

impl Config {
    /// Load a JSON config; absent fields keep their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| ConfigError::Open {
            path: path.to_path_buf(),
            source: e,
        })?;
        serde_json::from_reader(BufReader::new(file)).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    pub fn store(&self) -> TleStore {
        TleStore::new(&self.data_dir, &self.file_name)
    }

    pub fn fetcher(&self) -> HttpFetcher {
        HttpFetcher::new(Duration::from_secs(self.timeout_secs))
    }
}
