//! Configuration for the Vahana model zoo

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Zoo configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZooConfig {
    /// Directory where downloaded model artifacts are cached
    pub model_dir: PathBuf,
    /// Refuse network access; only cached artifacts can be opened
    pub offline: bool,
    /// Maximum accepted artifact size in bytes
    pub max_artifact_bytes: u64,
    /// Minimum accepted artifact size in bytes (smaller downloads are
    /// treated as corrupted)
    pub min_artifact_bytes: u64,
    /// Download timeout in seconds
    pub download_timeout_secs: u64,
}

impl Default for ZooConfig {
    fn default() -> Self {
        let model_dir = dirs::home_dir()
            .map(|mut p| {
                p.push(".vahana");
                p.push("models");
                p
            })
            .unwrap_or_else(|| PathBuf::from("./models"));

        Self {
            model_dir,
            offline: false,
            max_artifact_bytes: 2_000_000_000, // 2GB
            min_artifact_bytes: 1024,
            download_timeout_secs: 3600,
        }
    }
}

impl ZooConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.model_dir.as_os_str().is_empty() {
            return Err("Model directory must not be empty".to_string());
        }

        if self.max_artifact_bytes == 0 {
            return Err("Maximum artifact size must be non-zero".to_string());
        }

        if self.min_artifact_bytes >= self.max_artifact_bytes {
            return Err("Minimum artifact size must be below the maximum".to_string());
        }

        if self.download_timeout_secs == 0 {
            return Err("Download timeout must be non-zero".to_string());
        }

        Ok(())
    }
}
