//! Artifact cache with auto-download functionality

use crate::catalog::ModelArtifact;
use futures_util::StreamExt;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use vahana_core::config::ZooConfig;
use vahana_core::error::{Result, ZooError};
use vahana_core::progress::Progress;

/// Local cache of downloaded model artifacts.
pub struct ArtifactStore {
    config: Arc<ZooConfig>,
}

impl ArtifactStore {
    pub fn new(config: Arc<ZooConfig>) -> Self {
        Self { config }
    }

    /// Ensure cache directory exists
    pub fn ensure_cache_dir(&self) -> Result<PathBuf> {
        let model_dir = &self.config.model_dir;
        if !model_dir.exists() {
            fs::create_dir_all(model_dir).map_err(|e| {
                ZooError::io_other(format!("failed to create model directory: {}", e))
            })?;
            info!("created model directory: {:?}", model_dir);
        }
        Ok(model_dir.clone())
    }

    /// Path an artifact would occupy in the cache, after name validation.
    pub fn cached_path(&self, artifact: &ModelArtifact) -> Result<PathBuf> {
        let name = &artifact.file_name;

        if name.is_empty() || name.len() > 255 {
            return Err(ZooError::ModelLoad("invalid artifact file name".to_string()));
        }

        // Prevent path traversal
        if name.contains("..") || name.contains('/') || name.contains('\\') {
            return Err(ZooError::ModelLoad(
                "artifact file name contains invalid characters".to_string(),
            ));
        }

        let path = self.config.model_dir.join(name);
        if !path.starts_with(&self.config.model_dir) {
            return Err(ZooError::ModelLoad("path traversal detected".to_string()));
        }
        Ok(path)
    }

    /// Download an artifact into the cache if not already present,
    /// reporting download progress into the optional sink. Returns the
    /// cached path.
    pub async fn ensure(
        &self,
        artifact: &ModelArtifact,
        mut progress: Option<&mut dyn Progress>,
    ) -> Result<PathBuf> {
        let path = self.cached_path(artifact)?;

        if path.exists() {
            info!("artifact {} already cached at {:?}", artifact.file_name, path);
            if let Some(sink) = progress.as_mut() {
                sink.finish();
            }
            return Ok(path);
        }

        if self.config.offline {
            return Err(ZooError::io_other(format!(
                "artifact {} is not cached and offline mode is enabled",
                artifact.file_name
            )));
        }

        let url = &artifact.url;
        if url.is_empty() || url.len() > 2048 {
            return Err(ZooError::ModelLoad("invalid artifact URL".to_string()));
        }

        // Only HTTPS sources are accepted
        if !url.starts_with("https://") {
            return Err(ZooError::ModelLoad(
                "only HTTPS URLs are allowed for model artifacts".to_string(),
            ));
        }

        self.ensure_cache_dir()?;
        info!("downloading artifact {} from {}", artifact.file_name, url);

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(self.config.download_timeout_secs))
            .build()?;

        let response = client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(ZooError::io_other(format!(
                "failed to download artifact {}: HTTP {}",
                artifact.file_name,
                response.status()
            )));
        }

        let total = response.content_length();
        if let Some(total) = total {
            if total > self.config.max_artifact_bytes {
                return Err(ZooError::ModelLoad(format!(
                    "artifact too large: {} bytes (max {} bytes)",
                    total, self.config.max_artifact_bytes
                )));
            }
        }

        let mut bytes: Vec<u8> = Vec::new();
        let mut last_percent = 0u8;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            bytes.extend_from_slice(&chunk);

            if bytes.len() as u64 > self.config.max_artifact_bytes {
                return Err(ZooError::ModelLoad(format!(
                    "downloaded artifact too large: over {} bytes",
                    self.config.max_artifact_bytes
                )));
            }

            if let (Some(total), Some(sink)) = (total, progress.as_mut()) {
                if total > 0 {
                    let percent = ((bytes.len() as u64 * 100) / total).min(100) as u8;
                    // Keep reports monotonically non-decreasing
                    if percent > last_percent {
                        last_percent = percent;
                        sink.update(percent);
                    }
                }
            }
        }

        if (bytes.len() as u64) < self.config.min_artifact_bytes {
            return Err(ZooError::ModelLoad(format!(
                "downloaded artifact too small ({} bytes), likely corrupted",
                bytes.len()
            )));
        }

        self.verify_checksum(artifact, &bytes)?;

        // Write to a temp file first, then rename, so a partial download
        // never lands at the final path.
        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, &bytes)
            .map_err(|e| ZooError::io_other(format!("failed to write artifact file: {}", e)))?;
        fs::rename(&temp_path, &path).map_err(|e| {
            let _ = fs::remove_file(&temp_path);
            ZooError::io_other(format!("failed to rename artifact file: {}", e))
        })?;

        if let Some(sink) = progress.as_mut() {
            sink.finish();
        }
        info!(
            "artifact {} ({} bytes) saved to {:?}",
            artifact.file_name,
            bytes.len(),
            path
        );
        Ok(path)
    }

    fn verify_checksum(&self, artifact: &ModelArtifact, bytes: &[u8]) -> Result<()> {
        let Some(expected) = artifact.sha256.as_deref() else {
            warn!(
                "no checksum for artifact {}, verification skipped",
                artifact.file_name
            );
            return Ok(());
        };

        let mut hasher = Sha256::new();
        hasher.update(bytes);
        let computed = hex::encode(hasher.finalize());

        if !computed.eq_ignore_ascii_case(expected) {
            return Err(ZooError::ModelLoad(format!(
                "checksum mismatch for artifact {}: expected {}, got {}",
                artifact.file_name, expected, computed
            )));
        }
        info!("verified checksum for artifact {}", artifact.file_name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store(dir: &TempDir) -> ArtifactStore {
        let mut config = ZooConfig::default();
        config.model_dir = dir.path().to_path_buf();
        ArtifactStore::new(Arc::new(config))
    }

    fn artifact(file_name: &str, url: &str) -> ModelArtifact {
        ModelArtifact {
            file_name: file_name.to_string(),
            url: url.to_string(),
            sha256: None,
        }
    }

    #[test]
    fn test_ensure_cache_dir_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        assert!(store.ensure_cache_dir().is_ok());
        assert!(store.ensure_cache_dir().is_ok());
    }

    #[test]
    fn test_cached_path_rejects_traversal() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        for name in ["", "../evil", "a/b", "a\\b"] {
            let result = store.cached_path(&artifact(name, "https://models.vahana.dev/m.bin"));
            assert!(result.is_err(), "name {:?} should be rejected", name);
        }
    }

    #[tokio::test]
    async fn test_ensure_cache_hit_skips_network() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let artifact = artifact("model.bin", "https://unreachable.invalid/model.bin");
        fs::write(dir.path().join("model.bin"), vec![1u8; 2048]).unwrap();

        // The URL is unreachable; a cache hit must not touch it.
        let path = store.ensure(&artifact, None).await.unwrap();
        assert_eq!(path, dir.path().join("model.bin"));
    }

    #[tokio::test]
    async fn test_ensure_rejects_non_https() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        for url in ["", "http://models.vahana.dev/m.bin", "ftp://x/m.bin"] {
            let result = store.ensure(&artifact("m.bin", url), None).await;
            match result {
                Err(ZooError::ModelLoad(_)) => {}
                other => panic!("url {:?}: expected ModelLoad, got {:?}", url, other),
            }
        }
    }

    #[tokio::test]
    async fn test_ensure_offline_miss_fails() {
        let dir = TempDir::new().unwrap();
        let mut config = ZooConfig::default();
        config.model_dir = dir.path().to_path_buf();
        config.offline = true;
        let store = ArtifactStore::new(Arc::new(config));

        let result = store
            .ensure(&artifact("m.bin", "https://models.vahana.dev/m.bin"), None)
            .await;
        assert!(matches!(result, Err(ZooError::Io(_))));
    }

    #[tokio::test]
    async fn test_ensure_offline_hit_succeeds() {
        let dir = TempDir::new().unwrap();
        let mut config = ZooConfig::default();
        config.model_dir = dir.path().to_path_buf();
        config.offline = true;
        let store = ArtifactStore::new(Arc::new(config));
        fs::write(dir.path().join("m.bin"), vec![1u8; 2048]).unwrap();

        let result = store
            .ensure(&artifact("m.bin", "https://models.vahana.dev/m.bin"), None)
            .await;
        assert!(result.is_ok());
    }

    #[test]
    fn test_verify_checksum_mismatch() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let mut a = artifact("m.bin", "https://models.vahana.dev/m.bin");
        a.sha256 = Some("0".repeat(64));
        let result = store.verify_checksum(&a, b"payload");
        assert!(matches!(result, Err(ZooError::ModelLoad(_))));
    }

    #[test]
    fn test_verify_checksum_match_case_insensitive() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let mut hasher = Sha256::new();
        hasher.update(b"payload");
        let digest = hex::encode(hasher.finalize()).to_uppercase();

        let mut a = artifact("m.bin", "https://models.vahana.dev/m.bin");
        a.sha256 = Some(digest);
        assert!(store.verify_checksum(&a, b"payload").is_ok());
    }
}
