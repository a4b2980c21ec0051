//! Depth model download and cache management

use crate::config::EyeConfig;
use crate::error::EyeError;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::PathBuf;
use tracing::info;

/// MiDaS v2.1 small, the network the wearable pipeline ships with.
pub const MIDAS_SMALL_URL: &str =
    "https://github.com/isl-org/MiDaS/releases/download/v2_1/model-small.onnx";
pub const MIDAS_SMALL_FILE: &str = "midas-small.onnx";
/// Not pinned yet; set to the release digest to enforce verification.
pub const MIDAS_SMALL_CHECKSUM: &str = "";

/// The exported input side of MiDaS small.
pub const MIDAS_SMALL_INPUT: u32 = 256;

const MAX_MODEL_SIZE: usize = 2_000_000_000;
const MIN_MODEL_SIZE: usize = 1024;
const DOWNLOAD_TIMEOUT_SECS: u64 = 3600;

/// Downloads depth models into the cache directory on first use.
pub struct ModelManager {
    model_dir: PathBuf,
}

impl ModelManager {
    pub fn new(config: &EyeConfig) -> Self {
        Self {
            model_dir: config.model_dir.clone(),
        }
    }

    /// Create the cache directory if it does not exist yet.
    pub fn ensure_model_dir(&self) -> Result<PathBuf, EyeError> {
        if !self.model_dir.exists() {
            fs::create_dir_all(&self.model_dir)?;
            info!("Created model directory {}", self.model_dir.display());
        }
        Ok(self.model_dir.clone())
    }

    /// Download `file_name` from `url` unless it is already cached.
    /// `checksum` is a hex SHA-256 digest; empty skips verification.
    pub async fn ensure_model(
        &self,
        file_name: &str,
        url: &str,
        checksum: &str,
    ) -> Result<PathBuf, EyeError> {
        if file_name.is_empty() || file_name.len() > 255 {
            return Err(EyeError::Model("Invalid model file name".to_string()));
        }
        // The name becomes a path component, so no separators or parent refs.
        if file_name.contains("..") || file_name.contains('/') || file_name.contains('\\') {
            return Err(EyeError::Model(
                "Model file name contains invalid characters".to_string(),
            ));
        }
        if !url.starts_with("https://") {
            return Err(EyeError::Model(
                "Model downloads require an https URL".to_string(),
            ));
        }

        self.ensure_model_dir()?;
        let model_path = self.model_dir.join(file_name);
        if model_path.exists() {
            info!("Model {} already cached at {}", file_name, model_path.display());
            return Ok(model_path);
        }

        info!("Downloading model {} from {}", file_name, url);
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(DOWNLOAD_TIMEOUT_SECS))
            .build()?;

        let response = client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(EyeError::Model(format!(
                "Model download returned HTTP {}",
                response.status()
            )));
        }

        if let Some(length) = response.content_length() {
            if length > MAX_MODEL_SIZE as u64 {
                return Err(EyeError::Model(format!(
                    "Model too large: {} bytes (max {})",
                    length, MAX_MODEL_SIZE
                )));
            }
        }

        let bytes = response.bytes().await?;
        if bytes.len() > MAX_MODEL_SIZE {
            return Err(EyeError::Model(format!(
                "Downloaded model too large: {} bytes (max {})",
                bytes.len(),
                MAX_MODEL_SIZE
            )));
        }
        if bytes.len() < MIN_MODEL_SIZE {
            return Err(EyeError::Model(
                "Downloaded file too small, likely corrupted".to_string(),
            ));
        }

        if !checksum.is_empty() {
            let mut hasher = Sha256::new();
            hasher.update(&bytes);
            let digest = hex::encode(hasher.finalize());
            if digest != checksum {
                return Err(EyeError::Model(format!(
                    "Checksum mismatch for {}: expected {}, got {}",
                    file_name, checksum, digest
                )));
            }
            info!("Verified checksum for model {}", file_name);
        } else {
            info!(
                "Downloaded {} bytes for model {} (checksum verification skipped)",
                bytes.len(),
                file_name
            );
        }

        // Temp file plus rename so a crash mid-write never leaves a
        // half model under the real name.
        let temp_path = model_path.with_extension("tmp");
        fs::write(&temp_path, &bytes)?;
        fs::rename(&temp_path, &model_path).map_err(|e| {
            let _ = fs::remove_file(&temp_path);
            EyeError::Io(e)
        })?;

        info!("Model {} saved to {}", file_name, model_path.display());
        Ok(model_path)
    }

    /// Cached MiDaS small, downloading on first use.
    pub async fn midas_small(&self) -> Result<PathBuf, EyeError> {
        self.ensure_model(MIDAS_SMALL_FILE, MIDAS_SMALL_URL, MIDAS_SMALL_CHECKSUM)
            .await
    }
}
