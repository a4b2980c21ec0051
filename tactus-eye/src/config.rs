//! Configuration for tactus-eye

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tactus_core::RetryPolicy;

/// Eye configuration: where frames come from and how depth is estimated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EyeConfig {
    /// Base HTTP URL of the wearable camera, e.g. "http://192.168.1.100".
    pub device_url: String,
    /// Per-request timeout for a single capture, in milliseconds.
    pub capture_timeout_ms: u64,
    /// Capture attempts per frame, including the first.
    pub capture_attempts: u32,
    /// Pause between capture attempts, in milliseconds.
    pub capture_retry_delay_ms: u64,
    /// Dimension divisor applied to frames before inference. 1 disables
    /// downsampling.
    pub downsample_factor: u32,
    /// Directory of still images for the replay source.
    pub replay_dir: Option<PathBuf>,
    /// Forced output resolution for the replay source.
    pub replay_resolution: Option<(u32, u32)>,
    /// Where downloaded depth models are cached.
    pub model_dir: PathBuf,
}

impl Default for EyeConfig {
    fn default() -> Self {
        let model_dir = dirs::home_dir()
            .map(|mut p| {
                p.push(".tactus");
                p.push("models");
                p
            })
            .unwrap_or_else(|| PathBuf::from("./models"));

        Self {
            device_url: "http://192.168.1.100".to_string(),
            capture_timeout_ms: 2000,
            capture_attempts: 2,
            capture_retry_delay_ms: 500,
            downsample_factor: 2,
            replay_dir: None,
            replay_resolution: None,
            model_dir,
        }
    }
}

impl EyeConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        let parsed = url::Url::parse(&self.device_url)
            .map_err(|e| format!("Invalid device URL: {}", e))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err("Device URL must use http or https".to_string());
        }
        if parsed.host_str().is_none() {
            return Err("Device URL has no host".to_string());
        }

        if self.capture_timeout_ms == 0 {
            return Err("Capture timeout must be non-zero".to_string());
        }

        if self.capture_attempts == 0 {
            return Err("Capture attempts must be at least 1".to_string());
        }

        if self.downsample_factor == 0 || self.downsample_factor > 16 {
            return Err("Downsample factor must be between 1 and 16".to_string());
        }

        if let Some((w, h)) = self.replay_resolution {
            if w == 0 || h == 0 {
                return Err("Replay resolution must be non-zero".to_string());
            }
        }

        Ok(())
    }

    /// Retry policy for a single frame capture.
    pub fn capture_retry(&self) -> RetryPolicy {
        RetryPolicy::from_millis(self.capture_attempts, self.capture_retry_delay_ms)
    }

    pub fn capture_timeout(&self) -> Duration {
        Duration::from_millis(self.capture_timeout_ms)
    }
}
