//! Configuration for tactus-skin

use crate::error::SkinError;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tactus_core::RetryPolicy;

/// Skin configuration: how actuation vectors reach the vest.
///
/// Keep `send_timeout_ms` well under the frame period; a slow fallback
/// send stalls the whole reflex loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkinConfig {
    /// Base HTTP URL of the device, e.g. "http://192.168.1.100". The
    /// fallback endpoint and the WebSocket host both derive from it.
    pub device_url: String,
    /// TCP port of the device's WebSocket listener.
    pub channel_port: u16,
    /// Budget for one WebSocket connect attempt, in milliseconds.
    pub connect_timeout_ms: u64,
    /// Per-attempt timeout for the HTTP fallback send, in milliseconds.
    pub send_timeout_ms: u64,
    /// Fallback send attempts per vector, including the first.
    pub send_attempts: u32,
    /// Pause between fallback attempts, in milliseconds.
    pub send_retry_delay_ms: u64,
}

impl Default for SkinConfig {
    fn default() -> Self {
        Self {
            device_url: "http://192.168.1.100".to_string(),
            channel_port: 81,
            connect_timeout_ms: 5000,
            send_timeout_ms: 1000,
            send_attempts: 2,
            send_retry_delay_ms: 200,
        }
    }
}

impl SkinConfig {
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

        if self.channel_port == 0 {
            return Err("Channel port must be non-zero".to_string());
        }

        if self.connect_timeout_ms == 0 || self.send_timeout_ms == 0 {
            return Err("Timeouts must be non-zero".to_string());
        }

        if self.send_attempts == 0 {
            return Err("Send attempts must be at least 1".to_string());
        }

        Ok(())
    }

    /// WebSocket endpoint derived from the device host.
    pub fn channel_url(&self) -> Result<String, SkinError> {
        let parsed = url::Url::parse(&self.device_url)
            .map_err(|e| SkinError::Config(format!("Invalid device URL: {}", e)))?;
        let host = parsed
            .host_str()
            .ok_or_else(|| SkinError::Config("Device URL has no host".to_string()))?;
        let scheme = if parsed.scheme() == "https" { "wss" } else { "ws" };
        Ok(format!("{}://{}:{}", scheme, host, self.channel_port))
    }

    /// HTTP endpoint for the fallback send.
    pub fn fallback_url(&self) -> String {
        format!("{}/send_data", self.device_url.trim_end_matches('/'))
    }

    /// Retry policy for the fallback send.
    pub fn send_retry(&self) -> RetryPolicy {
        RetryPolicy::from_millis(self.send_attempts, self.send_retry_delay_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn send_timeout(&self) -> Duration {
        Duration::from_millis(self.send_timeout_ms)
    }
}
