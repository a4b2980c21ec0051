//! Actuation dispatch: persistent channel first, HTTP fallback second

use crate::channel::{ChannelState, ControlChannel};
use crate::config::SkinConfig;
use crate::error::SkinError;
use async_trait::async_trait;
use std::sync::Arc;
use tactus_core::{retry, ActuationVector, RetryPolicy};
use tracing::{debug, warn};

/// Anything that can deliver an actuation vector. The reflex loop only
/// ever talks to this.
#[async_trait]
pub trait ActuationSink: Send + Sync {
    /// Deliver one vector. True means the device got it; false means
    /// this frame is lost and the caller just moves on.
    async fn send(&self, vector: &ActuationVector) -> bool;
}

/// Sends vectors over the persistent channel when it is up, falling
/// back to the device's HTTP endpoint otherwise.
///
/// Never surfaces an error: a failed delivery is logged and reported
/// as `false`, and the next frame supersedes it.
pub struct Dispatcher {
    channel: Arc<dyn ControlChannel>,
    client: reqwest::Client,
    fallback_url: String,
    fallback_retry: RetryPolicy,
}

impl Dispatcher {
    pub fn new(channel: Arc<dyn ControlChannel>, config: &SkinConfig) -> Result<Self, SkinError> {
        let client = reqwest::Client::builder()
            .timeout(config.send_timeout())
            .build()
            .map_err(SkinError::Network)?;

        Ok(Self {
            channel,
            client,
            fallback_url: config.fallback_url(),
            fallback_retry: config.send_retry(),
        })
    }

    /// The wire envelope the firmware parses: `{"data":[v0..v6]}`.
    fn payload(vector: &ActuationVector) -> Result<String, SkinError> {
        let value = serde_json::json!({ "data": vector.as_slice() });
        Ok(serde_json::to_string(&value)?)
    }

    /// One fallback POST attempt.
    async fn post_fallback(&self, payload: &str) -> Result<(), SkinError> {
        let response = self
            .client
            .post(&self.fallback_url)
            .header("Content-Type", "application/json")
            .body(payload.to_string())
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SkinError::Dispatch(format!(
                "Fallback returned HTTP {}",
                response.status()
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl ActuationSink for Dispatcher {
    async fn send(&self, vector: &ActuationVector) -> bool {
        let payload = match Self::payload(vector) {
            Ok(payload) => payload,
            Err(e) => {
                warn!("Failed to encode actuation payload: {}", e);
                return false;
            }
        };

        // Exactly one channel attempt; a fault downgrades this vector
        // to the fallback.
        if self.channel.state() == ChannelState::Connected {
            match self.channel.send_text(payload.clone()).await {
                Ok(()) => {
                    debug!("Sent motor values {}", vector);
                    return true;
                }
                Err(e) => warn!("Persistent channel send failed: {}", e),
            }
        }

        match retry(&self.fallback_retry, "fallback send", || {
            self.post_fallback(&payload)
        })
        .await
        {
            Ok(()) => {
                debug!("Sent motor values {} via fallback", vector);
                true
            }
            Err(e) => {
                warn!("Fallback send failed, dropping frame: {}", e);
                false
            }
        }
    }
}
