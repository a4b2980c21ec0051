//! Configuration for tactus-cns

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Reflex loop configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CnsConfig {
    /// Dispatch an actuation update every Nth processed frame
    pub frame_skip: u32,
    /// Consecutive iteration failures tolerated before shutdown
    pub max_consecutive_failures: u32,
    /// Frames between performance summaries
    pub summary_interval: u64,
    /// Pause after a failed iteration in milliseconds
    pub failure_pause_ms: u64,
}

impl Default for CnsConfig {
    fn default() -> Self {
        Self {
            frame_skip: 2,
            max_consecutive_failures: 5,
            summary_interval: 30,
            failure_pause_ms: 500,
        }
    }
}

impl CnsConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.frame_skip == 0 {
            return Err("Frame skip must be greater than 0".to_string());
        }

        if self.max_consecutive_failures == 0 {
            return Err("Max consecutive failures must be greater than 0".to_string());
        }

        if self.summary_interval == 0 {
            return Err("Summary interval must be greater than 0".to_string());
        }

        Ok(())
    }

    pub fn failure_pause(&self) -> Duration {
        Duration::from_millis(self.failure_pause_ms)
    }
}
