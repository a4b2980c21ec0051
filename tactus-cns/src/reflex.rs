//! Sequential capture, inference and actuation loop

use std::sync::Arc;
use std::time::Instant;

use parking_lot::RwLock;
use tactus_core::ActuationVector;
use tactus_eye::{zone_intensities, DepthPipeline, FrameSource};
use tactus_skin::ActuationSink;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::config::CnsConfig;
use crate::error::CnsError;
use crate::stats::LoopStats;

/// Why the reflex loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    /// Cancel flag flipped by the caller
    Cancelled,
    /// Too many consecutive capture or inference failures
    FailureThreshold,
}

/// Final accounting returned when the loop exits.
#[derive(Debug, Clone)]
pub struct LoopSummary {
    pub frames: u64,
    pub dispatched: u64,
    pub reason: ExitReason,
    pub average_throughput: f64,
    pub last_vector: Option<ActuationVector>,
}

/// Drives one frame at a time from camera to motors. Strictly
/// sequential: the next capture starts only after the previous dispatch
/// settles, so a slow device applies its own backpressure.
pub struct ReflexLoop {
    config: CnsConfig,
    camera: Box<dyn FrameSource>,
    pipeline: DepthPipeline,
    downsample_factor: u32,
    sink: Arc<dyn ActuationSink>,
    running: Arc<RwLock<bool>>,
    stats: LoopStats,
    last_vector: Option<ActuationVector>,
}

impl ReflexLoop {
    pub fn new(
        config: CnsConfig,
        camera: Box<dyn FrameSource>,
        pipeline: DepthPipeline,
        downsample_factor: u32,
        sink: Arc<dyn ActuationSink>,
    ) -> Result<Self, CnsError> {
        config.validate().map_err(CnsError::Config)?;

        Ok(Self {
            config,
            camera,
            pipeline,
            downsample_factor,
            sink,
            running: Arc::new(RwLock::new(true)),
            stats: LoopStats::new(),
            last_vector: None,
        })
    }

    /// Shared flag that stops the loop when set to false. Hand a clone
    /// to the signal handler before calling [`ReflexLoop::run`].
    pub fn cancel_handle(&self) -> Arc<RwLock<bool>> {
        self.running.clone()
    }

    /// Run until cancellation or the consecutive-failure threshold.
    /// The camera is released on every exit path.
    pub async fn run(mut self) -> LoopSummary {
        info!(
            "Reflex loop started (dispatching every {} frames)",
            self.config.frame_skip
        );

        let mut frame_count: u64 = 0;
        let mut dispatched: u64 = 0;
        let mut consecutive_failures: u32 = 0;
        let reason;

        loop {
            if !*self.running.read() {
                reason = ExitReason::Cancelled;
                break;
            }

            let frame = match self.camera.read().await {
                Ok(frame) => frame,
                Err(e) => {
                    consecutive_failures += 1;
                    warn!(
                        "Frame capture failed ({}/{}): {}",
                        consecutive_failures, self.config.max_consecutive_failures, e
                    );
                    if consecutive_failures >= self.config.max_consecutive_failures {
                        reason = ExitReason::FailureThreshold;
                        break;
                    }
                    sleep(self.config.failure_pause()).await;
                    continue;
                }
            };

            frame_count += 1;

            let started = Instant::now();
            let depth = match self.pipeline.process(&frame, self.downsample_factor) {
                Ok(depth) => depth,
                Err(e) => {
                    // An inference fault leaves the last dispatched
                    // vector untouched.
                    consecutive_failures += 1;
                    warn!(
                        "Depth inference failed ({}/{}): {}",
                        consecutive_failures, self.config.max_consecutive_failures, e
                    );
                    if consecutive_failures >= self.config.max_consecutive_failures {
                        reason = ExitReason::FailureThreshold;
                        break;
                    }
                    sleep(self.config.failure_pause()).await;
                    continue;
                }
            };
            // An iteration is healthy only once inference succeeds; a
            // readable camera must not mask a dead model.
            consecutive_failures = 0;
            let elapsed = started.elapsed().as_secs_f64();
            let throughput = if elapsed > 0.0 { 1.0 / elapsed } else { 0.0 };
            self.stats.record(throughput, elapsed);

            if frame_count % u64::from(self.config.frame_skip) == 0 {
                let vector = zone_intensities(&depth);
                self.last_vector = Some(vector);
                if self.sink.send(&vector).await {
                    dispatched += 1;
                    debug!("Dispatched zones {}", vector);
                } else {
                    warn!("Actuation dispatch failed, keeping the loop alive");
                }
            }

            if frame_count % self.config.summary_interval == 0 {
                info!(
                    "Processed {} frames | {:.1} fps | {:.0} ms inference avg",
                    frame_count,
                    self.stats.average_throughput(),
                    self.stats.average_processing_time() * 1000.0
                );
            }
        }

        self.camera.release();
        info!(
            "Reflex loop stopped after {} frames, {} inferences ({:?})",
            frame_count,
            self.stats.processed(),
            reason
        );

        LoopSummary {
            frames: frame_count,
            dispatched,
            reason,
            average_throughput: self.stats.average_throughput(),
            last_vector: self.last_vector,
        }
    }
}
