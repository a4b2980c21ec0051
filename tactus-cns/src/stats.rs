//! Reflex loop performance accounting

use std::collections::VecDeque;

/// Throughput samples kept for the moving average
const THROUGHPUT_WINDOW: usize = 10;

/// Moving-window throughput plus a lifetime processing-time average.
#[derive(Debug, Default)]
pub struct LoopStats {
    window: VecDeque<f64>,
    processed: u64,
    total_processing_secs: f64,
}

impl LoopStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one processed frame: its instantaneous throughput and the
    /// seconds inference took.
    pub fn record(&mut self, throughput: f64, processing_secs: f64) {
        if self.window.len() == THROUGHPUT_WINDOW {
            self.window.pop_front();
        }
        self.window.push_back(throughput);
        self.processed += 1;
        self.total_processing_secs += processing_secs;
    }

    /// Average throughput over the most recent window, frames per second.
    pub fn average_throughput(&self) -> f64 {
        if self.window.is_empty() {
            return 0.0;
        }
        self.window.iter().sum::<f64>() / self.window.len() as f64
    }

    /// Lifetime average processing time in seconds.
    pub fn average_processing_time(&self) -> f64 {
        if self.processed == 0 {
            return 0.0;
        }
        self.total_processing_secs / self.processed as f64
    }

    pub fn processed(&self) -> u64 {
        self.processed
    }
}
