//! tactus-cns: reflex orchestration for the haptic vision pipeline
//!
//! Provides:
//! - The sequential reflex loop wiring camera, depth inference and dispatch
//! - Bounded-failure policy with clean shutdown
//! - Throughput and processing-time accounting

pub mod config;
pub mod error;
pub mod reflex;
pub mod stats;

pub use config::CnsConfig;
pub use error::CnsError;
pub use reflex::{ExitReason, LoopSummary, ReflexLoop};
pub use stats::LoopStats;
