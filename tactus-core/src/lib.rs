//! tactus-core: shared foundation for the haptic vision pipeline
//!
//! The actuation vector type, the bounded retry primitive and the
//! common error surface the other crates build on.

pub mod error;
pub mod retry;
pub mod types;

pub use error::{Error, Result};
pub use retry::{retry, RetryPolicy};
pub use types::{ActuationVector, ZONE_COUNT};
