//! Frame-to-intensity processing stages

pub mod depth;
pub mod zones;

pub use depth::DepthPipeline;
pub use zones::{zone_bounds, zone_intensities};
