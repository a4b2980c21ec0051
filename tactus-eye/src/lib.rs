//! tactus-eye: frame acquisition and depth perception
//!
//! Pulls frames from the wearable camera (or a replay directory), runs
//! monocular depth inference behind an opaque model seam, and folds the
//! normalized depth field into the 7 column-zone intensities the vest's
//! motors understand.

pub mod camera;
pub mod config;
pub mod error;
pub mod models;
pub mod processing;

pub use camera::{DeviceCamera, FrameSource, ReplayCamera};
pub use config::EyeConfig;
pub use error::EyeError;
pub use models::{DepthMap, DepthModel, ModelManager};
#[cfg(feature = "onnx")]
pub use models::OnnxDepthModel;
pub use processing::{zone_bounds, zone_intensities, DepthPipeline};
