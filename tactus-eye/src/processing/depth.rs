//! Depth estimation pipeline: downsample, infer, resample, normalize

use crate::error::EyeError;
use crate::models::{DepthMap, DepthModel};
use image::imageops::{self, FilterType};
use image::RgbImage;
use std::sync::Arc;
use tracing::debug;

/// Runs the depth model and shapes its output back onto frame geometry.
pub struct DepthPipeline {
    model: Arc<dyn DepthModel>,
}

impl DepthPipeline {
    pub fn new(model: Arc<dyn DepthModel>) -> Self {
        Self { model }
    }

    /// Produce a normalized depth field matching `frame`'s resolution.
    ///
    /// `downsample_factor` shrinks the frame before inference to trade
    /// detail for latency; 1 runs the model on the full frame. The
    /// returned field is min-max normalized into [0, 1], with a flat
    /// field collapsing to zeros.
    pub fn process(&self, frame: &RgbImage, downsample_factor: u32) -> Result<DepthMap, EyeError> {
        let (width, height) = frame.dimensions();
        if width == 0 || height == 0 {
            return Err(EyeError::Processing("Empty frame".to_string()));
        }

        let factor = downsample_factor.max(1);
        let shrunk;
        let input = if factor > 1 {
            let w = (width / factor).max(1);
            let h = (height / factor).max(1);
            shrunk = imageops::resize(frame, w, h, FilterType::Triangle);
            &shrunk
        } else {
            frame
        };

        let raw = self.model.infer(input)?;
        if raw.finite_min_max().is_none() {
            return Err(EyeError::Model(
                "Model produced a non-finite depth map".to_string(),
            ));
        }
        debug!(
            "Depth map {}x{} from {}x{} input",
            raw.width(),
            raw.height(),
            input.width(),
            input.height()
        );

        raw.resize_bilinear(width, height).normalized()
    }
}
