//! Depth model seam and the depth field it produces

pub mod manager;
#[cfg(feature = "onnx")]
pub mod midas;

pub use manager::ModelManager;
#[cfg(feature = "onnx")]
pub use midas::OnnxDepthModel;

use crate::error::EyeError;
use image::RgbImage;

/// A dense per-pixel depth field, row-major.
///
/// Values are *inverse* relative depth: larger means nearer. The scale
/// is arbitrary until [`DepthMap::normalized`] maps it into [0, 1].
#[derive(Debug, Clone, PartialEq)]
pub struct DepthMap {
    width: u32,
    height: u32,
    data: Vec<f32>,
}

impl DepthMap {
    pub fn new(width: u32, height: u32, data: Vec<f32>) -> Result<Self, EyeError> {
        if width == 0 || height == 0 {
            return Err(EyeError::Model(format!(
                "Degenerate depth map {}x{}",
                width, height
            )));
        }
        let expected = (width as usize) * (height as usize);
        if data.len() != expected {
            return Err(EyeError::Model(format!(
                "Depth map size mismatch: {}x{} needs {} values, got {}",
                width,
                height,
                expected,
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Build from a generator. Handy for synthetic fields in tests and
    /// stand-in models.
    pub fn from_fn(width: u32, height: u32, f: impl Fn(u32, u32) -> f32) -> Self {
        debug_assert!(width > 0 && height > 0);
        let mut data = Vec::with_capacity((width as usize) * (height as usize));
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            data,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn get(&self, x: u32, y: u32) -> f32 {
        self.data[(y * self.width + x) as usize]
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Min and max over the field, or None if any value is non-finite.
    pub fn finite_min_max(&self) -> Option<(f32, f32)> {
        let mut min = f32::INFINITY;
        let mut max = f32::NEG_INFINITY;
        for &v in &self.data {
            if !v.is_finite() {
                return None;
            }
            min = min.min(v);
            max = max.max(v);
        }
        Some((min, max))
    }

    /// Resample to `width` x `height` with bilinear interpolation,
    /// center-aligned and clamped at the borders. Outputs are convex
    /// combinations of inputs, so the value range never widens.
    pub fn resize_bilinear(&self, width: u32, height: u32) -> DepthMap {
        if width == self.width && height == self.height {
            return self.clone();
        }
        debug_assert!(width > 0 && height > 0);

        let sx = self.width as f32 / width as f32;
        let sy = self.height as f32 / height as f32;
        let mut data = Vec::with_capacity((width as usize) * (height as usize));

        for y in 0..height {
            let fy = ((y as f32 + 0.5) * sy - 0.5).clamp(0.0, (self.height - 1) as f32);
            let y0 = fy.floor() as u32;
            let y1 = (y0 + 1).min(self.height - 1);
            let ty = fy - y0 as f32;

            for x in 0..width {
                let fx = ((x as f32 + 0.5) * sx - 0.5).clamp(0.0, (self.width - 1) as f32);
                let x0 = fx.floor() as u32;
                let x1 = (x0 + 1).min(self.width - 1);
                let tx = fx - x0 as f32;

                let top = self.get(x0, y0) * (1.0 - tx) + self.get(x1, y0) * tx;
                let bottom = self.get(x0, y1) * (1.0 - tx) + self.get(x1, y1) * tx;
                data.push(top * (1.0 - ty) + bottom * ty);
            }
        }

        DepthMap {
            width,
            height,
            data,
        }
    }

    /// Min-max normalize into [0, 1]. A flat field has no contrast to
    /// spread, and a span wider than f32 overflows to infinity; both
    /// collapse to all zeros instead of dividing.
    pub fn normalized(mut self) -> Result<DepthMap, EyeError> {
        let (min, max) = self
            .finite_min_max()
            .ok_or_else(|| EyeError::Model("Depth map contains non-finite values".to_string()))?;

        let range = max - min;
        if range > 0.0 && range.is_finite() {
            for v in &mut self.data {
                *v = (*v - min) / range;
            }
        } else {
            for v in &mut self.data {
                *v = 0.0;
            }
        }
        Ok(self)
    }
}

/// The opaque depth estimator behind the pipeline.
///
/// Polarity contract: implementations must return inverse relative
/// depth, larger = nearer. The rest of the pipeline leans on this so
/// close obstacles come out as strong vibration after the cubic
/// response.
#[cfg_attr(test, mockall::automock)]
pub trait DepthModel: Send + Sync {
    /// Estimate a depth field for `frame`. The returned map may be any
    /// resolution; callers resample it to whatever geometry they need.
    fn infer(&self, frame: &RgbImage) -> Result<DepthMap, EyeError>;
}
