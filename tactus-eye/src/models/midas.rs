//! MiDaS-family monocular depth models via ONNX Runtime

use crate::error::EyeError;
use crate::models::{DepthMap, DepthModel};
use image::imageops::FilterType;
use image::RgbImage;
use parking_lot::Mutex;
use std::path::Path;
use tracing::info;

use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Tensor;

/// ImageNet channel statistics from the MiDaS preprocessing recipe.
const MEAN: [f32; 3] = [0.485, 0.456, 0.406];
const STD: [f32; 3] = [0.229, 0.224, 0.225];

/// A MiDaS-style depth network loaded from an ONNX file.
///
/// These networks emit inverse relative depth (larger = nearer), which
/// is exactly the polarity [`DepthModel`] promises.
pub struct OnnxDepthModel {
    session: Mutex<Session>,
    input_size: u32,
}

impl OnnxDepthModel {
    /// Load the network. `input_size` is the square side the model was
    /// exported for (256 for MiDaS small).
    pub fn load(path: &Path, input_size: u32) -> Result<Self, EyeError> {
        if input_size == 0 {
            return Err(EyeError::Model("Model input size must be non-zero".to_string()));
        }

        let session = Session::builder()
            .map_err(|e| EyeError::Ort(e.to_string()))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| EyeError::Ort(e.to_string()))?
            .with_intra_threads(2)
            .map_err(|e| EyeError::Ort(e.to_string()))?
            .commit_from_file(path)
            .map_err(|e| EyeError::Ort(e.to_string()))?;

        info!(
            "Loaded depth model from {} (input {}x{})",
            path.display(),
            input_size,
            input_size
        );
        Ok(Self {
            session: Mutex::new(session),
            input_size,
        })
    }

    /// Resize to the square input and normalize against the ImageNet
    /// statistics, NCHW layout.
    fn preprocess(&self, frame: &RgbImage) -> Vec<f32> {
        let side = self.input_size;
        let resized = image::imageops::resize(frame, side, side, FilterType::Triangle);
        let hw = (side as usize) * (side as usize);
        let mut chw = vec![0.0f32; 3 * hw];
        for (i, pixel) in resized.pixels().enumerate() {
            for c in 0..3 {
                chw[c * hw + i] = (pixel.0[c] as f32 / 255.0 - MEAN[c]) / STD[c];
            }
        }
        chw
    }
}

impl DepthModel for OnnxDepthModel {
    fn infer(&self, frame: &RgbImage) -> Result<DepthMap, EyeError> {
        let side = self.input_size as i64;
        let chw = self.preprocess(frame);
        let input =
            Tensor::from_array(([1i64, 3, side, side], chw)).map_err(|e| EyeError::Ort(e.to_string()))?;

        let mut session = self.session.lock();
        let outputs = session
            .run(ort::inputs![input])
            .map_err(|e| EyeError::Ort(e.to_string()))?;

        let (shape, raw) = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|e| EyeError::Ort(e.to_string()))?;

        // MiDaS emits [1, H, W]; take the trailing two dims so other
        // exports with an extra channel axis still work.
        if shape.len() < 2 {
            return Err(EyeError::Model(format!(
                "Unexpected depth output rank {}",
                shape.len()
            )));
        }
        let height = shape[shape.len() - 2] as u32;
        let width = shape[shape.len() - 1] as u32;
        DepthMap::new(width, height, raw.to_vec())
    }
}
