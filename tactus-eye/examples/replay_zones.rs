//! Run the depth pipeline over a directory of stills and print the
//! motor intensities per frame.
//!
//! Usage: cargo run --example replay_zones -- <frame-dir>

use std::sync::Arc;

use image::RgbImage;
use tactus_eye::models::DepthMap;
use tactus_eye::{zone_intensities, DepthModel, DepthPipeline, EyeError, FrameSource, ReplayCamera};

/// Stand-in model so the wiring can run without a network: treats pixel
/// brightness as nearness. Swap in `OnnxDepthModel` (feature "onnx")
/// for real depth.
struct BrightnessModel;

impl DepthModel for BrightnessModel {
    fn infer(&self, frame: &RgbImage) -> Result<DepthMap, EyeError> {
        Ok(DepthMap::from_fn(frame.width(), frame.height(), |x, y| {
            let p = frame.get_pixel(x, y).0;
            (p[0] as f32 + p[1] as f32 + p[2] as f32) / (3.0 * 255.0)
        }))
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let dir = std::env::args()
        .nth(1)
        .ok_or("Usage: replay_zones <frame-dir>")?;

    let mut camera = ReplayCamera::open(std::path::Path::new(&dir))?;
    let pipeline = DepthPipeline::new(Arc::new(BrightnessModel));

    for n in 0..10 {
        let frame = camera.read().await?;
        let depth = pipeline.process(&frame, 2)?;
        let vector = zone_intensities(&depth);
        println!("frame {:>2}: {}", n, vector);
    }

    camera.release();
    Ok(())
}
