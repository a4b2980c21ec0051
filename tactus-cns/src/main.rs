// Tactus - point it at the device and it starts feeding the vest
// Camera frames in, 7-zone motor intensities out

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tactus_cns::{CnsConfig, ReflexLoop};
use tactus_core::ActuationVector;
use tactus_eye::{DepthModel, DepthPipeline, DeviceCamera, EyeConfig, FrameSource, ReplayCamera};
use tactus_skin::{ActuationSink, ConnectionManager, Dispatcher, SkinConfig};
use tokio::signal;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "tactus")]
#[command(about = "Haptic vision pipeline - camera frames to 7-zone motor intensities", long_about = None)]
#[command(version)]
struct Cli {
    /// Device base URL (camera capture and actuation endpoints)
    #[arg(long, default_value = "http://192.168.1.100")]
    device_url: String,

    /// Replay still images from a directory instead of the device camera
    #[arg(long)]
    replay_dir: Option<PathBuf>,

    /// Force replay frames to this resolution, e.g. 640x480
    #[arg(long, value_parser = parse_resolution)]
    replay_size: Option<(u32, u32)>,

    /// Depth model file (downloaded on first run when omitted)
    #[arg(long)]
    model: Option<PathBuf>,

    /// Model input side length in pixels
    #[arg(long, default_value = "256")]
    model_input: u32,

    /// Shrink frames by this factor before inference
    #[arg(long, default_value = "2")]
    downsample: u32,

    /// Dispatch an actuation update every Nth frame
    #[arg(long, default_value = "2")]
    frame_skip: u32,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn parse_resolution(value: &str) -> Result<(u32, u32), String> {
    let (w, h) = value
        .split_once('x')
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{value}'"))?;
    let width = w.parse().map_err(|_| format!("invalid width '{w}'"))?;
    let height = h.parse().map_err(|_| format!("invalid height '{h}'"))?;
    Ok((width, height))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = tracing_subscriber::EnvFilter::try_new(&cli.log_level)
        .map_err(|e| anyhow::anyhow!("invalid log level '{}': {}", cli.log_level, e))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    info!("🚀 Starting Tactus...");

    let mut eye_config = EyeConfig::default();
    eye_config.device_url = cli.device_url.clone();
    eye_config.downsample_factor = cli.downsample;
    eye_config.replay_dir = cli.replay_dir.clone();
    eye_config.replay_resolution = cli.replay_size;
    eye_config
        .validate()
        .map_err(|e| anyhow::anyhow!("eye config: {}", e))?;

    let mut skin_config = SkinConfig::default();
    skin_config.device_url = cli.device_url.clone();
    skin_config
        .validate()
        .map_err(|e| anyhow::anyhow!("skin config: {}", e))?;

    let cns_config = CnsConfig {
        frame_skip: cli.frame_skip,
        ..Default::default()
    };

    // Frame source
    info!("👁️  Initializing frame source...");
    let camera: Box<dyn FrameSource> = match &cli.replay_dir {
        Some(dir) => {
            let mut replay = ReplayCamera::open(dir)?;
            if let Some((width, height)) = eye_config.replay_resolution {
                replay.set_resolution(width, height);
            }
            Box::new(replay)
        }
        None => Box::new(DeviceCamera::connect(&eye_config).await?),
    };
    info!("✅ Frame source ready");

    // Depth model
    info!("🧠 Loading depth model...");
    let model = resolve_model(&cli, &eye_config).await?;
    info!("✅ Depth model ready");

    // Actuation channel
    info!("🔌 Connecting actuation channel...");
    let manager = Arc::new(ConnectionManager::new(&skin_config)?);
    if manager.connect().await {
        info!("✅ Persistent channel connected");
    } else {
        warn!("⚠️  Persistent channel unavailable, HTTP fallback only");
    }
    let dispatcher = Arc::new(Dispatcher::new(manager.clone(), &skin_config)?);

    let reflex = ReflexLoop::new(
        cns_config,
        camera,
        DepthPipeline::new(model),
        eye_config.downsample_factor,
        dispatcher.clone(),
    )?;

    // Stop cleanly on Ctrl+C
    let cancel = reflex.cancel_handle();
    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            info!("🛑 Shutdown signal received");
            *cancel.write() = false;
        }
    });

    info!("🎯 Tactus is running! Press Ctrl+C to stop.");
    let summary = reflex.run().await;

    info!(
        "📊 {} frames processed, {} dispatched, {:.1} fps average",
        summary.frames, summary.dispatched, summary.average_throughput
    );
    if let Some(vector) = summary.last_vector {
        info!(
            "📊 Last dispatched zones {} (peak {:.2})",
            vector,
            vector.peak()
        );
    }

    // The vest keeps driving the last intensities it received; stand
    // the motors down before dropping the link.
    if !dispatcher.send(&ActuationVector::zeros()).await {
        warn!("Stand-down dispatch failed, motors may stay on");
    }

    manager.disconnect().await;
    info!("👋 Tactus stopped. Goodbye!");
    Ok(())
}

#[cfg(feature = "onnx")]
async fn resolve_model(cli: &Cli, eye_config: &EyeConfig) -> anyhow::Result<Arc<dyn DepthModel>> {
    use tactus_eye::{ModelManager, OnnxDepthModel};

    let path = match &cli.model {
        Some(path) => path.clone(),
        None => ModelManager::new(eye_config).midas_small().await?,
    };
    let model = OnnxDepthModel::load(&path, cli.model_input)?;
    Ok(Arc::new(model))
}

#[cfg(not(feature = "onnx"))]
async fn resolve_model(cli: &Cli, _eye_config: &EyeConfig) -> anyhow::Result<Arc<dyn DepthModel>> {
    anyhow::bail!(
        "no inference backend compiled in; rebuild with --features onnx \
         (requested model {:?}, input size {})",
        cli.model,
        cli.model_input
    )
}
