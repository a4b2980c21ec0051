//! Frame acquisition from the wearable camera or a replay directory

use crate::config::EyeConfig;
use crate::error::EyeError;
use async_trait::async_trait;
use image::RgbImage;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tactus_core::{retry, RetryPolicy};
use tokio::net::TcpStream;
use tracing::{debug, info, warn};

const PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// Something that yields RGB frames on demand.
///
/// `read` may fail on any call; callers decide how many failures in a
/// row they tolerate. `release` must be idempotent, and a released
/// source fails every further `read`.
#[async_trait]
pub trait FrameSource: Send {
    /// Fetch the next frame.
    async fn read(&mut self) -> Result<RgbImage, EyeError>;

    /// True until `release` is called.
    fn is_open(&self) -> bool;

    /// Give up the source and any resources behind it.
    fn release(&mut self);

    /// Ask for a different output resolution. Sources that cannot honor
    /// this keep their native size.
    fn set_resolution(&mut self, width: u32, height: u32);
}

/// Frames pulled from the wearable camera's HTTP capture endpoint.
pub struct DeviceCamera {
    base_url: String,
    capture_url: String,
    client: reqwest::Client,
    retry_policy: RetryPolicy,
    open: bool,
}

impl DeviceCamera {
    /// Build the source and probe the device. Probe results are logged
    /// for field debugging and never fail construction; the device may
    /// well come up a few seconds later.
    pub async fn connect(config: &EyeConfig) -> Result<Self, EyeError> {
        let base_url = config.device_url.trim_end_matches('/').to_string();
        let parsed = url::Url::parse(&base_url)
            .map_err(|e| EyeError::Config(format!("Invalid device URL {}: {}", base_url, e)))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(EyeError::Config(format!(
                "Device URL must use http or https: {}",
                base_url
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(config.capture_timeout())
            .build()
            .map_err(|e| EyeError::Camera(format!("Failed to create HTTP client: {}", e)))?;

        let camera = Self {
            capture_url: format!("{}/capture", base_url),
            base_url,
            client,
            retry_policy: config.capture_retry(),
            open: true,
        };
        camera.run_diagnostics(&parsed).await;
        Ok(camera)
    }

    /// Port reachability check plus a best-effort GET of the device
    /// root. Both outcomes are only logged.
    async fn run_diagnostics(&self, parsed: &url::Url) {
        let port = parsed.port_or_known_default().unwrap_or(80);
        match parsed.host_str() {
            Some(host) => {
                match tokio::time::timeout(PROBE_TIMEOUT, TcpStream::connect((host, port))).await {
                    Ok(Ok(_)) => info!("✅ Device port {} reachable at {}", port, host),
                    Ok(Err(e)) => warn!("❌ Device port {} unreachable at {}: {}", port, host, e),
                    Err(_) => warn!("❌ Device port probe timed out for {}:{}", host, port),
                }
            }
            None => warn!("Device URL has no host, skipping port probe"),
        }

        match self.client.get(&self.base_url).send().await {
            Ok(response) => info!("✅ Device root answered with HTTP {}", response.status()),
            Err(e) => warn!("❌ Device root request failed: {}", e),
        }
    }

    /// One capture attempt: GET, status check, decode.
    async fn fetch_frame(&self) -> Result<RgbImage, EyeError> {
        let response = self.client.get(&self.capture_url).send().await?;
        if !response.status().is_success() {
            return Err(EyeError::Camera(format!(
                "Capture returned HTTP {}",
                response.status()
            )));
        }

        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Err(EyeError::Camera("Capture returned an empty body".to_string()));
        }

        let frame = image::load_from_memory(&bytes)?;
        Ok(frame.to_rgb8())
    }
}

#[async_trait]
impl FrameSource for DeviceCamera {
    async fn read(&mut self) -> Result<RgbImage, EyeError> {
        if !self.open {
            return Err(EyeError::Camera("Camera already released".to_string()));
        }
        retry(&self.retry_policy, "frame capture", || self.fetch_frame()).await
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn release(&mut self) {
        if self.open {
            self.open = false;
            info!("Device camera released");
        }
    }

    /// The device fixes its sensor mode at flash time, so this is a
    /// documented no-op.
    fn set_resolution(&mut self, width: u32, height: u32) {
        debug!("Device camera ignores resolution request {}x{}", width, height);
    }
}

/// Frames replayed from a directory of still images, in filename order.
/// The set loops forever, which keeps end-to-end runs going on a desk
/// without the wearable.
pub struct ReplayCamera {
    frames: Vec<PathBuf>,
    cursor: usize,
    resolution: Option<(u32, u32)>,
    open: bool,
}

impl ReplayCamera {
    pub fn open(dir: &Path) -> Result<Self, EyeError> {
        let mut frames = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            let ext = path
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| e.to_ascii_lowercase());
            if matches!(ext.as_deref(), Some("jpg" | "jpeg" | "png" | "bmp")) {
                frames.push(path);
            }
        }
        frames.sort();

        if frames.is_empty() {
            return Err(EyeError::Camera(format!(
                "No frames found in {}",
                dir.display()
            )));
        }

        info!("Replay camera loaded {} frames from {}", frames.len(), dir.display());
        Ok(Self {
            frames,
            cursor: 0,
            resolution: None,
            open: true,
        })
    }
}

#[async_trait]
impl FrameSource for ReplayCamera {
    async fn read(&mut self) -> Result<RgbImage, EyeError> {
        if !self.open {
            return Err(EyeError::Camera("Camera already released".to_string()));
        }

        let path = &self.frames[self.cursor % self.frames.len()];
        self.cursor = self.cursor.wrapping_add(1);

        let frame = image::open(path)
            .map_err(|e| EyeError::Camera(format!("Failed to load {}: {}", path.display(), e)))?
            .to_rgb8();

        let frame = match self.resolution {
            Some((w, h)) if frame.dimensions() != (w, h) => {
                image::imageops::resize(&frame, w, h, image::imageops::FilterType::Triangle)
            }
            _ => frame,
        };
        Ok(frame)
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn release(&mut self) {
        if self.open {
            self.open = false;
            info!("Replay camera released");
        }
    }

    fn set_resolution(&mut self, width: u32, height: u32) {
        self.resolution = Some((width, height));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_frame(dir: &Path, name: &str, width: u32, height: u32) {
        let img = RgbImage::from_fn(width, height, |x, y| image::Rgb([x as u8, y as u8, 0]));
        img.save(dir.join(name)).unwrap();
    }

    #[tokio::test]
    async fn test_replay_camera_cycles_in_name_order() {
        let dir = TempDir::new().unwrap();
        write_frame(dir.path(), "a.png", 8, 6);
        write_frame(dir.path(), "b.png", 10, 6);

        let mut camera = ReplayCamera::open(dir.path()).unwrap();
        assert!(camera.is_open());
        assert_eq!(camera.read().await.unwrap().dimensions(), (8, 6));
        assert_eq!(camera.read().await.unwrap().dimensions(), (10, 6));
        // Wraps around.
        assert_eq!(camera.read().await.unwrap().dimensions(), (8, 6));
    }

    #[tokio::test]
    async fn test_replay_camera_honors_resolution() {
        let dir = TempDir::new().unwrap();
        write_frame(dir.path(), "a.png", 8, 6);

        let mut camera = ReplayCamera::open(dir.path()).unwrap();
        camera.set_resolution(16, 12);
        assert_eq!(camera.read().await.unwrap().dimensions(), (16, 12));
    }

    #[tokio::test]
    async fn test_replay_camera_release_is_final() {
        let dir = TempDir::new().unwrap();
        write_frame(dir.path(), "a.png", 8, 6);

        let mut camera = ReplayCamera::open(dir.path()).unwrap();
        camera.release();
        assert!(!camera.is_open());
        assert!(camera.read().await.is_err());
        // A second release is a no-op.
        camera.release();
        assert!(!camera.is_open());
    }

    #[test]
    fn test_replay_camera_empty_dir() {
        let dir = TempDir::new().unwrap();
        assert!(ReplayCamera::open(dir.path()).is_err());
    }

    #[test]
    fn test_replay_camera_skips_non_images() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("notes.txt"), "not a frame").unwrap();
        assert!(ReplayCamera::open(dir.path()).is_err());
    }
}
