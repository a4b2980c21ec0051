//! Binary for pre-fetching the depth model from the command line

use tactus_eye::config::EyeConfig;
use tactus_eye::error::EyeError;
use tactus_eye::models::ModelManager;

#[tokio::main]
async fn main() -> Result<(), EyeError> {
    let config = EyeConfig::default();
    let manager = ModelManager::new(&config);

    println!("Downloading MiDaS small depth model...");
    let path = manager.midas_small().await?;
    println!("Depth model ready at: {}", path.display());

    Ok(())
}
