//! Spawn the host and report what it says about the downloader setup

use std::path::PathBuf;

use media_bridge::{CommandBridge, HostConfig, HostProcess};

#[tokio::main]
async fn main() -> media_bridge::Result<()> {
    media_bridge::init_tracing();

    let config = match std::env::args().nth(1) {
        Some(path) => HostConfig::load_from_path(&PathBuf::from(path))?,
        None => HostConfig::load()?,
    };

    let host = HostProcess::spawn(&config).await?;
    let bridge = CommandBridge::new(host);

    let installed = bridge.check_downloader_installed().await?;
    let directory = bridge.get_default_download_directory().await?;

    tracing::info!("Downloader installed: {}", installed);
    tracing::info!("Default download directory: {}", directory);

    bridge.invoker().shutdown().await
}
