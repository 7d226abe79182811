mod app;
mod audio;
mod ble;
mod config;
mod discovery;
mod messages;
mod persistence;
mod report;
mod services;

use app::App;
use ble::BtleCentral;
use config::Config;
use report::ConsoleReporter;
use services::RecorderHandle;

use anyhow::{Context, Result};
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    tracing::info!("Starting BLE audio recorder");

    // Load configuration
    let config = Config::load()?;
    config.validate()?;

    let central = BtleCentral::new()
        .await
        .context("Failed to initialize Bluetooth")?;

    // Ctrl+C ends the listening window early; the link is still closed cleanly
    let (recorder_tx, recorder_rx) = mpsc::channel(1);
    let recorder_handle = RecorderHandle::new(recorder_tx);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Received Ctrl+C, stopping session");
            if let Err(e) = recorder_handle.stop().await {
                tracing::debug!("Recorder already finished: {}", e);
            }
        }
    });

    let app = App::new(config, Box::new(central));
    let outcome = app.run(recorder_rx, &mut ConsoleReporter).await?;

    tracing::info!("Recorder finished: {:?}", outcome);
    Ok(())
}
