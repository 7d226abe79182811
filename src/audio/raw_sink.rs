use super::sink::AudioSink;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::Path;

/// Writes the received bytes verbatim. No container header is added, so the
/// file is not playable even when named `.wav`.
pub struct RawSink;

#[async_trait]
impl AudioSink for RawSink {
    async fn save(&self, path: &Path, data: Vec<u8>) -> Result<()> {
        tokio::fs::write(path, data)
            .await
            .with_context(|| format!("Failed to write audio file: {:?}", path))
    }
}
