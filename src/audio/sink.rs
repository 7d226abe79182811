use anyhow::Result;
use async_trait::async_trait;
use std::path::Path;

/// Trait for persisting a finished recording
///
/// Implementations decide the on-disk layout (raw dump, WAV container).
/// `save` creates the file, truncating any existing one.
#[async_trait]
pub trait AudioSink: Send + Sync {
    /// The Vec is moved to avoid copying
    async fn save(&self, path: &Path, data: Vec<u8>) -> Result<()>;
}
