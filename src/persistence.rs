use crate::audio::{AudioFormat, AudioSink, RawSink, WavSink};
use crate::config::Config;
use crate::messages::Progress;
use crate::report::Reporter;
use anyhow::Result;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Persisted {
    Saved(PathBuf),
    NoData,
}

/// Build the sink selected by `config.container`
pub fn sink_for(config: &Config) -> Box<dyn AudioSink> {
    match config.container.as_str() {
        "wav" => Box::new(WavSink::new(AudioFormat::from_config(config))),
        _ => Box::new(RawSink),
    }
}

/// Write a finished recording, or report that nothing arrived.
///
/// An empty recording leaves `path` untouched.
pub async fn persist(
    data: Vec<u8>,
    path: &Path,
    sink: &dyn AudioSink,
    reporter: &mut dyn Reporter,
) -> Result<Persisted> {
    if data.is_empty() {
        reporter.report(Progress::NoData);
        return Ok(Persisted::NoData);
    }

    tracing::debug!("Persisting {} bytes to {:?}", data.len(), path);
    sink.save(path, data).await?;

    reporter.report(Progress::Saved(path.to_path_buf()));
    Ok(Persisted::Saved(path.to_path_buf()))
}
