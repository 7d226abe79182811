use super::format::AudioFormat;
use super::sink::AudioSink;
use anyhow::{Context, Result};
use async_trait::async_trait;
use hound::{SampleFormat, WavSpec, WavWriter};
use std::path::{Path, PathBuf};

/// Wraps the received bytes in a WAV container
///
/// The bytes are read as interleaved 16-bit little-endian samples. A trailing
/// partial frame is dropped. Encoding runs on the blocking pool.
pub struct WavSink {
    format: AudioFormat,
}

impl WavSink {
    pub fn new(format: AudioFormat) -> Self {
        Self { format }
    }
}

#[async_trait]
impl AudioSink for WavSink {
    async fn save(&self, path: &Path, data: Vec<u8>) -> Result<()> {
        let format = self.format;
        let path: PathBuf = path.to_path_buf();

        tokio::task::spawn_blocking(move || write_wav(&path, format, &data))
            .await
            .context("WAV writer task panicked")?
    }
}

fn write_wav(path: &Path, format: AudioFormat, data: &[u8]) -> Result<()> {
    let spec = WavSpec {
        channels: format.channels,
        sample_rate: format.sample_rate,
        bits_per_sample: AudioFormat::BITS_PER_SAMPLE,
        sample_format: SampleFormat::Int,
    };

    let mut writer = WavWriter::create(path, spec)
        .with_context(|| format!("Failed to create WAV writer: {:?}", path))?;

    let frames = data.chunks_exact(format.frame_bytes());
    let leftover = frames.remainder().len();
    if leftover > 0 {
        tracing::warn!("Dropping {} trailing byte(s) of a partial frame", leftover);
    }

    for frame in frames {
        for sample in frame.chunks_exact(2) {
            writer
                .write_sample(i16::from_le_bytes([sample[0], sample[1]]))
                .context("Failed to write sample")?;
        }
    }

    writer.finalize().context("Failed to finalize WAV")?;

    tracing::debug!(
        "Wrote {:.2} s of {} Hz audio to {:?}",
        format.duration_of(data.len()),
        format.sample_rate,
        path
    );
    Ok(())
}
