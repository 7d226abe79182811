use crate::config::Config;

// NOTE: The WAV container assumes the peripheral streams 16-bit signed
// little-endian PCM. Nothing on the wire says so; it is a configuration
// assumption.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioFormat {
    pub sample_rate: u32,
    pub channels: u16,
}

impl AudioFormat {
    pub const BITS_PER_SAMPLE: u16 = 16;

    pub fn from_config(config: &Config) -> Self {
        Self {
            sample_rate: config.sample_rate,
            channels: config.channels,
        }
    }

    /// Bytes in one frame (one sample per channel)
    pub fn frame_bytes(&self) -> usize {
        self.channels as usize * (Self::BITS_PER_SAMPLE / 8) as usize
    }

    /// Playback length in seconds of `bytes` of PCM in this format
    pub fn duration_of(&self, bytes: usize) -> f32 {
        let frames = bytes / self.frame_bytes();
        frames as f32 / self.sample_rate as f32
    }
}

impl Default for AudioFormat {
    fn default() -> Self {
        Self {
            sample_rate: 16000,
            channels: 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_of() {
        let mono = AudioFormat::default();
        assert_eq!(mono.frame_bytes(), 2);
        assert_eq!(mono.duration_of(32000), 1.0);

        let stereo = AudioFormat {
            sample_rate: 8000,
            channels: 2,
        };
        assert_eq!(stereo.frame_bytes(), 4);
        assert_eq!(stereo.duration_of(16000), 0.5);
    }
}
