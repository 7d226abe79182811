pub mod buffer;
pub mod format;
pub mod raw_sink;
pub mod sink;
pub mod wav_sink;

pub use buffer::AudioBuffer;
pub use format::AudioFormat;
pub use raw_sink::RawSink;
pub use sink::AudioSink;
pub use wav_sink::WavSink;
