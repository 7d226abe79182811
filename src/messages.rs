use std::fmt;
use std::path::PathBuf;

/// Commands for the Recorder service
#[derive(Debug)]
pub enum RecorderCommand {
    /// End the listening window early. Collected bytes are discarded.
    Stop,
}

/// Why a listening window ended
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionEnd {
    Elapsed,
    Cancelled,
    PeerDisconnected,
}

/// Human-readable progress lines shown to the operator
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Progress {
    ScanStarted,
    DeviceFound { name: String, address: String },
    DeviceNotFound,
    Connected { name: String },
    Received(usize),
    Saved(PathBuf),
    NoData,
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Progress::ScanStarted => write!(f, "Scanning for devices..."),
            Progress::DeviceFound { name, address } => {
                write!(f, "Found device: {} ({})", name, address)
            }
            Progress::DeviceNotFound => write!(f, "Device not found."),
            Progress::Connected { name } => write!(f, "Connected to {}", name),
            Progress::Received(len) => write!(f, "Received {} bytes", len),
            Progress::Saved(path) => write!(f, "Audio saved to {}", path.display()),
            Progress::NoData => write!(f, "No audio data received."),
        }
    }
}
