//! BLE central abstraction
//!
//! The recorder talks to peripherals only through [`BleCentral`] and
//! [`BleConnection`]. The btleplug backend drives real hardware; the
//! simulated backend scripts a peer for tests.

pub mod btle;
#[cfg(test)]
pub mod simulated;

use async_trait::async_trait;
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use uuid::Uuid;

pub use btle::BtleCentral;

#[derive(Error, Debug)]
pub enum BleError {
    #[error("No Bluetooth adapter found")]
    NoAdapter,

    #[error("Scan error: {0}")]
    ScanError(String),

    #[error("Device {0} is no longer available")]
    DeviceUnavailable(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Characteristic {0} not found")]
    CharacteristicNotFound(Uuid),

    #[error("GATT error: {0}")]
    GattError(String),

    #[error("Peer disconnected")]
    Disconnected,
}

/// A nearby advertiser seen during a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceDescriptor {
    /// Advertised local name, if the device sent one.
    pub name: Option<String>,
    /// Platform identifier: a MAC address on Linux, a UUID on macOS/Windows.
    pub address: String,
}

impl DeviceDescriptor {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("Unknown")
    }
}

impl fmt::Display for DeviceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.display_name(), self.address)
    }
}

/// BLE central role: scanning and connecting.
#[async_trait]
pub trait BleCentral: Send + Sync {
    /// Scan for `duration` and return every advertiser seen, in the order the
    /// backend reports them.
    async fn scan(&self, duration: Duration) -> Result<Vec<DeviceDescriptor>, BleError>;

    /// Open a connection to a device returned by [`BleCentral::scan`].
    async fn connect(&self, device: &DeviceDescriptor)
    -> Result<Box<dyn BleConnection>, BleError>;
}

/// An open link to a peripheral.
///
/// Owners must call [`BleConnection::disconnect`] before dropping it.
#[async_trait]
pub trait BleConnection: Send {
    /// Enable notifications on `characteristic`.
    ///
    /// Payloads arrive on the returned channel in delivery order. The channel
    /// closes when the peer drops the link. Delivery never waits on the
    /// receiver.
    async fn subscribe(
        &mut self,
        characteristic: Uuid,
    ) -> Result<mpsc::UnboundedReceiver<Vec<u8>>, BleError>;

    async fn unsubscribe(&mut self, characteristic: Uuid) -> Result<(), BleError>;

    async fn disconnect(&mut self) -> Result<(), BleError>;
}
