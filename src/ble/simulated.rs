//! Scripted in-process BLE peer
//!
//! Advertises a fixed device list and, once a client subscribes, delivers a
//! fixed list of payloads. Every call is recorded in a shared [`SimLog`] so
//! tests can assert on what the recorder did to the link.

use super::{BleCentral, BleConnection, BleError, DeviceDescriptor};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use uuid::Uuid;

#[derive(Debug, Default)]
pub struct SimLog {
    pub scans: usize,
    pub connects: Vec<String>,
    pub subscribed: Vec<Uuid>,
    pub unsubscribed: Vec<Uuid>,
    pub disconnects: usize,
}

pub struct SimCentral {
    devices: Vec<DeviceDescriptor>,
    characteristic: Uuid,
    payloads: Vec<Vec<u8>>,
    refuse_connections: bool,
    drop_link_after_payloads: bool,
    log: Arc<Mutex<SimLog>>,
}

impl SimCentral {
    pub fn new(devices: Vec<DeviceDescriptor>, characteristic: Uuid) -> Self {
        Self {
            devices,
            characteristic,
            payloads: Vec::new(),
            refuse_connections: false,
            drop_link_after_payloads: false,
            log: Arc::new(Mutex::new(SimLog::default())),
        }
    }

    pub fn with_payloads(mut self, payloads: Vec<Vec<u8>>) -> Self {
        self.payloads = payloads;
        self
    }

    pub fn refuse_connections(mut self) -> Self {
        self.refuse_connections = true;
        self
    }

    pub fn drop_link_after_payloads(mut self) -> Self {
        self.drop_link_after_payloads = true;
        self
    }

    pub fn log(&self) -> Arc<Mutex<SimLog>> {
        Arc::clone(&self.log)
    }
}

/// Shorthand for building scan results in tests.
pub fn device(name: Option<&str>, address: &str) -> DeviceDescriptor {
    DeviceDescriptor {
        name: name.map(str::to_string),
        address: address.to_string(),
    }
}

#[async_trait]
impl BleCentral for SimCentral {
    async fn scan(&self, duration: Duration) -> Result<Vec<DeviceDescriptor>, BleError> {
        self.log.lock().unwrap().scans += 1;
        tokio::time::sleep(duration).await;
        Ok(self.devices.clone())
    }

    async fn connect(
        &self,
        device: &DeviceDescriptor,
    ) -> Result<Box<dyn BleConnection>, BleError> {
        self.log.lock().unwrap().connects.push(device.address.clone());

        if self.refuse_connections {
            return Err(BleError::ConnectionError(format!(
                "{} did not respond",
                device.address
            )));
        }

        Ok(Box::new(SimConnection {
            characteristic: self.characteristic,
            payloads: self.payloads.clone(),
            drop_link_after_payloads: self.drop_link_after_payloads,
            tx: None,
            log: Arc::clone(&self.log),
        }))
    }
}

struct SimConnection {
    characteristic: Uuid,
    payloads: Vec<Vec<u8>>,
    drop_link_after_payloads: bool,
    // Held open until disconnect so the session sees a live link.
    tx: Option<mpsc::UnboundedSender<Vec<u8>>>,
    log: Arc<Mutex<SimLog>>,
}

#[async_trait]
impl BleConnection for SimConnection {
    async fn subscribe(
        &mut self,
        characteristic: Uuid,
    ) -> Result<mpsc::UnboundedReceiver<Vec<u8>>, BleError> {
        if characteristic != self.characteristic {
            return Err(BleError::CharacteristicNotFound(characteristic));
        }
        self.log.lock().unwrap().subscribed.push(characteristic);

        let (tx, rx) = mpsc::unbounded_channel();
        for payload in self.payloads.drain(..) {
            let _ = tx.send(payload);
        }

        if !self.drop_link_after_payloads {
            self.tx = Some(tx);
        }
        Ok(rx)
    }

    async fn unsubscribe(&mut self, characteristic: Uuid) -> Result<(), BleError> {
        self.log.lock().unwrap().unsubscribed.push(characteristic);
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<(), BleError> {
        self.tx = None;
        self.log.lock().unwrap().disconnects += 1;
        Ok(())
    }
}
