use super::{BleCentral, BleConnection, BleError, DeviceDescriptor};
use async_trait::async_trait;
use btleplug::api::{
    Central as _, CentralEvent, Characteristic, Manager as _, Peripheral as _, ScanFilter,
};
use btleplug::platform::{Adapter, Manager, Peripheral};
use futures::StreamExt;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use uuid::Uuid;

/// BLE central backed by the first adapter btleplug reports.
pub struct BtleCentral {
    adapter: Adapter,
}

impl BtleCentral {
    pub async fn new() -> Result<Self, BleError> {
        let manager = Manager::new()
            .await
            .map_err(|e| BleError::ScanError(e.to_string()))?;

        let adapter = manager
            .adapters()
            .await
            .map_err(|e| BleError::ScanError(e.to_string()))?
            .into_iter()
            .next()
            .ok_or(BleError::NoAdapter)?;

        Ok(Self { adapter })
    }

    async fn find_peripheral(&self, address: &str) -> Result<Peripheral, BleError> {
        let peripherals = self
            .adapter
            .peripherals()
            .await
            .map_err(|e| BleError::ScanError(e.to_string()))?;

        peripherals
            .into_iter()
            .find(|p| p.id().to_string() == address)
            .ok_or_else(|| BleError::DeviceUnavailable(address.to_string()))
    }
}

#[async_trait]
impl BleCentral for BtleCentral {
    async fn scan(&self, duration: Duration) -> Result<Vec<DeviceDescriptor>, BleError> {
        tracing::debug!("Scanning for {:?}", duration);

        self.adapter
            .start_scan(ScanFilter::default())
            .await
            .map_err(|e| BleError::ScanError(e.to_string()))?;
        tokio::time::sleep(duration).await;
        if let Err(e) = self.adapter.stop_scan().await {
            tracing::debug!("Failed to stop scan: {}", e);
        }

        let peripherals = self
            .adapter
            .peripherals()
            .await
            .map_err(|e| BleError::ScanError(e.to_string()))?;

        let mut devices = Vec::with_capacity(peripherals.len());
        for peripheral in peripherals {
            let name = match peripheral.properties().await {
                Ok(props) => props.and_then(|p| p.local_name),
                Err(e) => {
                    tracing::debug!("Skipping properties of {}: {}", peripheral.id(), e);
                    None
                }
            };
            devices.push(DeviceDescriptor {
                name,
                address: peripheral.id().to_string(),
            });
        }

        tracing::debug!("Scan saw {} device(s)", devices.len());
        Ok(devices)
    }

    async fn connect(
        &self,
        device: &DeviceDescriptor,
    ) -> Result<Box<dyn BleConnection>, BleError> {
        let peripheral = self.find_peripheral(&device.address).await?;

        peripheral
            .connect()
            .await
            .map_err(|e| BleError::ConnectionError(e.to_string()))?;

        let connection = BtleConnection {
            adapter: self.adapter.clone(),
            peripheral,
            forwarder: None,
            connected: true,
        };

        // Services must be discovered before characteristics are visible.
        connection
            .peripheral
            .discover_services()
            .await
            .map_err(|e| BleError::GattError(e.to_string()))?;

        tracing::debug!("Connected and services discovered: {}", device);
        Ok(Box::new(connection))
    }
}

/// Open btleplug link. Disconnects on drop if still connected.
pub struct BtleConnection {
    adapter: Adapter,
    peripheral: Peripheral,
    forwarder: Option<JoinHandle<()>>,
    connected: bool,
}

impl BtleConnection {
    fn find_characteristic(&self, uuid: Uuid) -> Result<Characteristic, BleError> {
        self.peripheral
            .characteristics()
            .into_iter()
            .find(|c| c.uuid == uuid)
            .ok_or(BleError::CharacteristicNotFound(uuid))
    }

    /// Forward matching notifications until the stream ends, the peer
    /// disconnects, or the receiver is dropped.
    fn spawn_forwarder(
        &self,
        characteristic: Uuid,
        mut notifications: impl futures::Stream<Item = btleplug::api::ValueNotification>
        + Send
        + Unpin
        + 'static,
        tx: mpsc::UnboundedSender<Vec<u8>>,
    ) -> JoinHandle<()> {
        let adapter = self.adapter.clone();
        let peripheral_id = self.peripheral.id();

        tokio::spawn(async move {
            let mut events = match adapter.events().await {
                Ok(events) => Some(events),
                Err(e) => {
                    tracing::warn!("Could not watch adapter events: {}", e);
                    None
                }
            };

            loop {
                tokio::select! {
                    notification = notifications.next() => match notification {
                        Some(n) if n.uuid == characteristic => {
                            if tx.send(n.value).is_err() {
                                break;
                            }
                        }
                        Some(_) => {}
                        None => break,
                    },
                    Some(event) = async {
                        match events.as_mut() {
                            Some(events) => events.next().await,
                            None => std::future::pending().await,
                        }
                    } => {
                        if let CentralEvent::DeviceDisconnected(id) = event {
                            if id == peripheral_id {
                                tracing::info!("Peripheral {:?} disconnected", id);
                                break;
                            }
                        }
                    }
                }
            }
        })
    }
}

#[async_trait]
impl BleConnection for BtleConnection {
    async fn subscribe(
        &mut self,
        characteristic: Uuid,
    ) -> Result<mpsc::UnboundedReceiver<Vec<u8>>, BleError> {
        let target = self.find_characteristic(characteristic)?;

        // Take the stream before subscribing so the first payloads are kept.
        let notifications = self
            .peripheral
            .notifications()
            .await
            .map_err(|e| BleError::GattError(e.to_string()))?;

        self.peripheral
            .subscribe(&target)
            .await
            .map_err(|e| BleError::GattError(e.to_string()))?;

        let (tx, rx) = mpsc::unbounded_channel();
        self.forwarder = Some(self.spawn_forwarder(characteristic, notifications, tx));

        tracing::debug!("Subscribed to {}", characteristic);
        Ok(rx)
    }

    async fn unsubscribe(&mut self, characteristic: Uuid) -> Result<(), BleError> {
        let target = self.find_characteristic(characteristic)?;

        self.peripheral
            .unsubscribe(&target)
            .await
            .map_err(|e| BleError::GattError(e.to_string()))
    }

    async fn disconnect(&mut self) -> Result<(), BleError> {
        if let Some(forwarder) = self.forwarder.take() {
            forwarder.abort();
        }

        if !self.connected {
            return Ok(());
        }
        self.connected = false;

        self.peripheral
            .disconnect()
            .await
            .map_err(|e| BleError::ConnectionError(e.to_string()))
    }
}

impl Drop for BtleConnection {
    fn drop(&mut self) {
        if let Some(forwarder) = self.forwarder.take() {
            forwarder.abort();
        }

        if !self.connected {
            return;
        }

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!("Dropping BLE connection outside a runtime; link left open");
            return;
        };

        let peripheral = self.peripheral.clone();
        runtime.spawn(async move {
            if let Err(e) = peripheral.disconnect().await {
                tracing::warn!("Failed to disconnect dropped link: {}", e);
            }
        });
    }
}
