use crate::audio::AudioBuffer;
use crate::ble::{BleCentral, BleConnection, DeviceDescriptor};
use crate::messages::{Progress, RecorderCommand, SessionEnd};
use crate::report::Reporter;
use anyhow::{Context, Result};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;
use uuid::Uuid;

/// A finished listening window and everything received during it
#[derive(Debug)]
pub struct Recording {
    pub end: SessionEnd,
    pub buffer: AudioBuffer,
}

/// Runs one notification session against a single peripheral
///
/// This service:
/// - Connects to the selected device and subscribes to one characteristic
/// - Appends every notification payload to its buffer, in delivery order
/// - Stops at the deadline, on a Stop command, or when the link drops
/// - Unsubscribes and disconnects before returning, on every path
pub struct Recorder {
    characteristic: Uuid,
    listen: Duration,
    cmd_rx: mpsc::Receiver<RecorderCommand>,
    buffer: AudioBuffer,
}

impl Recorder {
    pub fn new(
        characteristic: Uuid,
        listen: Duration,
        cmd_rx: mpsc::Receiver<RecorderCommand>,
    ) -> Self {
        Self {
            characteristic,
            listen,
            cmd_rx,
            buffer: AudioBuffer::new(),
        }
    }

    pub async fn record(
        mut self,
        central: &dyn BleCentral,
        device: &DeviceDescriptor,
        reporter: &mut dyn Reporter,
    ) -> Result<Recording> {
        // A stop requested during discovery skips the connection entirely.
        if let Ok(RecorderCommand::Stop) = self.cmd_rx.try_recv() {
            tracing::info!("Stop requested before connecting");
            return Ok(Recording {
                end: SessionEnd::Cancelled,
                buffer: self.buffer,
            });
        }

        let mut connection = central
            .connect(device)
            .await
            .with_context(|| format!("Failed to connect to {}", device))?;

        reporter.report(Progress::Connected {
            name: device.display_name().to_string(),
        });

        let session = self.run_session(connection.as_mut(), reporter).await;

        if let Err(e) = connection.disconnect().await {
            tracing::warn!("Failed to disconnect from {}: {}", device, e);
        }

        let end = session?;
        tracing::info!(
            "Session ended ({:?}) with {} bytes buffered",
            end,
            self.buffer.len()
        );

        Ok(Recording {
            end,
            buffer: self.buffer,
        })
    }

    async fn run_session(
        &mut self,
        connection: &mut dyn BleConnection,
        reporter: &mut dyn Reporter,
    ) -> Result<SessionEnd> {
        let notifications = connection
            .subscribe(self.characteristic)
            .await
            .with_context(|| format!("Failed to subscribe to {}", self.characteristic))?;
        tracing::info!(
            "Listening on {} for {:?}",
            self.characteristic,
            self.listen
        );

        let deadline = Instant::now() + self.listen;
        let end = self.listen(notifications, deadline, reporter).await;

        if let Err(e) = connection.unsubscribe(self.characteristic).await {
            tracing::warn!("Failed to unsubscribe from {}: {}", self.characteristic, e);
        }

        Ok(end)
    }

    async fn listen(
        &mut self,
        mut notifications: mpsc::UnboundedReceiver<Vec<u8>>,
        deadline: Instant,
        reporter: &mut dyn Reporter,
    ) -> SessionEnd {
        let deadline = tokio::time::sleep_until(deadline);
        tokio::pin!(deadline);
        let mut commands_open = true;

        loop {
            tokio::select! {
                biased;

                // Handle commands from the operator
                cmd = self.cmd_rx.recv(), if commands_open => match cmd {
                    Some(RecorderCommand::Stop) => return SessionEnd::Cancelled,
                    None => commands_open = false,
                },

                _ = &mut deadline => {
                    // Keep payloads the transport delivered before the window closed
                    while let Ok(payload) = notifications.try_recv() {
                        self.push_payload(payload, reporter);
                    }
                    return SessionEnd::Elapsed;
                }

                payload = notifications.recv() => match payload {
                    Some(payload) => self.push_payload(payload, reporter),
                    None => return SessionEnd::PeerDisconnected,
                },
            }
        }
    }

    fn push_payload(&mut self, payload: Vec<u8>, reporter: &mut dyn Reporter) {
        reporter.report(Progress::Received(payload.len()));
        // Vec is moved, no copy
        self.buffer.append(payload);
    }
}

/// Handle for communicating with the Recorder
#[derive(Clone)]
pub struct RecorderHandle {
    tx: mpsc::Sender<RecorderCommand>,
}

impl RecorderHandle {
    pub fn new(tx: mpsc::Sender<RecorderCommand>) -> Self {
        Self { tx }
    }

    pub async fn stop(&self) -> Result<()> {
        self.tx
            .send(RecorderCommand::Stop)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to send stop command: {}", e))
    }
}
