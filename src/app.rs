use crate::audio::AudioSink;
use crate::ble::{BleCentral, BleError};
use crate::config::Config;
use crate::discovery;
use crate::messages::{Progress, RecorderCommand, SessionEnd};
use crate::persistence::{self, Persisted};
use crate::report::Reporter;
use crate::services::Recorder;

use anyhow::{Context, Result};
use std::path::PathBuf;
use tokio::sync::mpsc;

/// How a run ended, when it ended without an error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    DeviceNotFound,
    Cancelled { discarded: usize },
    Saved(PathBuf),
    NoData,
}

/// Discovery, one session, persistence
pub struct App {
    config: Config,
    central: Box<dyn BleCentral>,
    sink: Box<dyn AudioSink>,
}

impl App {
    pub fn new(config: Config, central: Box<dyn BleCentral>) -> Self {
        let sink = persistence::sink_for(&config);
        Self {
            config,
            central,
            sink,
        }
    }

    pub async fn run(
        &self,
        cmd_rx: mpsc::Receiver<RecorderCommand>,
        reporter: &mut dyn Reporter,
    ) -> Result<RunOutcome> {
        tracing::info!(
            "Looking for '{}' (service {}, characteristic {})",
            self.config.device_name_filter,
            self.config.service_uuid,
            self.config.characteristic_uuid
        );

        let Some(device) = discovery::discover(
            self.central.as_ref(),
            &self.config.device_name_filter,
            self.config.scan_duration(),
            reporter,
        )
        .await?
        else {
            reporter.report(Progress::DeviceNotFound);
            return Ok(RunOutcome::DeviceNotFound);
        };

        let recorder = Recorder::new(
            self.config.characteristic_uuid,
            self.config.listen_duration(),
            cmd_rx,
        );
        let recording = recorder
            .record(self.central.as_ref(), &device, reporter)
            .await?;

        match recording.end {
            SessionEnd::Elapsed => {}
            SessionEnd::Cancelled => {
                let discarded = recording.buffer.len();
                if recording.buffer.is_empty() {
                    tracing::info!("Session cancelled");
                } else {
                    tracing::warn!("Session cancelled, discarding {} bytes", discarded);
                }
                return Ok(RunOutcome::Cancelled { discarded });
            }
            SessionEnd::PeerDisconnected => {
                return Err(BleError::Disconnected).with_context(|| {
                    format!(
                        "{} dropped the link after {} bytes",
                        device,
                        recording.buffer.len()
                    )
                });
            }
        }

        let persisted = persistence::persist(
            recording.buffer.into_bytes(),
            &self.config.output_path,
            self.sink.as_ref(),
            reporter,
        )
        .await?;

        Ok(match persisted {
            Persisted::Saved(path) => RunOutcome::Saved(path),
            Persisted::NoData => RunOutcome::NoData,
        })
    }
}
