use crate::ble::{BleCentral, DeviceDescriptor};
use crate::messages::Progress;
use crate::report::Reporter;
use anyhow::{Context, Result};
use std::time::Duration;

/// Pick the first device whose advertised name contains `filter`.
///
/// Unnamed devices never match. Scan order decides ties.
pub fn select_device(devices: Vec<DeviceDescriptor>, filter: &str) -> Option<DeviceDescriptor> {
    devices.into_iter().find(|device| {
        device
            .name
            .as_deref()
            .is_some_and(|name| name.contains(filter))
    })
}

/// Run one time-bounded scan and select the target device.
///
/// Returns `Ok(None)` when nothing matched; that is a normal outcome.
pub async fn discover(
    central: &dyn BleCentral,
    filter: &str,
    scan_duration: Duration,
    reporter: &mut dyn Reporter,
) -> Result<Option<DeviceDescriptor>> {
    reporter.report(Progress::ScanStarted);

    let devices = central
        .scan(scan_duration)
        .await
        .context("BLE scan failed")?;
    tracing::debug!("Scan returned {} device(s)", devices.len());

    let selected = select_device(devices, filter);

    if let Some(device) = &selected {
        reporter.report(Progress::DeviceFound {
            name: device.display_name().to_string(),
            address: device.address.clone(),
        });
    }

    Ok(selected)
}
