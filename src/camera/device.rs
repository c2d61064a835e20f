//! Camera device enumeration.

use super::source::CaptureBackend;
use super::types::{DeviceDescriptor, Resolution};

/// Number of device indices probed by default.
pub const DEFAULT_PROBE_COUNT: u32 = 6;

/// Probe device indices `0..probe_count` and list the ones that open.
///
/// Each device is opened, asked for one frame to confirm it is live and to
/// learn its native resolution, then released before the next index is
/// tried. A device that fails to open is treated as absent; there are no
/// retries. The result is in ascending index order and may be empty.
pub fn list_devices(backend: &dyn CaptureBackend, probe_count: u32) -> Vec<DeviceDescriptor> {
    let mut devices = Vec::new();

    for index in 0..probe_count {
        let mut source = match backend.open(index) {
            Ok(source) => source,
            Err(e) => {
                log::debug!("No camera at index {}: {}", index, e);
                continue;
            }
        };

        if !source.is_open() {
            source.release();
            continue;
        }

        let resolution = source
            .read()
            .map(|frame| Resolution::new(frame.width, frame.height));
        source.release();

        let device = DeviceDescriptor::new(index, resolution);
        log::info!("Found {}", device);
        devices.push(device);
    }

    devices
}
