//! Subcommand handlers.

use crate::camera::{self, CaptureBackend, DeviceDescriptor};
use crate::config::Config;

/// Lines printed by `list-devices`.
pub fn describe_devices(devices: &[DeviceDescriptor]) -> Vec<String> {
    if devices.is_empty() {
        return vec![
            "No cameras found.".to_string(),
            String::new(),
            "Make sure your camera is connected and permissions are granted.".to_string(),
            "On macOS, grant access in System Settings > Privacy & Security > Camera.".to_string(),
        ];
    }
    let mut lines = vec!["Available video inputs:".to_string()];
    lines.extend(devices.iter().map(|d| format!("  {}", d)));
    lines
}

/// Probe video inputs and print them to stdout.
pub fn list_devices(backend: &dyn CaptureBackend, config: &Config) {
    let devices = camera::list_devices(backend, config.camera.probe_count);
    for line in describe_devices(&devices) {
        println!("{}", line);
    }
}
