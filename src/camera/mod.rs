//! Camera access: device enumeration, the capture backend seam and frame
//! transforms.
//!
//! - Device enumeration via [`list_devices`]
//! - Capture through [`CaptureBackend`] / [`CaptureSource`], with
//!   [`NativeBackend`] for real hardware
//! - Mirror, channel reorder and scale-to-fit in [`frame_utils`]

mod device;
pub mod frame_utils;
pub mod native;
mod source;
mod types;

pub use device::{list_devices, DEFAULT_PROBE_COUNT};
pub use native::NativeBackend;
pub use source::{CaptureBackend, CaptureSource};
pub use types::{
    CameraError, CaptureProperty, CaptureRequest, ChannelOrder, DeviceDescriptor, Frame,
    NegotiatedFormat, Resolution,
};
