//! Camera types and data structures.

use std::fmt;

/// A camera found by the enumerator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceDescriptor {
    /// Device index for selection
    pub index: u32,
    /// Human-readable label shown in dialogs
    pub display_name: String,
    /// Native resolution, if a probe frame could be read
    pub resolution: Option<Resolution>,
}

impl DeviceDescriptor {
    /// Build a descriptor with the standard label for `index`.
    pub fn new(index: u32, resolution: Option<Resolution>) -> Self {
        let display_name = match resolution {
            Some(res) => format!("Video Input {} ({})", index, res),
            None => format!("Video Input {}", index),
        };
        Self {
            index,
            display_name,
            resolution,
        }
    }
}

impl fmt::Display for DeviceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.index, self.display_name)
    }
}

/// Frame or capture resolution in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    /// 3840x2160, requested by the threaded pipeline
    pub const UHD: Resolution = Resolution {
        width: 3840,
        height: 2160,
    };

    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Color channel order of a packed 3-byte-per-pixel frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelOrder {
    /// Blue, green, red (native order of many capture drivers)
    Bgr,
    /// Red, green, blue (display order)
    Rgb,
}

/// A captured camera frame.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Packed pixel data, rows without padding
    pub data: Vec<u8>,
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// Channel order of `data`
    pub order: ChannelOrder,
}

impl Frame {
    /// Bytes per pixel (always 3).
    pub const BYTES_PER_PIXEL: usize = 3;

    pub fn new(data: Vec<u8>, width: u32, height: u32, order: ChannelOrder) -> Self {
        Self {
            data,
            width,
            height,
            order,
        }
    }

    /// Bytes in one row of pixels.
    pub fn stride(&self) -> usize {
        self.width as usize * Self::BYTES_PER_PIXEL
    }

    pub fn resolution(&self) -> Resolution {
        Resolution::new(self.width, self.height)
    }

    /// Whether `data` holds exactly `width * height` pixels.
    pub fn is_well_formed(&self) -> bool {
        self.data.len() == self.stride() * self.height as usize
    }
}

/// Properties that can be read from or requested on a capture source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureProperty {
    FrameWidth,
    FrameHeight,
    Fps,
    /// Number of frames the driver may buffer
    BufferSize,
}

/// Capture settings requested before the threaded pipeline starts.
///
/// Every field is a request: the device may ignore any of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureRequest {
    pub resolution: Resolution,
    pub fps: u32,
    pub buffer_size: u32,
}

impl Default for CaptureRequest {
    fn default() -> Self {
        Self {
            resolution: Resolution::UHD,
            fps: 60,
            buffer_size: 1,
        }
    }
}

/// Values the device reports after a [`CaptureRequest`] was applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NegotiatedFormat {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub fps: Option<u32>,
}

impl fmt::Display for NegotiatedFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn or_unknown(v: Option<u32>) -> String {
            v.map(|v| v.to_string()).unwrap_or_else(|| "?".to_string())
        }
        write!(
            f,
            "{}x{} @ {} fps",
            or_unknown(self.width),
            or_unknown(self.height),
            or_unknown(self.fps)
        )
    }
}

/// Errors that can occur during camera operations.
#[derive(Debug)]
pub enum CameraError {
    /// Failed to open camera
    OpenFailed { index: u32, reason: String },
    /// Camera permission denied (macOS/iOS)
    PermissionDenied,
    /// Failed to start video stream
    StreamFailed(String),
}

impl fmt::Display for CameraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CameraError::OpenFailed { index, reason } => {
                write!(f, "Could not open camera {}: {}", index, reason)
            }
            CameraError::PermissionDenied => {
                write!(
                    f,
                    "Camera permission denied. On macOS, grant access in System Settings > Privacy & Security > Camera"
                )
            }
            CameraError::StreamFailed(msg) => write!(f, "Failed to start camera stream: {}", msg),
        }
    }
}

impl std::error::Error for CameraError {}
