//! Capture backend over the platform camera API (via nokhwa).

use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{
    CameraFormat, CameraIndex, FrameFormat as NokhwaFrameFormat, RequestedFormat,
    RequestedFormatType,
};
use nokhwa::Camera;

use super::source::{CaptureBackend, CaptureSource};
use super::types::{CameraError, CaptureProperty, CaptureRequest, ChannelOrder, Frame};

/// Whether this platform has a camera API nokhwa can drive.
pub fn is_available() -> bool {
    nokhwa::native_api_backend().is_some()
}

/// Ask the OS for camera access where that is required (macOS).
///
/// Elsewhere this is a no-op.
pub fn request_access() {
    #[cfg(target_os = "macos")]
    nokhwa::nokhwa_initialize(|granted| {
        if !granted {
            log::warn!("Camera access was not granted");
        }
    });
}

/// Opens cameras through the native API (V4L2, AVFoundation, Media Foundation).
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeBackend;

impl NativeBackend {
    fn open_format(
        index: u32,
        format: RequestedFormatType,
    ) -> Result<Box<dyn CaptureSource>, CameraError> {
        let requested = RequestedFormat::new::<RgbFormat>(format);
        let mut camera =
            Camera::new(CameraIndex::Index(index), requested).map_err(|e| classify(index, e))?;
        camera
            .open_stream()
            .map_err(|e| CameraError::StreamFailed(e.to_string()))?;

        log::debug!(
            "Opened camera {} ({}) at {}x{} @ {} fps",
            index,
            camera.info().human_name(),
            camera.resolution().width(),
            camera.resolution().height(),
            camera.frame_rate()
        );

        Ok(Box::new(NativeSource {
            index,
            camera: Some(camera),
        }))
    }
}

impl CaptureBackend for NativeBackend {
    fn open(&self, index: u32) -> Result<Box<dyn CaptureSource>, CameraError> {
        Self::open_format(index, RequestedFormatType::None)
    }

    /// Tries the closest MJPEG format, then the closest NV12 format, then
    /// whatever gives the highest resolution.
    fn open_with(
        &self,
        index: u32,
        request: &CaptureRequest,
    ) -> Result<Box<dyn CaptureSource>, CameraError> {
        let resolution =
            nokhwa::utils::Resolution::new(request.resolution.width, request.resolution.height);
        let attempts = [
            RequestedFormatType::Closest(CameraFormat::new(
                resolution,
                NokhwaFrameFormat::MJPEG,
                request.fps,
            )),
            RequestedFormatType::Closest(CameraFormat::new(
                resolution,
                NokhwaFrameFormat::NV12,
                request.fps,
            )),
            RequestedFormatType::AbsoluteHighestResolution,
        ];

        let mut last_error = None;
        for format in attempts {
            match Self::open_format(index, format) {
                Ok(source) => return Ok(source),
                Err(CameraError::PermissionDenied) => return Err(CameraError::PermissionDenied),
                Err(e) => {
                    log::debug!("Camera {} rejected {:?}: {}", index, format, e);
                    last_error = Some(e);
                }
            }
        }
        Err(last_error.unwrap_or_else(|| CameraError::OpenFailed {
            index,
            reason: "no usable format".to_string(),
        }))
    }
}

/// An open nokhwa camera with a running stream.
pub struct NativeSource {
    index: u32,
    camera: Option<Camera>,
}

impl NativeSource {
    fn set_resolution(camera: &mut Camera, width: u32, height: u32) -> bool {
        camera
            .set_resolution(nokhwa::utils::Resolution::new(width, height))
            .is_ok()
    }
}

impl CaptureSource for NativeSource {
    fn is_open(&self) -> bool {
        self.camera.as_ref().is_some_and(|c| c.is_stream_open())
    }

    fn read(&mut self) -> Option<Frame> {
        let camera = self.camera.as_mut()?;
        let buffer = camera.frame().ok()?;
        let resolution = buffer.resolution();
        // decode handles MJPEG, YUYV, NV12 and friends; a corrupt frame is just skipped
        let decoded = buffer.decode_image::<RgbFormat>().ok()?;

        Some(Frame::new(
            decoded.into_raw(),
            resolution.width(),
            resolution.height(),
            ChannelOrder::Rgb,
        ))
    }

    fn get(&self, property: CaptureProperty) -> Option<u32> {
        let camera = self.camera.as_ref()?;
        match property {
            CaptureProperty::FrameWidth => Some(camera.resolution().width()),
            CaptureProperty::FrameHeight => Some(camera.resolution().height()),
            CaptureProperty::Fps => Some(camera.frame_rate()),
            CaptureProperty::BufferSize => None,
        }
    }

    fn set(&mut self, property: CaptureProperty, value: u32) -> bool {
        let Some(camera) = self.camera.as_mut() else {
            return false;
        };
        let current = camera.resolution();
        match property {
            CaptureProperty::FrameWidth => Self::set_resolution(camera, value, current.height()),
            CaptureProperty::FrameHeight => Self::set_resolution(camera, current.width(), value),
            CaptureProperty::Fps => camera.set_frame_rate(value).is_ok(),
            // nokhwa exposes no driver queue depth
            CaptureProperty::BufferSize => false,
        }
    }

    fn release(&mut self) {
        if let Some(mut camera) = self.camera.take() {
            if let Err(e) = camera.stop_stream() {
                log::debug!("Camera {} did not stop cleanly: {}", self.index, e);
            }
        }
    }
}

impl Drop for NativeSource {
    fn drop(&mut self) {
        self.release();
    }
}

fn classify(index: u32, e: nokhwa::NokhwaError) -> CameraError {
    let msg = e.to_string().to_lowercase();
    if msg.contains("permission")
        || msg.contains("denied")
        || msg.contains("authorization")
        || msg.contains("access")
    {
        CameraError::PermissionDenied
    } else {
        CameraError::OpenFailed {
            index,
            reason: e.to_string(),
        }
    }
}
