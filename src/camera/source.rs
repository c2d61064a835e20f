//! Capture backend seam.
//!
//! Everything the pipeline knows about a camera goes through these two
//! traits, so the enumerator, both pipeline variants and the session can be
//! driven by a real device or by a test double.

use super::types::{CameraError, CaptureProperty, CaptureRequest, Frame};

/// Opens capture sources by device index.
///
/// Backends are shared with the capture thread, so they must be `Send + Sync`.
/// The sources they hand out need not be: a source is always used on the
/// thread that opened it.
pub trait CaptureBackend: Send + Sync {
    /// Open the device at `index` in whatever format it starts in.
    fn open(&self, index: u32) -> Result<Box<dyn CaptureSource>, CameraError>;

    /// Open the device at `index`, negotiating the closest format to
    /// `request` before the stream starts.
    ///
    /// Resolution and frame rate can only be chosen reliably at open time;
    /// most drivers refuse a format change on a running stream. Backends
    /// that cannot negotiate fall back to a plain [`open`](Self::open).
    fn open_with(
        &self,
        index: u32,
        request: &CaptureRequest,
    ) -> Result<Box<dyn CaptureSource>, CameraError> {
        let _ = request;
        self.open(index)
    }
}

/// An open capture handle.
pub trait CaptureSource {
    /// Whether the handle is still usable.
    fn is_open(&self) -> bool;

    /// Read one decoded frame. `None` means no frame this time.
    fn read(&mut self) -> Option<Frame>;

    /// Read back a property. `None` if the device does not report it.
    fn get(&self, property: CaptureProperty) -> Option<u32>;

    /// Request a property value. Returns whether the device accepted the
    /// request; callers treat `false` as informational only.
    fn set(&mut self, property: CaptureProperty, value: u32) -> bool;

    /// Release the device. Must be safe to call more than once.
    fn release(&mut self);
}
