//! Last frame shown, kept unscaled so it can be refitted when the window
//! changes size while the camera delivers nothing new.

use crate::camera::frame_utils::fit_to_bounds;
use crate::camera::{Frame, Resolution};

#[derive(Debug, Default)]
pub(crate) struct HeldFrame {
    /// Display-ready frame before scaling
    frame: Option<Frame>,
    /// Bounds the frame was last fitted to
    bounds: Option<Resolution>,
}

impl HeldFrame {
    /// Keep `frame` and return it fitted to `bounds`.
    pub(crate) fn replace(&mut self, frame: Frame, bounds: Resolution) -> Frame {
        let fitted = fit_to_bounds(frame.clone(), bounds);
        self.frame = Some(frame);
        self.bounds = Some(bounds);
        fitted
    }

    /// The held frame fitted to `bounds`, or `None` if nothing is held or
    /// it is already on screen at this size.
    pub(crate) fn refit(&mut self, bounds: Resolution) -> Option<Frame> {
        if self.bounds == Some(bounds) {
            return None;
        }
        let frame = self.frame.as_ref()?;
        self.bounds = Some(bounds);
        Some(fit_to_bounds(frame.clone(), bounds))
    }

    pub(crate) fn clear(&mut self) {
        self.frame = None;
        self.bounds = None;
    }
}
