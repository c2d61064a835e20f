//! Single-threaded pipeline: capture, transform and render all happen on the
//! render loop's tick.

use std::time::Duration;

use super::held::HeldFrame;
use super::{FramePipeline, Variant};
use crate::camera::frame_utils::{mirror_horizontal, to_display_order};
use crate::camera::{CaptureSource, Frame, Resolution};

/// Reads one frame per tick on the calling thread.
///
/// A slow device read stalls the tick, and therefore the window, for as long
/// as the read takes.
pub struct SyncPipeline {
    source: Option<Box<dyn CaptureSource>>,
    mirror: bool,
    interval: Duration,
    held: HeldFrame,
}

impl SyncPipeline {
    pub fn new(source: Box<dyn CaptureSource>, mirror: bool, interval: Duration) -> Self {
        Self {
            source: Some(source),
            mirror,
            interval,
            held: HeldFrame::default(),
        }
    }
}

impl FramePipeline for SyncPipeline {
    fn variant(&self) -> Variant {
        Variant::Synchronous
    }

    fn tick_interval(&self) -> Duration {
        self.interval
    }

    fn next_frame(&mut self, bounds: Resolution) -> Option<Frame> {
        // a failed read keeps the last frame up, refitted if the window changed
        let Some(mut frame) = self.source.as_mut()?.read() else {
            return self.held.refit(bounds);
        };
        if self.mirror {
            mirror_horizontal(&mut frame);
        }
        to_display_order(&mut frame);
        Some(self.held.replace(frame, bounds))
    }

    fn shutdown(&mut self) {
        self.held.clear();
        if let Some(mut source) = self.source.take() {
            source.release();
            log::debug!("Capture source released");
        }
    }
}

impl Drop for SyncPipeline {
    fn drop(&mut self) {
        self.shutdown();
    }
}
