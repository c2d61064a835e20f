//! Frame pipeline from capture source to display.
//!
//! Two variants share the [`FramePipeline`] interface that the render loop
//! drives once per tick:
//! - [`SyncPipeline`] reads, mirrors, converts and scales on the render thread
//! - [`ThreadedPipeline`] reads on a [`CaptureWorker`] thread and hands frames
//!   over through a [`FrameSlot`]

mod held;
mod slot;
mod sync;
mod threaded;
mod ticker;

pub use slot::FrameSlot;
pub use sync::SyncPipeline;
pub use threaded::{configure, CaptureWorker, ThreadedPipeline, WorkerConfig};
pub use ticker::Ticker;

use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

use crate::camera::{CameraError, CaptureBackend, CaptureRequest, Frame, Resolution};

/// Which pipeline to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Variant {
    /// Capture on the render tick (10 ms)
    #[default]
    Synchronous,
    /// Capture thread plus latest-frame slot (5 ms render tick, 4K/60 request)
    Threaded,
}

impl Variant {
    /// Whether frames are mirrored when the config does not say.
    ///
    /// The threaded variant has never mirrored; that is kept as observed
    /// behavior rather than changed silently.
    pub fn mirrors_by_default(self) -> bool {
        matches!(self, Variant::Synchronous)
    }
}

impl std::fmt::Display for Variant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Variant::Synchronous => write!(f, "synchronous"),
            Variant::Threaded => write!(f, "threaded"),
        }
    }
}

/// One step of the render loop's work, plus teardown.
pub trait FramePipeline {
    fn variant(&self) -> Variant;

    /// Period of the render tick that drives this pipeline.
    fn tick_interval(&self) -> Duration;

    /// Produce the next frame to present, already in display channel order
    /// and scaled to fit `bounds`. `None` means nothing new this tick.
    fn next_frame(&mut self, bounds: Resolution) -> Option<Frame>;

    /// Stop capturing and release the device. Safe to call repeatedly; the
    /// device is released only the first time.
    fn shutdown(&mut self);
}

/// Everything needed to start a pipeline on a selected device.
#[derive(Debug, Clone, Copy)]
pub struct PipelineSettings {
    pub variant: Variant,
    /// Overrides [`Variant::mirrors_by_default`] when set
    pub mirror: Option<bool>,
    pub sync_interval: Duration,
    pub threaded_interval: Duration,
    /// Applied by the threaded variant only
    pub request: CaptureRequest,
    pub join_timeout: Duration,
}

impl PipelineSettings {
    pub fn mirror(&self) -> bool {
        self.mirror
            .unwrap_or_else(|| self.variant.mirrors_by_default())
    }
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            variant: Variant::default(),
            mirror: None,
            sync_interval: Duration::from_millis(10),
            threaded_interval: Duration::from_millis(5),
            request: CaptureRequest::default(),
            join_timeout: Duration::from_millis(500),
        }
    }
}

/// Open device `index` and start the configured pipeline on it.
///
/// The threaded variant observes `running` on its capture thread; the
/// caller must set it before calling this.
pub fn start(
    backend: Arc<dyn CaptureBackend>,
    index: u32,
    settings: &PipelineSettings,
    running: Arc<AtomicBool>,
) -> Result<Box<dyn FramePipeline>, CameraError> {
    log::info!(
        "Starting {} pipeline on camera {} (mirror: {})",
        settings.variant,
        index,
        settings.mirror()
    );

    match settings.variant {
        Variant::Synchronous => {
            let mut source = backend.open(index)?;
            if !source.is_open() {
                source.release();
                return Err(CameraError::OpenFailed {
                    index,
                    reason: "device did not open".to_string(),
                });
            }
            Ok(Box::new(SyncPipeline::new(
                source,
                settings.mirror(),
                settings.sync_interval,
            )))
        }
        Variant::Threaded => {
            let config = WorkerConfig {
                request: settings.request,
                mirror: settings.mirror(),
                join_timeout: settings.join_timeout,
            };
            let worker = CaptureWorker::start(backend, index, config, running)?;
            Ok(Box::new(ThreadedPipeline::new(
                worker,
                settings.threaded_interval,
            )))
        }
    }
}
