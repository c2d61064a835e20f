//! Producer/consumer pipeline: a capture thread fills the latest-frame slot,
//! the render loop copies out of it on its own tick.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use super::held::HeldFrame;
use super::slot::FrameSlot;
use super::{FramePipeline, Variant};
use crate::camera::frame_utils::{mirror_horizontal, to_display_order};
use crate::camera::{
    CameraError, CaptureBackend, CaptureProperty, CaptureRequest, CaptureSource, Frame,
    NegotiatedFormat, Resolution,
};

/// Back-off after a failed read so a dead device does not spin a core.
const READ_RETRY_DELAY: Duration = Duration::from_millis(1);

/// Settings for the capture thread.
#[derive(Debug, Clone, Copy)]
pub struct WorkerConfig {
    pub request: CaptureRequest,
    pub mirror: bool,
    /// How long [`CaptureWorker::stop`] waits for the thread before detaching it
    pub join_timeout: Duration,
}

/// Background capture thread handle.
///
/// The device is opened, configured and read on the capture thread and
/// released there when the loop ends, so the handle never crosses threads.
/// The loop runs while the shared `running` flag is set and publishes every
/// frame into a [`FrameSlot`].
pub struct CaptureWorker {
    slot: Arc<FrameSlot>,
    running: Arc<AtomicBool>,
    /// Capture thread handle
    thread: Option<JoinHandle<()>>,
    /// Disconnects when the capture thread exits, however it exits
    exited: Option<Receiver<()>>,
    negotiated: NegotiatedFormat,
    join_timeout: Duration,
}

impl std::fmt::Debug for CaptureWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureWorker")
            .field("negotiated", &self.negotiated)
            .field("is_running", &self.is_running())
            .finish_non_exhaustive()
    }
}

impl CaptureWorker {
    /// Spawn the capture thread for device `index` and wait until it has
    /// either opened and configured the device or failed to.
    ///
    /// # Errors
    /// * `CameraError::OpenFailed` / `PermissionDenied` - the device did not open
    /// * `CameraError::StreamFailed` - the capture thread died before reporting
    pub fn start(
        backend: Arc<dyn CaptureBackend>,
        index: u32,
        config: WorkerConfig,
        running: Arc<AtomicBool>,
    ) -> Result<Self, CameraError> {
        let slot = Arc::new(FrameSlot::new());
        let (info_tx, info_rx) = mpsc::channel::<Result<NegotiatedFormat, CameraError>>();
        let (exited_tx, exited_rx) = mpsc::channel::<()>();

        let thread_slot = Arc::clone(&slot);
        let thread_running = Arc::clone(&running);
        let handle = thread::Builder::new()
            .name(format!("capture-{}", index))
            .spawn(move || {
                let _exited = exited_tx;
                run_capture_loop(
                    backend.as_ref(),
                    index,
                    config,
                    &thread_slot,
                    &thread_running,
                    info_tx,
                );
            })
            .map_err(|e| CameraError::StreamFailed(e.to_string()))?;

        let mut worker = Self {
            slot,
            running,
            thread: Some(handle),
            exited: Some(exited_rx),
            negotiated: NegotiatedFormat::default(),
            join_timeout: config.join_timeout,
        };

        // Wait for the thread to report success or failure
        match info_rx.recv() {
            Ok(Ok(negotiated)) => {
                log::info!(
                    "Camera {} negotiated {} (requested {} @ {} fps, buffer {})",
                    index,
                    negotiated,
                    config.request.resolution,
                    config.request.fps,
                    config.request.buffer_size
                );
                worker.negotiated = negotiated;
                Ok(worker)
            }
            Ok(Err(e)) => {
                worker.join();
                Err(e)
            }
            Err(_) => {
                worker.join();
                Err(CameraError::StreamFailed(
                    "Capture thread terminated unexpectedly".to_string(),
                ))
            }
        }
    }

    /// Format the device reported after the capture request was applied.
    pub fn negotiated(&self) -> NegotiatedFormat {
        self.negotiated
    }

    pub fn slot(&self) -> &Arc<FrameSlot> {
        &self.slot
    }

    /// Check if the capture thread is currently running.
    pub fn is_running(&self) -> bool {
        self.thread.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Clear the running flag and wait up to the join timeout for the
    /// capture thread to finish.
    ///
    /// Returns `true` if the thread was joined (or had already been). A
    /// thread still stuck in a device read after the timeout is detached; it
    /// exits on its own once the read returns.
    pub fn stop(&mut self) -> bool {
        self.running.store(false, Ordering::Release);
        self.join()
    }

    fn join(&mut self) -> bool {
        let Some(handle) = self.thread.take() else {
            return true;
        };

        let finished = match self.exited.take() {
            Some(exited) => !matches!(
                exited.recv_timeout(self.join_timeout),
                Err(RecvTimeoutError::Timeout)
            ),
            None => true,
        };

        if !finished {
            log::warn!(
                "Capture thread did not stop within {:?}, detaching it",
                self.join_timeout
            );
            return false;
        }

        if handle.join().is_err() {
            log::warn!("Capture thread panicked");
        }
        true
    }
}

impl Drop for CaptureWorker {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Body of the capture thread.
fn run_capture_loop(
    backend: &dyn CaptureBackend,
    index: u32,
    config: WorkerConfig,
    slot: &FrameSlot,
    running: &AtomicBool,
    info_tx: Sender<Result<NegotiatedFormat, CameraError>>,
) {
    let mut source = match backend.open_with(index, &config.request) {
        Ok(source) => source,
        Err(e) => {
            let _ = info_tx.send(Err(e));
            return;
        }
    };

    if !source.is_open() {
        source.release();
        let _ = info_tx.send(Err(CameraError::OpenFailed {
            index,
            reason: "device did not open".to_string(),
        }));
        return;
    }

    let negotiated = configure(source.as_mut(), &config.request);
    let _ = info_tx.send(Ok(negotiated));

    // No backpressure: publish as fast as the device delivers
    while running.load(Ordering::Acquire) {
        let Some(mut frame) = source.read() else {
            thread::sleep(READ_RETRY_DELAY);
            continue;
        };
        if config.mirror {
            mirror_horizontal(&mut frame);
        }
        to_display_order(&mut frame);
        slot.publish(frame);
    }

    source.release();
    log::debug!("Capture thread for camera {} stopped", index);
}

/// Apply what is left of a capture request to an open source and read back
/// the format it ended up with.
///
/// Resolution and frame rate were already negotiated when the source was
/// opened with [`CaptureBackend::open_with`]; only the buffer size can still
/// be requested on a running stream. A refusal is logged and otherwise
/// ignored.
pub fn configure(source: &mut dyn CaptureSource, request: &CaptureRequest) -> NegotiatedFormat {
    if !source.set(CaptureProperty::BufferSize, request.buffer_size) {
        log::debug!(
            "Camera ignored request {:?} = {}",
            CaptureProperty::BufferSize,
            request.buffer_size
        );
    }

    NegotiatedFormat {
        width: source.get(CaptureProperty::FrameWidth),
        height: source.get(CaptureProperty::FrameHeight),
        fps: source.get(CaptureProperty::Fps),
    }
}

/// Render side of the threaded pipeline.
pub struct ThreadedPipeline {
    worker: CaptureWorker,
    interval: Duration,
    /// Sequence number of the last frame handed to the display
    seen: u64,
    held: HeldFrame,
}

impl ThreadedPipeline {
    pub fn new(worker: CaptureWorker, interval: Duration) -> Self {
        Self {
            worker,
            interval,
            seen: 0,
            held: HeldFrame::default(),
        }
    }

    pub fn worker(&self) -> &CaptureWorker {
        &self.worker
    }
}

impl FramePipeline for ThreadedPipeline {
    fn variant(&self) -> Variant {
        Variant::Threaded
    }

    fn tick_interval(&self) -> Duration {
        self.interval
    }

    fn next_frame(&mut self, bounds: Resolution) -> Option<Frame> {
        // nothing new since the last tick: keep the last frame up, refitted
        // if the window changed
        let Some((sequence, frame)) = self.worker.slot().newer_than(self.seen) else {
            return self.held.refit(bounds);
        };
        self.seen = sequence;
        Some(self.held.replace(frame, bounds))
    }

    fn shutdown(&mut self) {
        self.worker.stop();
        self.held.clear();
    }
}
