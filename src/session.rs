//! One mirroring session: enumerate, select, mirror, close.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::camera::{self, CameraError, CaptureBackend, DeviceDescriptor};
use crate::dialogs::Prompter;
use crate::display::{DisplayError, RenderStats};
use crate::pipeline::{self, FramePipeline, PipelineSettings};

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Enumerating,
    Selecting,
    Mirroring,
    Closed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Idle => "idle",
            SessionState::Enumerating => "enumerating",
            SessionState::Selecting => "selecting",
            SessionState::Mirroring => "mirroring",
            SessionState::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// How a session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Mirrored until the window was closed
    Closed(RenderStats),
    /// The user declined to start or cancelled the selection
    Declined,
    /// Enumeration found no cameras
    NoDevices,
    /// The selected camera could not be opened
    OpenFailed(u32),
}

/// Errors that end a session without a dialog.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Display failed while mirroring: {0}")]
    Display(#[from] DisplayError),
}

/// Session-level settings.
#[derive(Debug, Clone, Copy)]
pub struct SessionSettings {
    /// Device indices `0..probe_count` are probed
    pub probe_count: u32,
    pub pipeline: PipelineSettings,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            probe_count: camera::DEFAULT_PROBE_COUNT,
            pipeline: PipelineSettings::default(),
        }
    }
}

/// Pick the device to mirror.
///
/// One device: ask for confirmation. Several: require an explicit choice.
/// `None` when the user declines or cancels, or when `devices` is empty.
pub fn select_device<'d>(
    devices: &'d [DeviceDescriptor],
    prompter: &dyn Prompter,
) -> Option<&'d DeviceDescriptor> {
    match devices {
        [] => None,
        [only] => {
            let message = format!("{} detected.\n\nStart mirroring?", only.display_name);
            prompter
                .confirm("Start Mirroring", &message)
                .then_some(only)
        }
        many => {
            let labels: Vec<String> = many.iter().map(|d| d.display_name.clone()).collect();
            let choice = prompter.choose(
                "Select Video Input",
                "Select a Video Input to mirror:",
                &labels,
            )?;
            many.get(choice)
        }
    }
}

/// Owns everything a mirroring run touches: the running flag, the selected
/// device and the pipeline holding the capture handle.
pub struct Session<P> {
    backend: Arc<dyn CaptureBackend>,
    prompter: P,
    settings: SessionSettings,
    running: Arc<AtomicBool>,
    state: SessionState,
    selected: Option<DeviceDescriptor>,
    pipeline: Option<Box<dyn FramePipeline>>,
}

impl<P: Prompter> Session<P> {
    pub fn new(backend: Arc<dyn CaptureBackend>, prompter: P, settings: SessionSettings) -> Self {
        Self {
            backend,
            prompter,
            settings,
            running: Arc::new(AtomicBool::new(false)),
            state: SessionState::Idle,
            selected: None,
            pipeline: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn selected(&self) -> Option<&DeviceDescriptor> {
        self.selected.as_ref()
    }

    pub fn prompter(&self) -> &P {
        &self.prompter
    }

    /// Flag observed by the render loop and the capture thread. Clearing it
    /// from elsewhere (a signal handler) ends mirroring like a window close.
    pub fn running_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    fn transition(&mut self, next: SessionState) {
        log::debug!("Session {} -> {}", self.state, next);
        self.state = next;
    }

    /// Run the session to completion.
    ///
    /// `mirror` is called once the pipeline is running; it opens the display
    /// and drives the render loop until the user closes it. It is not called
    /// at all when there is nothing to mirror, so no window is ever opened
    /// for a session that ends early.
    pub fn run<F>(&mut self, mirror: F) -> Result<Outcome, SessionError>
    where
        F: FnOnce(&mut dyn FramePipeline, &AtomicBool) -> Result<RenderStats, DisplayError>,
    {
        self.transition(SessionState::Enumerating);
        let devices = camera::list_devices(self.backend.as_ref(), self.settings.probe_count);

        if devices.is_empty() {
            self.prompter.error("Error", "No cameras detected!");
            self.transition(SessionState::Closed);
            return Ok(Outcome::NoDevices);
        }

        self.transition(SessionState::Selecting);
        let Some(device) = select_device(&devices, &self.prompter).cloned() else {
            log::info!("No camera selected");
            self.transition(SessionState::Closed);
            return Ok(Outcome::Declined);
        };

        if let Err(e) = self.start(&device) {
            log::error!("{}", e);
            self.prompter
                .error("Error", &format!("Could not open camera {}", device.index));
            self.close();
            return Ok(Outcome::OpenFailed(device.index));
        }

        let result = match self.pipeline.as_mut() {
            Some(pipeline) => mirror(pipeline.as_mut(), self.running.as_ref()),
            None => Ok(RenderStats::default()),
        };
        self.close();

        let stats = result?;
        log::info!(
            "Mirrored {} frames over {} ticks ({} without a new frame)",
            stats.frames,
            stats.ticks,
            stats.empty_ticks
        );
        Ok(Outcome::Closed(stats))
    }

    fn start(&mut self, device: &DeviceDescriptor) -> Result<(), CameraError> {
        self.selected = Some(device.clone());
        self.running.store(true, Ordering::Release);

        let pipeline = pipeline::start(
            Arc::clone(&self.backend),
            device.index,
            &self.settings.pipeline,
            Arc::clone(&self.running),
        )?;
        self.pipeline = Some(pipeline);
        self.transition(SessionState::Mirroring);
        Ok(())
    }

    /// Stop mirroring: clear the running flag, then release the capture
    /// handle. Only the first call has any effect.
    pub fn close(&mut self) {
        if self.state == SessionState::Closed {
            return;
        }
        self.running.store(false, Ordering::Release);
        if let Some(mut pipeline) = self.pipeline.take() {
            pipeline.shutdown();
        }
        self.transition(SessionState::Closed);
    }
}

impl<P> Drop for Session<P> {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Release);
        if let Some(mut pipeline) = self.pipeline.take() {
            pipeline.shutdown();
        }
    }
}
