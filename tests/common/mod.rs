//! Test doubles shared by the integration tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use video_mirror::camera::{
    CameraError, CaptureBackend, CaptureProperty, CaptureRequest, CaptureSource, ChannelOrder,
    Frame, Resolution,
};
use video_mirror::dialogs::Prompter;
use video_mirror::display::{DisplayError, DisplaySink};

/// Native size of every fake camera unless stated otherwise.
pub const FAKE_RESOLUTION: Resolution = Resolution::new(64, 48);

/// Red channel value of every generated pixel.
pub const FAKE_RED: u8 = 200;

/// BGR frame where pixel `(x, y)` is `[x, y, FAKE_RED]`.
pub fn gradient_frame(resolution: Resolution) -> Frame {
    let mut data = Vec::with_capacity(resolution.width as usize * resolution.height as usize * 3);
    for y in 0..resolution.height {
        for x in 0..resolution.width {
            data.extend_from_slice(&[x as u8, y as u8, FAKE_RED]);
        }
    }
    Frame::new(data, resolution.width, resolution.height, ChannelOrder::Bgr)
}

#[derive(Debug, Default)]
pub struct Counters {
    pub opens: AtomicUsize,
    pub releases: AtomicUsize,
    pub reads: AtomicUsize,
}

/// Backend with cameras at a fixed set of indices.
pub struct FakeBackend {
    cameras: BTreeMap<u32, Resolution>,
    read_delay: Duration,
    frame_limit: Option<usize>,
    open_limit: Option<usize>,
    counters: Arc<Counters>,
    opened: Mutex<Vec<u32>>,
    requests: Mutex<Vec<(u32, CaptureRequest)>>,
}

impl FakeBackend {
    pub fn with_cameras(indices: &[u32]) -> Self {
        Self {
            cameras: indices.iter().map(|&i| (i, FAKE_RESOLUTION)).collect(),
            read_delay: Duration::ZERO,
            frame_limit: None,
            open_limit: None,
            counters: Arc::new(Counters::default()),
            opened: Mutex::new(Vec::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Every read blocks for `delay` before returning a frame.
    pub fn with_read_delay(mut self, delay: Duration) -> Self {
        self.read_delay = delay;
        self
    }

    /// Each opened source delivers `limit` frames, then stalls.
    pub fn with_frame_limit(mut self, limit: usize) -> Self {
        self.frame_limit = Some(limit);
        self
    }

    /// Only the first `limit` opens succeed; later ones fail as if the
    /// device had been unplugged after probing.
    pub fn with_open_limit(mut self, limit: usize) -> Self {
        self.open_limit = Some(limit);
        self
    }

    pub fn counters(&self) -> Arc<Counters> {
        Arc::clone(&self.counters)
    }

    /// Indices passed to `open`, in call order, including failed opens.
    pub fn opened(&self) -> Vec<u32> {
        self.opened.lock().unwrap().clone()
    }

    /// Formats asked for through `open_with`, with their device index.
    pub fn requests(&self) -> Vec<(u32, CaptureRequest)> {
        self.requests.lock().unwrap().clone()
    }

    pub fn opens(&self) -> usize {
        self.counters.opens.load(Ordering::SeqCst)
    }

    pub fn releases(&self) -> usize {
        self.counters.releases.load(Ordering::SeqCst)
    }
}

impl CaptureBackend for FakeBackend {
    fn open(&self, index: u32) -> Result<Box<dyn CaptureSource>, CameraError> {
        self.opened.lock().unwrap().push(index);
        let Some(&native) = self.cameras.get(&index) else {
            return Err(CameraError::OpenFailed {
                index,
                reason: "no such device".to_string(),
            });
        };
        if self
            .open_limit
            .is_some_and(|limit| self.opens() >= limit)
        {
            return Err(CameraError::OpenFailed {
                index,
                reason: "device busy".to_string(),
            });
        }
        self.counters.opens.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeSource {
            native,
            requested: BTreeMap::new(),
            read_delay: self.read_delay,
            frames_left: self.frame_limit,
            counters: Arc::clone(&self.counters),
            open: true,
        }))
    }

    /// Negotiates like a camera that tops out at its native size and 30 fps.
    fn open_with(
        &self,
        index: u32,
        request: &CaptureRequest,
    ) -> Result<Box<dyn CaptureSource>, CameraError> {
        self.requests.lock().unwrap().push((index, *request));
        let mut source = self.open(index)?;
        source.set(CaptureProperty::Fps, request.fps);
        Ok(source)
    }
}

/// Produces gradient frames at its native size. Requests above the native
/// size are clamped; the buffer size request is refused.
pub struct FakeSource {
    native: Resolution,
    requested: BTreeMap<&'static str, u32>,
    read_delay: Duration,
    frames_left: Option<usize>,
    counters: Arc<Counters>,
    open: bool,
}

fn key(property: CaptureProperty) -> &'static str {
    match property {
        CaptureProperty::FrameWidth => "width",
        CaptureProperty::FrameHeight => "height",
        CaptureProperty::Fps => "fps",
        CaptureProperty::BufferSize => "buffer",
    }
}

impl CaptureSource for FakeSource {
    fn is_open(&self) -> bool {
        self.open
    }

    fn read(&mut self) -> Option<Frame> {
        if !self.open {
            return None;
        }
        if let Some(left) = self.frames_left.as_mut() {
            if *left == 0 {
                return None;
            }
            *left -= 1;
        }
        if !self.read_delay.is_zero() {
            thread::sleep(self.read_delay);
        }
        self.counters.reads.fetch_add(1, Ordering::SeqCst);
        Some(gradient_frame(self.native))
    }

    fn get(&self, property: CaptureProperty) -> Option<u32> {
        match property {
            CaptureProperty::FrameWidth => Some(self.native.width),
            CaptureProperty::FrameHeight => Some(self.native.height),
            CaptureProperty::Fps => Some(self.requested.get("fps").copied().unwrap_or(30).min(30)),
            CaptureProperty::BufferSize => None,
        }
    }

    fn set(&mut self, property: CaptureProperty, value: u32) -> bool {
        let limit = match property {
            CaptureProperty::FrameWidth => self.native.width,
            CaptureProperty::FrameHeight => self.native.height,
            CaptureProperty::Fps => 30,
            CaptureProperty::BufferSize => return false,
        };
        self.requested.insert(key(property), value);
        value <= limit
    }

    fn release(&mut self) {
        if self.open {
            self.open = false;
            self.counters.releases.fetch_add(1, Ordering::SeqCst);
        }
    }
}

/// Prompter with canned answers that records what it was asked.
#[derive(Default)]
pub struct FakePrompter {
    pub confirm: bool,
    pub choice: Option<usize>,
    pub asked: RefCell<Vec<String>>,
}

impl FakePrompter {
    pub fn confirming() -> Self {
        Self {
            confirm: true,
            ..Default::default()
        }
    }

    pub fn choosing(choice: usize) -> Self {
        Self {
            choice: Some(choice),
            ..Default::default()
        }
    }

    pub fn asked(&self) -> Vec<String> {
        self.asked.borrow().clone()
    }
}

impl Prompter for FakePrompter {
    fn error(&self, title: &str, message: &str) {
        self.asked
            .borrow_mut()
            .push(format!("error:{}:{}", title, message));
    }

    fn confirm(&self, title: &str, _: &str) -> bool {
        self.asked.borrow_mut().push(format!("confirm:{}", title));
        self.confirm
    }

    fn choose(&self, title: &str, _: &str, options: &[String]) -> Option<usize> {
        self.asked
            .borrow_mut()
            .push(format!("choose:{}:{}", title, options.join("|")));
        self.choice
    }
}

/// Display that keeps every presented frame and closes itself after
/// `max_frames` frames or `max_polls` polls, whichever comes first.
pub struct FakeSink {
    pub bounds: Resolution,
    pub presented: Vec<Frame>,
    pub polls: usize,
    max_frames: usize,
    max_polls: usize,
    resize: Option<(usize, Resolution)>,
}

impl FakeSink {
    pub fn new(bounds: Resolution, max_frames: usize) -> Self {
        Self {
            bounds,
            presented: Vec::new(),
            polls: 0,
            max_frames,
            max_polls: 500,
            resize: None,
        }
    }

    /// Change the bounds to `bounds` on poll number `poll`, and close after
    /// `max_polls` polls.
    pub fn resizing(mut self, poll: usize, bounds: Resolution, max_polls: usize) -> Self {
        self.resize = Some((poll, bounds));
        self.max_polls = max_polls;
        self
    }
}

impl DisplaySink for FakeSink {
    fn bounds(&self) -> Resolution {
        self.bounds
    }

    fn poll(&mut self) -> bool {
        self.polls += 1;
        if let Some((at, bounds)) = self.resize {
            if self.polls == at {
                self.bounds = bounds;
            }
        }
        self.presented.len() < self.max_frames && self.polls <= self.max_polls
    }

    fn present(&mut self, frame: &Frame) -> Result<(), DisplayError> {
        self.presented.push(frame.clone());
        Ok(())
    }
}
