//! Latest-frame slot shared between the capture thread and the render loop.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::camera::Frame;

#[derive(Debug, Default)]
struct Latest {
    /// Bumped on every publish; 0 means nothing published yet
    sequence: u64,
    frame: Option<Frame>,
}

/// Single-value, overwrite-on-write frame handoff.
///
/// The producer replaces the slot contents, the consumer copies them out.
/// There is no queue: a frame that is never read is dropped when the next
/// one is published, so memory stays bounded and latency cannot build up
/// when rendering is slower than capture. The lock is held only for the
/// move in and the clone out.
#[derive(Debug, Default)]
pub struct FrameSlot {
    latest: Mutex<Latest>,
}

impl FrameSlot {
    pub fn new() -> Self {
        Self::default()
    }

    // A panicking peer must not wedge the pipeline; the data is a whole
    // frame either way since writes are a single move.
    fn lock(&self) -> MutexGuard<'_, Latest> {
        self.latest.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the slot contents with `frame`.
    pub fn publish(&self, frame: Frame) {
        let stale = {
            let mut latest = self.lock();
            latest.sequence += 1;
            latest.frame.replace(frame)
        };
        // free the old buffer outside the critical section
        drop(stale);
    }

    /// Copy of the most recent frame, if any.
    pub fn latest(&self) -> Option<Frame> {
        self.lock().frame.clone()
    }

    /// Copy of the most recent frame if it was published after `seen`,
    /// together with its sequence number.
    pub fn newer_than(&self, seen: u64) -> Option<(u64, Frame)> {
        let latest = self.lock();
        if latest.sequence <= seen {
            return None;
        }
        latest.frame.clone().map(|frame| (latest.sequence, frame))
    }

    /// Number of frames published so far.
    pub fn published(&self) -> u64 {
        self.lock().sequence
    }
}
