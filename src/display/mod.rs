//! Display side of the mirror: the sink frames are presented to and the
//! render loop that drives a [`FramePipeline`] into it.

mod sdl;

pub use sdl::{SdlDisplay, SdlSurface, WindowConfig};

use std::sync::atomic::{AtomicBool, Ordering};

use crate::camera::{Frame, Resolution};
use crate::pipeline::{FramePipeline, Ticker};

/// Errors from the window or renderer.
#[derive(Debug, thiserror::Error)]
pub enum DisplayError {
    #[error("SDL error: {0}")]
    Sdl(String),
    #[error("Failed to create window: {0}")]
    Window(String),
    #[error("Failed to create renderer: {0}")]
    Renderer(String),
    #[error("Failed to upload frame: {0}")]
    Texture(String),
}

/// Something frames can be shown on.
pub trait DisplaySink {
    /// Current drawable size in pixels. Zero or one pixel in either
    /// dimension means the surface has not been laid out yet.
    fn bounds(&self) -> Resolution;

    /// Process pending window events. Returns `false` once the user has
    /// asked to close the display.
    fn poll(&mut self) -> bool;

    /// Show `frame`, centered, replacing whatever was shown before.
    fn present(&mut self, frame: &Frame) -> Result<(), DisplayError>;
}

/// Counters collected over one mirroring run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RenderStats {
    /// Render ticks executed
    pub ticks: u64,
    /// Frames handed to the display
    pub frames: u64,
    /// Ticks that had no frame to show
    pub empty_ticks: u64,
}

/// Drive `pipeline` into `sink` on the pipeline's tick interval until the
/// display is closed or `running` is cleared.
///
/// Each tick runs to completion before the next is scheduled.
pub fn run_render_loop(
    sink: &mut dyn DisplaySink,
    pipeline: &mut dyn FramePipeline,
    running: &AtomicBool,
) -> Result<RenderStats, DisplayError> {
    let mut ticker = Ticker::new(pipeline.tick_interval());
    let mut stats = RenderStats::default();

    log::debug!(
        "Render loop started ({} pipeline, {:?} tick)",
        pipeline.variant(),
        ticker.interval()
    );

    while running.load(Ordering::Acquire) {
        if !sink.poll() {
            log::debug!("Display closed by user");
            break;
        }

        stats.ticks += 1;
        match pipeline.next_frame(sink.bounds()) {
            Some(frame) => {
                sink.present(&frame)?;
                stats.frames += 1;
            }
            None => stats.empty_ticks += 1,
        }

        ticker.wait();
    }

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::ChannelOrder;
    use crate::pipeline::Variant;
    use std::time::Duration;

    struct CountingSink {
        bounds: Resolution,
        polls_left: usize,
        presented: Vec<Resolution>,
    }

    impl DisplaySink for CountingSink {
        fn bounds(&self) -> Resolution {
            self.bounds
        }
        fn poll(&mut self) -> bool {
            if self.polls_left == 0 {
                return false;
            }
            self.polls_left -= 1;
            true
        }
        fn present(&mut self, frame: &Frame) -> Result<(), DisplayError> {
            self.presented.push(frame.resolution());
            Ok(())
        }
    }

    /// Yields a frame on every other tick.
    struct AlternatingPipeline {
        tick: u64,
        shutdowns: usize,
    }

    impl FramePipeline for AlternatingPipeline {
        fn variant(&self) -> Variant {
            Variant::Synchronous
        }
        fn tick_interval(&self) -> Duration {
            Duration::from_millis(1)
        }
        fn next_frame(&mut self, bounds: Resolution) -> Option<Frame> {
            self.tick += 1;
            (self.tick % 2 == 1)
                .then(|| Frame::new(vec![0; 3], 1, 1, ChannelOrder::Rgb))
                .map(|f| crate::camera::frame_utils::fit_to_bounds(f, bounds))
        }
        fn shutdown(&mut self) {
            self.shutdowns += 1;
        }
    }

    #[test]
    fn test_render_loop_runs_until_display_closes() {
        let mut sink = CountingSink {
            bounds: Resolution::new(8, 4),
            polls_left: 5,
            presented: Vec::new(),
        };
        let mut pipeline = AlternatingPipeline {
            tick: 0,
            shutdowns: 0,
        };
        let running = AtomicBool::new(true);

        let stats = run_render_loop(&mut sink, &mut pipeline, &running).unwrap();
        assert_eq!(
            stats,
            RenderStats {
                ticks: 5,
                frames: 3,
                empty_ticks: 2
            }
        );
        assert_eq!(sink.presented, vec![Resolution::new(4, 4); 3]);
        // the loop never tears the pipeline down itself
        assert_eq!(pipeline.shutdowns, 0);
    }

    #[test]
    fn test_render_loop_stops_when_running_cleared() {
        let mut sink = CountingSink {
            bounds: Resolution::new(8, 4),
            polls_left: usize::MAX,
            presented: Vec::new(),
        };
        let mut pipeline = AlternatingPipeline {
            tick: 0,
            shutdowns: 0,
        };
        let running = AtomicBool::new(false);

        let stats = run_render_loop(&mut sink, &mut pipeline, &running).unwrap();
        assert_eq!(stats.ticks, 0);
        assert!(sink.presented.is_empty());
    }
}
