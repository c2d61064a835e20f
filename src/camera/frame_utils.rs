//! Frame conversion and transformation utilities.

use image::imageops::{self, FilterType};
use image::{ImageBuffer, Rgb};

use super::types::{ChannelOrder, Frame, Resolution};

/// Mirror a frame horizontally (flip left-right) for selfie mode.
pub fn mirror_horizontal(frame: &mut Frame) {
    let width = frame.width as usize;
    let bpp = Frame::BYTES_PER_PIXEL;
    let stride = frame.stride();
    if stride == 0 {
        return;
    }

    for row in frame.data.chunks_exact_mut(stride) {
        // Swap pixels from left and right
        for x in 0..width / 2 {
            let left = x * bpp;
            let right = (width - 1 - x) * bpp;
            for i in 0..bpp {
                row.swap(left + i, right + i);
            }
        }
    }
}

/// Reorder channels to RGB for display. A no-op for frames already in RGB.
pub fn to_display_order(frame: &mut Frame) {
    if frame.order == ChannelOrder::Rgb {
        return;
    }
    for pixel in frame.data.chunks_exact_mut(Frame::BYTES_PER_PIXEL) {
        pixel.swap(0, 2);
    }
    frame.order = ChannelOrder::Rgb;
}

/// Largest size that fits `frame` inside `bounds` with its aspect ratio kept.
///
/// Returns `None` when the display has not been laid out yet (either bound
/// at most 1 px) or the frame is empty; callers then present the frame at
/// its native size. Integer arithmetic keeps the result within bounds
/// exactly; the shorter side is rounded down but never below 1 px.
pub fn fit_within(frame: Resolution, bounds: Resolution) -> Option<Resolution> {
    if bounds.width <= 1 || bounds.height <= 1 || frame.width == 0 || frame.height == 0 {
        return None;
    }

    let (fw, fh) = (u64::from(frame.width), u64::from(frame.height));
    let (bw, bh) = (u64::from(bounds.width), u64::from(bounds.height));

    // Compare bw/fw against bh/fh without division
    let (width, height) = if bw * fh <= bh * fw {
        (bw, fh * bw / fw)
    } else {
        (fw * bh / fh, bh)
    };

    Some(Resolution::new(width.max(1) as u32, height.max(1) as u32))
}

/// Resize a frame to `target` with bilinear filtering.
///
/// Frames already at `target`, or too short for their own dimensions, are
/// returned unchanged.
pub fn resize(frame: Frame, target: Resolution) -> Frame {
    if frame.resolution() == target {
        return frame;
    }

    // Channel order does not matter to the filter, the buffer is just 3 channels
    let Some(view) =
        ImageBuffer::<Rgb<u8>, &[u8]>::from_raw(frame.width, frame.height, frame.data.as_slice())
    else {
        return frame;
    };
    let resized = imageops::resize(&view, target.width, target.height, FilterType::Triangle);

    Frame {
        data: resized.into_raw(),
        width: target.width,
        height: target.height,
        ..frame
    }
}

/// Scale a frame to fit `bounds`, or pass it through if bounds are not known yet.
pub fn fit_to_bounds(frame: Frame, bounds: Resolution) -> Frame {
    match fit_within(frame.resolution(), bounds) {
        Some(target) => resize(frame, target),
        None => frame,
    }
}
