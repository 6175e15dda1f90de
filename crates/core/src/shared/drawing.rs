//! Marker rasterization for annotated output frames.

use crate::shared::blob::Blob;
use crate::shared::constants::{MARKER_MIN_RADIUS, MARKER_RADIUS_MARGIN};
use crate::shared::frame::Frame;

/// Marker radius for a blob: longest bounding-box edge plus a margin,
/// clamped to a minimum so tiny blobs stay visible.
pub fn marker_radius(blob: &Blob) -> u32 {
    let radius = blob.max_dimension().round() as u32 + MARKER_RADIUS_MARGIN;
    radius.max(MARKER_MIN_RADIUS)
}

/// Draws a one-pixel white circle outline centered at `(cx, cy)`.
///
/// Midpoint circle algorithm; pixels falling outside the frame are skipped.
pub fn draw_circle(frame: &mut Frame, cx: i64, cy: i64, radius: i64) {
    if radius < 0 {
        return;
    }
    let mut x = radius;
    let mut y = 0i64;
    let mut err = 1 - radius;

    while x >= y {
        for (px, py) in [
            (cx + x, cy + y),
            (cx + y, cy + x),
            (cx - y, cy + x),
            (cx - x, cy + y),
            (cx - x, cy - y),
            (cx - y, cy - x),
            (cx + y, cy - x),
            (cx + x, cy - y),
        ] {
            put_pixel(frame, px, py);
        }
        y += 1;
        if err < 0 {
            err += 2 * y + 1;
        } else {
            x -= 1;
            err += 2 * (y - x) + 1;
        }
    }
}

/// Draws a circle marker for every blob onto a copy-for-output frame.
pub fn annotate_frame(frame: &mut Frame, blobs: &[Blob]) {
    for blob in blobs {
        draw_circle(
            frame,
            blob.centroid_x.round() as i64,
            blob.centroid_y.round() as i64,
            marker_radius(blob) as i64,
        );
    }
}

fn put_pixel(frame: &mut Frame, x: i64, y: i64) {
    if x < 0 || y < 0 || x >= frame.width() as i64 || y >= frame.height() as i64 {
        return;
    }
    let idx = y as usize * frame.width() as usize + x as usize;
    frame.data_mut()[idx] = u8::MAX;
}
