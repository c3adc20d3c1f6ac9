//! Radial vignette overlay used by the vintage filter.
//!
//! A black radial gradient centered on the buffer, with radius half of the
//! longer side. Opacity is zero out to 70% of the radius, then rises
//! linearly to 50% at the radius and stays there beyond it (the corners of a
//! non-square image). Distances are measured at pixel centers.

use super::to_channel;
use crate::buffer::PixelBuffer;

/// Fraction of the radius that stays fully transparent
pub const CLEAR_STOP: f64 = 0.7;
/// Overlay opacity at and beyond the radius
pub const EDGE_OPACITY: f64 = 0.5;

/// Overlay opacity at normalized distance `t` from the center
pub fn opacity_at(t: f64) -> f64 {
    if t <= CLEAR_STOP {
        0.0
    } else if t >= 1.0 {
        EDGE_OPACITY
    } else {
        EDGE_OPACITY * (t - CLEAR_STOP) / (1.0 - CLEAR_STOP)
    }
}

/// Darken R, G and B toward the edges, source-over black
pub fn apply(buffer: &mut PixelBuffer) {
    let width = buffer.width();
    let height = buffer.height();
    let radius = width.max(height) as f64 / 2.0;
    if radius <= 0.0 {
        return;
    }

    let cx = width as f64 / 2.0;
    let cy = height as f64 / 2.0;

    for (i, px) in buffer.pixels_mut().enumerate() {
        let x = (i as u32 % width) as f64 + 0.5;
        let y = (i as u32 / width) as f64 + 0.5;
        let t = ((x - cx).powi(2) + (y - cy).powi(2)).sqrt() / radius;
        let alpha = opacity_at(t);
        if alpha == 0.0 {
            continue;
        }
        let keep = 1.0 - alpha;
        for channel in px.iter_mut().take(3) {
            *channel = to_channel(*channel as f64 * keep);
        }
    }
}
