//! Deterministic frame content for tests and benchmarks

use image::{Rgba, RgbaImage};

/// Opaque gradient frame that shifts with `frame_number`, so consecutive
/// captures are distinguishable
pub fn synthetic_frame(frame_number: u64, width: u32, height: u32) -> RgbaImage {
    let base = (frame_number % 256) as u8;
    RgbaImage::from_fn(width, height, |x, y| {
        Rgba([
            base.wrapping_add((x % 256) as u8),
            base.wrapping_add((y % 256) as u8),
            base.wrapping_add(((x + y) % 256) as u8),
            255,
        ])
    })
}
