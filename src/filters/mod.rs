//! Photo filter module
//!
//! Per-pixel color transforms applied in place to the working RGBA buffer:
//! grayscale, sepia, cool tint, vintage (sepia plus a radial vignette) and a
//! brightness/contrast adjustment. Alpha is never touched, and every written
//! channel is rounded to the nearest integer and clamped to `[0, 255]`.
pub mod vignette;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::buffer::PixelBuffer;
use crate::errors::CameraError;

/// The closed set of photo filters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterKind {
    Grayscale,
    Sepia,
    Vintage,
    Cool,
}

impl FilterKind {
    pub const ALL: [FilterKind; 4] = [
        FilterKind::Grayscale,
        FilterKind::Sepia,
        FilterKind::Vintage,
        FilterKind::Cool,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FilterKind::Grayscale => "grayscale",
            FilterKind::Sepia => "sepia",
            FilterKind::Vintage => "vintage",
            FilterKind::Cool => "cool",
        }
    }

    /// Run this filter over the whole buffer
    pub fn apply(self, buffer: &mut PixelBuffer) {
        match self {
            FilterKind::Grayscale => grayscale(buffer),
            FilterKind::Sepia => sepia(buffer),
            FilterKind::Vintage => {
                sepia(buffer);
                vignette::apply(buffer);
            }
            FilterKind::Cool => cool(buffer),
        }
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterKind {
    type Err = CameraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "grayscale" => Ok(FilterKind::Grayscale),
            "sepia" => Ok(FilterKind::Sepia),
            "vintage" => Ok(FilterKind::Vintage),
            "cool" => Ok(FilterKind::Cool),
            other => Err(CameraError::UnknownFilter(other.to_string())),
        }
    }
}

/// Apply a filter selected by its tag. An unknown tag leaves the buffer as it was.
pub fn apply_filter_by_name(buffer: &mut PixelBuffer, tag: &str) -> Result<FilterKind, CameraError> {
    let kind: FilterKind = tag.parse()?;
    kind.apply(buffer);
    log::debug!(
        "Applied {} filter to {}x{} buffer",
        kind,
        buffer.width(),
        buffer.height()
    );
    Ok(kind)
}

/// Store a computed channel value the way a clamped byte array does:
/// saturate to `[0, 255]`, then round half to even
#[inline]
pub(crate) fn to_channel(value: f64) -> u8 {
    value.clamp(0.0, 255.0).round_ties_even() as u8
}

/// Replace R, G and B with their unweighted average
pub fn grayscale(buffer: &mut PixelBuffer) {
    for px in buffer.pixels_mut() {
        let avg = (px[0] as f64 + px[1] as f64 + px[2] as f64) / 3.0;
        let gray = to_channel(avg);
        px[0] = gray;
        px[1] = gray;
        px[2] = gray;
    }
}

pub fn sepia(buffer: &mut PixelBuffer) {
    for px in buffer.pixels_mut() {
        let r = px[0] as f64;
        let g = px[1] as f64;
        let b = px[2] as f64;
        px[0] = to_channel(r * 0.393 + g * 0.769 + b * 0.189);
        px[1] = to_channel(r * 0.349 + g * 0.686 + b * 0.168);
        px[2] = to_channel(r * 0.272 + g * 0.534 + b * 0.131);
    }
}

/// Blue tint: dim red and green, boost blue
pub fn cool(buffer: &mut PixelBuffer) {
    for px in buffer.pixels_mut() {
        px[0] = to_channel(px[0] as f64 * 0.9);
        px[1] = to_channel(px[1] as f64 * 0.9);
        px[2] = to_channel(px[2] as f64 * 1.2);
    }
}

/// Contrast then brightness, per channel.
///
/// Both values are percentages in `[-100, 100]`. Contrast scales each
/// channel around mid-gray by `(contrast + 100) / 100`; brightness then adds
/// `brightness / 100 * 255`. The contrast result is stored before brightness
/// reads it, so it is rounded in between.
pub fn adjust_brightness_contrast(
    buffer: &mut PixelBuffer,
    brightness: f32,
    contrast: f32,
) -> Result<(), CameraError> {
    if !(-100.0..=100.0).contains(&brightness) {
        return Err(CameraError::InvalidParameter(format!(
            "brightness must be between -100 and 100, got {}",
            brightness
        )));
    }
    if !(-100.0..=100.0).contains(&contrast) {
        return Err(CameraError::InvalidParameter(format!(
            "contrast must be between -100 and 100, got {}",
            contrast
        )));
    }

    let contrast_factor = (contrast as f64 + 100.0) / 100.0;
    let brightness_offset = brightness as f64 / 100.0 * 255.0;

    for px in buffer.pixels_mut() {
        for channel in px.iter_mut().take(3) {
            let normalized = *channel as f64 / 255.0;
            let contrasted =
                to_channel(((normalized - 0.5) * contrast_factor + 0.5).clamp(0.0, 1.0) * 255.0);
            *channel = to_channel(contrasted as f64 + brightness_offset);
        }
    }

    Ok(())
}
