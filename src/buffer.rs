//! Working pixel buffer and encoded image payloads.

use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, RgbaImage};
use serde::Serialize;

use crate::errors::CameraError;

pub const JPEG_MIME_TYPE: &str = "image/jpeg";

/// Row-major RGBA samples, four bytes per pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Transparent black buffer of the given size
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; width as usize * height as usize * 4],
        }
    }

    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Result<Self, CameraError> {
        let expected = width as usize * height as usize * 4;
        if data.len() != expected {
            return Err(CameraError::InvalidParameter(format!(
                "RGBA data for {}x{} must be {} bytes, got {}",
                width,
                height,
                expected,
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Iterate pixels as mutable `[r, g, b, a]` chunks
    pub fn pixels_mut(&mut self) -> std::slice::ChunksExactMut<'_, u8> {
        self.data.chunks_exact_mut(4)
    }

    /// Resize to new dimensions. Like a canvas resize this clears the
    /// contents, even when the dimensions do not change.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.data.clear();
        self.data.resize(width as usize * height as usize * 4, 0);
    }

    /// Copy a frame in, resizing to the frame's dimensions first
    pub fn copy_from_image(&mut self, frame: &RgbaImage) {
        self.resize(frame.width(), frame.height());
        self.data.copy_from_slice(frame.as_raw());
    }

    pub fn to_image(&self) -> RgbaImage {
        // Length is checked by every constructor
        RgbaImage::from_raw(self.width, self.height, self.data.clone())
            .unwrap_or_else(|| RgbaImage::new(self.width, self.height))
    }

    /// JPEG-encode the buffer. Alpha is dropped.
    pub fn encode_jpeg(&self, quality: u8) -> Result<EncodedImage, CameraError> {
        if self.width == 0 || self.height == 0 {
            return Err(CameraError::EncodingFailed(
                "cannot encode an empty buffer".to_string(),
            ));
        }

        let rgb = DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(self.to_image()).to_rgb8());
        let mut out = Vec::new();
        let encoder = JpegEncoder::new_with_quality(&mut out, quality.clamp(1, 100));
        rgb.write_with_encoder(encoder)?;

        Ok(EncodedImage {
            bytes: Bytes::from(out),
            mime_type: JPEG_MIME_TYPE.to_string(),
            width: self.width,
            height: self.height,
        })
    }
}

impl From<RgbaImage> for PixelBuffer {
    fn from(image: RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            width,
            height,
            data: image.into_raw(),
        }
    }
}

/// Compressed image bytes, immutable once produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EncodedImage {
    bytes: Bytes,
    mime_type: String,
    width: u32,
    height: u32,
}

impl EncodedImage {
    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
