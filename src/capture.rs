//! Frame capture into the working pixel buffer.

use crate::buffer::{EncodedImage, PixelBuffer};
use crate::errors::CameraError;
use crate::platform::CaptureHandle;

/// Copies single frames out of a capture handle and encodes them
#[derive(Debug, Clone, Copy)]
pub struct FrameCapturer {
    jpeg_quality: u8,
}

impl FrameCapturer {
    pub fn new(jpeg_quality: u8) -> Self {
        Self { jpeg_quality }
    }

    pub fn jpeg_quality(&self) -> u8 {
        self.jpeg_quality
    }

    /// Snapshot the first video track into `target` at its native size and
    /// encode the result. `target` is left as it was when no frame arrives.
    pub fn capture(
        &self,
        handle: Option<&mut CaptureHandle>,
        target: Option<&mut PixelBuffer>,
    ) -> Result<EncodedImage, CameraError> {
        let (Some(handle), Some(target)) = (handle, target) else {
            return Err(CameraError::NoActiveStream);
        };
        let track = handle
            .video_track_mut()
            .filter(|track| track.is_live())
            .ok_or(CameraError::NoActiveStream)?;

        let (native_width, native_height) = track.frame_size();
        let frame = track.read_frame()?;
        if frame.dimensions() != (native_width, native_height) {
            log::warn!(
                "Frame arrived at {}x{}, track reported {}x{}",
                frame.width(),
                frame.height(),
                native_width,
                native_height
            );
        }
        target.copy_from_image(&frame);

        let encoded = self.export(target)?;
        log::info!(
            "Captured {}x{} frame ({} bytes)",
            encoded.width(),
            encoded.height(),
            encoded.len()
        );
        Ok(encoded)
    }

    /// Encode the buffer as it is now, edits included
    pub fn export(&self, buffer: &PixelBuffer) -> Result<EncodedImage, CameraError> {
        buffer.encode_jpeg(self.jpeg_quality)
    }
}
