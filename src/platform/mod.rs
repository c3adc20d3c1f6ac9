//! Platform capability seams.
//!
//! The session talks to the camera, the download location and the share
//! sheet only through these traits. `native` implements them on top of
//! nokhwa and the local filesystem; `crate::testing` provides a synthetic
//! implementation.

pub mod downloads;
pub mod native;
pub mod torch;

use image::RgbaImage;
use uuid::Uuid;

use crate::buffer::EncodedImage;
use crate::errors::CameraError;
use crate::types::{CapabilitySet, ConstraintRequest, FacingMode, StreamConstraints};

pub use downloads::DirectoryDownloads;
pub use native::NativeMediaDevices;

/// Source of capture handles (the `getUserMedia` side of the platform)
pub trait MediaDevices: Send {
    /// Request a new stream. Platform refusal or no matching device is
    /// reported as `CameraError::DeviceUnavailable`.
    fn get_user_media(
        &mut self,
        constraints: &StreamConstraints,
    ) -> Result<CaptureHandle, CameraError>;
}

/// A single video channel of a capture handle
pub trait VideoTrack: Send {
    fn id(&self) -> &str;

    /// Human readable device name
    fn label(&self) -> &str;

    /// Which controllable features this track exposes
    fn capabilities(&self) -> CapabilitySet;

    fn apply_constraints(&mut self, constraints: &ConstraintRequest) -> Result<(), CameraError>;

    /// Native frame dimensions currently delivered by the track
    fn frame_size(&self) -> (u32, u32);

    /// Copy the current frame out as RGBA
    fn read_frame(&mut self) -> Result<RgbaImage, CameraError>;

    fn stop(&mut self);

    fn is_live(&self) -> bool;
}

/// Receives local downloads
pub trait DownloadTarget: Send {
    fn download(&mut self, file_name: &str, image: &EncodedImage) -> Result<(), CameraError>;
}

/// Named file handed to a share sheet
#[derive(Debug, Clone, PartialEq)]
pub struct SharePayload {
    pub title: String,
    pub text: String,
    pub file_name: String,
    pub image: EncodedImage,
}

/// Platform share sheet. Returning an error means the share was refused or
/// cancelled.
pub trait ShareTarget: Send {
    fn share(&mut self, payload: SharePayload) -> Result<(), CameraError>;
}

/// An acquired video stream and its tracks
pub struct CaptureHandle {
    id: String,
    facing: FacingMode,
    tracks: Vec<Box<dyn VideoTrack>>,
}

impl CaptureHandle {
    pub fn new(facing: FacingMode, tracks: Vec<Box<dyn VideoTrack>>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            facing,
            tracks,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn facing(&self) -> FacingMode {
        self.facing
    }

    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    /// First video track, the one every control targets
    pub fn video_track(&self) -> Option<&dyn VideoTrack> {
        self.tracks.first().map(|track| track.as_ref())
    }

    pub fn video_track_mut(&mut self) -> Option<&mut (dyn VideoTrack + 'static)> {
        self.tracks.first_mut().map(|track| track.as_mut())
    }

    /// Stop every track
    pub fn stop_all(&mut self) {
        for track in &mut self.tracks {
            if track.is_live() {
                track.stop();
            }
        }
    }

    pub fn is_live(&self) -> bool {
        self.tracks.iter().any(|track| track.is_live())
    }
}

impl std::fmt::Debug for CaptureHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureHandle")
            .field("id", &self.id)
            .field("facing", &self.facing)
            .field("tracks", &self.tracks.len())
            .finish()
    }
}

impl Drop for CaptureHandle {
    fn drop(&mut self) {
        self.stop_all();
    }
}
