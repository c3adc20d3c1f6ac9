//! In-memory platform backends driven from tests

use std::sync::{Arc, Mutex, MutexGuard};

use image::RgbaImage;
use uuid::Uuid;

use super::synthetic_data::synthetic_frame;
use crate::buffer::EncodedImage;
use crate::errors::CameraError;
use crate::platform::{
    CaptureHandle, DownloadTarget, MediaDevices, SharePayload, ShareTarget, VideoTrack,
};
use crate::types::{Capability, CapabilitySet, ConstraintRequest, StreamConstraints};

const DEFAULT_FRAME_SIZE: (u32, u32) = (64, 48);

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Something the synthetic platform was asked to do
#[derive(Debug, Clone, PartialEq)]
pub enum PlatformEvent {
    MediaRequested(StreamConstraints),
    ConstraintsApplied {
        track: String,
        request: ConstraintRequest,
    },
    TrackStopped(String),
    Downloaded(String),
    Shared(String),
}

/// Ordered record of platform events, shared between backends
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Arc<Mutex<Vec<PlatformEvent>>>,
}

impl EventLog {
    pub fn push(&self, event: PlatformEvent) {
        lock(&self.events).push(event);
    }

    pub fn snapshot(&self) -> Vec<PlatformEvent> {
        lock(&self.events).clone()
    }

    pub fn clear(&self) {
        lock(&self.events).clear();
    }

    pub fn media_requests(&self) -> Vec<StreamConstraints> {
        lock(&self.events)
            .iter()
            .filter_map(|event| match event {
                PlatformEvent::MediaRequested(constraints) => Some(constraints.clone()),
                _ => None,
            })
            .collect()
    }

    /// Constraint requests the tracks accepted, oldest first
    pub fn applied_constraints(&self) -> Vec<ConstraintRequest> {
        lock(&self.events)
            .iter()
            .filter_map(|event| match event {
                PlatformEvent::ConstraintsApplied { request, .. } => Some(request.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn stopped_tracks(&self) -> Vec<String> {
        lock(&self.events)
            .iter()
            .filter_map(|event| match event {
                PlatformEvent::TrackStopped(id) => Some(id.clone()),
                _ => None,
            })
            .collect()
    }
}

#[derive(Debug, Default)]
struct Behaviour {
    denied: Option<String>,
    reject_constraints: bool,
    fail_frames: bool,
}

/// Switches that change how the synthetic platform answers. Changes apply to
/// tracks that are already open.
#[derive(Debug, Clone, Default)]
pub struct SyntheticControl {
    behaviour: Arc<Mutex<Behaviour>>,
}

impl SyntheticControl {
    /// Refuse further media requests with `reason`
    pub fn deny_access(&self, reason: &str) {
        lock(&self.behaviour).denied = Some(reason.to_string());
    }

    pub fn allow_access(&self) {
        lock(&self.behaviour).denied = None;
    }

    pub fn reject_constraints(&self, reject: bool) {
        lock(&self.behaviour).reject_constraints = reject;
    }

    pub fn fail_frames(&self, fail: bool) {
        lock(&self.behaviour).fail_frames = fail;
    }
}

/// Camera backend producing [`synthetic_frame`] content
#[derive(Debug, Clone)]
pub struct SyntheticMediaDevices {
    capabilities: CapabilitySet,
    frame_size: (u32, u32),
    events: EventLog,
    control: SyntheticControl,
}

impl Default for SyntheticMediaDevices {
    fn default() -> Self {
        Self::new()
    }
}

impl SyntheticMediaDevices {
    /// Tracks expose every capability and deliver 64x48 frames
    pub fn new() -> Self {
        Self {
            capabilities: [
                Capability::ApplyConstraints,
                Capability::Torch,
                Capability::ManualFocus,
            ]
            .into_iter()
            .collect(),
            frame_size: DEFAULT_FRAME_SIZE,
            events: EventLog::default(),
            control: SyntheticControl::default(),
        }
    }

    pub fn with_capabilities(mut self, capabilities: CapabilitySet) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn with_frame_size(mut self, width: u32, height: u32) -> Self {
        self.frame_size = (width, height);
        self
    }

    /// Record into an existing log instead of a private one
    pub fn with_event_log(mut self, events: EventLog) -> Self {
        self.events = events;
        self
    }

    pub fn events(&self) -> EventLog {
        self.events.clone()
    }

    pub fn control(&self) -> SyntheticControl {
        self.control.clone()
    }
}

impl MediaDevices for SyntheticMediaDevices {
    fn get_user_media(
        &mut self,
        constraints: &StreamConstraints,
    ) -> Result<CaptureHandle, CameraError> {
        self.events
            .push(PlatformEvent::MediaRequested(constraints.clone()));

        if let Some(reason) = lock(&self.control.behaviour).denied.clone() {
            return Err(CameraError::DeviceUnavailable(reason));
        }

        let facing = constraints.video.facing_mode.unwrap_or_default();
        let track = SyntheticTrack {
            id: Uuid::new_v4().to_string(),
            label: format!("Synthetic Camera ({})", facing),
            capabilities: self.capabilities.clone(),
            frame_size: self.frame_size,
            frames_read: 0,
            live: true,
            events: self.events.clone(),
            control: self.control.clone(),
        };
        Ok(CaptureHandle::new(facing, vec![Box::new(track) as Box<dyn VideoTrack>]))
    }
}

struct SyntheticTrack {
    id: String,
    label: String,
    capabilities: CapabilitySet,
    frame_size: (u32, u32),
    frames_read: u64,
    live: bool,
    events: EventLog,
    control: SyntheticControl,
}

impl VideoTrack for SyntheticTrack {
    fn id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> &str {
        &self.label
    }

    fn capabilities(&self) -> CapabilitySet {
        self.capabilities.clone()
    }

    fn apply_constraints(&mut self, request: &ConstraintRequest) -> Result<(), CameraError> {
        if lock(&self.control.behaviour).reject_constraints {
            return Err(CameraError::PlatformRejected(
                "synthetic track rejected constraints".to_string(),
            ));
        }
        self.events.push(PlatformEvent::ConstraintsApplied {
            track: self.id.clone(),
            request: request.clone(),
        });
        Ok(())
    }

    fn frame_size(&self) -> (u32, u32) {
        self.frame_size
    }

    fn read_frame(&mut self) -> Result<RgbaImage, CameraError> {
        if !self.live {
            return Err(CameraError::NoActiveStream);
        }
        if lock(&self.control.behaviour).fail_frames {
            return Err(CameraError::CaptureFailed(
                "synthetic frame unavailable".to_string(),
            ));
        }
        let (width, height) = self.frame_size;
        let frame = synthetic_frame(self.frames_read, width, height);
        self.frames_read += 1;
        Ok(frame)
    }

    fn stop(&mut self) {
        if self.live {
            self.live = false;
            self.events.push(PlatformEvent::TrackStopped(self.id.clone()));
        }
    }

    fn is_live(&self) -> bool {
        self.live
    }
}

/// Download target that keeps files in memory
#[derive(Debug, Clone)]
pub struct MemoryDownloads {
    files: Arc<Mutex<Vec<(String, EncodedImage)>>>,
    events: EventLog,
    failing: bool,
}

impl MemoryDownloads {
    pub fn new(events: EventLog) -> Self {
        Self {
            files: Arc::default(),
            events,
            failing: false,
        }
    }

    /// Every download fails with an IO error
    pub fn failing(mut self) -> Self {
        self.failing = true;
        self
    }

    /// Shared view of the stored files
    pub fn files(&self) -> Arc<Mutex<Vec<(String, EncodedImage)>>> {
        Arc::clone(&self.files)
    }
}

impl DownloadTarget for MemoryDownloads {
    fn download(&mut self, file_name: &str, image: &EncodedImage) -> Result<(), CameraError> {
        if self.failing {
            return Err(CameraError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "download location is read-only",
            )));
        }
        lock(&self.files).push((file_name.to_string(), image.clone()));
        self.events
            .push(PlatformEvent::Downloaded(file_name.to_string()));
        Ok(())
    }
}

/// Share sheet that records payloads, or cancels every share
#[derive(Debug, Clone)]
pub struct RecordingShareTarget {
    payloads: Arc<Mutex<Vec<SharePayload>>>,
    events: EventLog,
    cancel: bool,
}

impl RecordingShareTarget {
    pub fn new(events: EventLog) -> Self {
        Self {
            payloads: Arc::default(),
            events,
            cancel: false,
        }
    }

    pub fn cancelling(mut self) -> Self {
        self.cancel = true;
        self
    }

    pub fn payloads(&self) -> Arc<Mutex<Vec<SharePayload>>> {
        Arc::clone(&self.payloads)
    }
}

impl ShareTarget for RecordingShareTarget {
    fn share(&mut self, payload: SharePayload) -> Result<(), CameraError> {
        if self.cancel {
            return Err(CameraError::ShareRejected("user cancelled".to_string()));
        }
        self.events
            .push(PlatformEvent::Shared(payload.file_name.clone()));
        lock(&self.payloads).push(payload);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_denied_request_is_still_logged() {
        let mut devices = SyntheticMediaDevices::new();
        devices.control().deny_access("NotAllowedError");
        let result =
            devices.get_user_media(&StreamConstraints::video_only(ConstraintRequest::default()));
        assert!(matches!(result, Err(CameraError::DeviceUnavailable(reason)) if reason == "NotAllowedError"));
        assert_eq!(devices.events().media_requests().len(), 1);

        devices.control().allow_access();
        assert!(devices
            .get_user_media(&StreamConstraints::video_only(ConstraintRequest::default()))
            .is_ok());
    }

    #[test]
    fn test_track_stops_once() {
        let mut devices = SyntheticMediaDevices::new();
        let mut handle = devices
            .get_user_media(&StreamConstraints::video_only(ConstraintRequest::default()))
            .unwrap();
        handle.stop_all();
        handle.stop_all();
        drop(handle);
        assert_eq!(devices.events().stopped_tracks().len(), 1);
    }

    #[test]
    fn test_frames_advance() {
        let mut devices = SyntheticMediaDevices::new().with_frame_size(4, 2);
        let mut handle = devices
            .get_user_media(&StreamConstraints::video_only(ConstraintRequest::default()))
            .unwrap();
        let track = handle.video_track_mut().unwrap();
        assert_eq!(track.read_frame().unwrap(), synthetic_frame(0, 4, 2));
        assert_eq!(track.read_frame().unwrap(), synthetic_frame(1, 4, 2));
    }
}
