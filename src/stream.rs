//! Capture handle lifecycle.
//!
//! The manager owns at most one handle. Acquiring a new one always stops
//! the tracks of the previous handle before the platform is asked for a
//! new stream.

use crate::config::CameraConfig;
use crate::errors::CameraError;
use crate::platform::{CaptureHandle, MediaDevices};
use crate::types::{ConstraintRequest, FacingMode, StreamConstraints, Viewport};

pub struct StreamManager {
    devices: Box<dyn MediaDevices>,
    config: CameraConfig,
    current: Option<CaptureHandle>,
}

impl StreamManager {
    pub fn new(devices: Box<dyn MediaDevices>, config: CameraConfig) -> Self {
        Self {
            devices,
            config,
            current: None,
        }
    }

    /// Video-only constraints for a facing mode sized to a viewport
    pub fn constraints_for(&self, facing: FacingMode, viewport: Viewport) -> StreamConstraints {
        StreamConstraints::video_only(ConstraintRequest {
            facing_mode: Some(facing),
            width: Some(viewport.width.into()),
            height: Some(viewport.height.into()),
            frame_rate: Some(self.config.frame_rate.into()),
            advanced: Vec::new(),
        })
    }

    /// Replace the current handle with a new stream.
    ///
    /// On failure no handle is active: the previous one has already been
    /// stopped.
    pub fn acquire(
        &mut self,
        facing: FacingMode,
        viewport: Option<Viewport>,
    ) -> Result<&CaptureHandle, CameraError> {
        self.release();

        let viewport = viewport.unwrap_or_else(|| self.config.viewport());
        let constraints = self.constraints_for(facing, viewport);

        match self.devices.get_user_media(&constraints) {
            Ok(handle) => {
                log::info!(
                    "Acquired {} camera stream {} ({} track(s))",
                    facing,
                    handle.id(),
                    handle.track_count()
                );
                Ok(self.current.insert(handle))
            }
            Err(e) => {
                log::error!("Error accessing camera: {}", e);
                Err(match e {
                    CameraError::DeviceUnavailable(_) => e,
                    other => CameraError::DeviceUnavailable(other.to_string()),
                })
            }
        }
    }

    /// Stop every track of the current handle. No-op without one.
    pub fn release(&mut self) {
        if let Some(mut handle) = self.current.take() {
            handle.stop_all();
            log::info!("Released camera stream {}", handle.id());
        }
    }

    pub fn current(&self) -> Option<&CaptureHandle> {
        self.current.as_ref()
    }

    pub fn current_mut(&mut self) -> Option<&mut CaptureHandle> {
        self.current.as_mut()
    }

    pub fn is_active(&self) -> bool {
        self.current.is_some()
    }

    pub fn config(&self) -> &CameraConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: CameraConfig) {
        self.config = config;
    }
}

impl Drop for StreamManager {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CrabSnapConfig;
    use crate::testing::{PlatformEvent, SyntheticMediaDevices};

    fn manager(devices: SyntheticMediaDevices) -> StreamManager {
        StreamManager::new(Box::new(devices), CrabSnapConfig::default().camera)
    }

    #[test]
    fn test_acquire_uses_viewport_and_facing() {
        let devices = SyntheticMediaDevices::new();
        let log = devices.events();
        let mut streams = manager(devices);

        let handle = streams
            .acquire(FacingMode::User, Some(Viewport::new(390, 844)))
            .unwrap();
        assert_eq!(handle.facing(), FacingMode::User);

        let requests = log.media_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].video.facing_mode, Some(FacingMode::User));
        assert_eq!(requests[0].video.ideal_width(), Some(390));
        assert_eq!(requests[0].video.ideal_height(), Some(844));
        assert!(!requests[0].audio);
    }

    #[test]
    fn test_acquire_defaults_to_configured_viewport() {
        let devices = SyntheticMediaDevices::new();
        let log = devices.events();
        let mut streams = manager(devices);

        streams.acquire(FacingMode::Environment, None).unwrap();
        let requests = log.media_requests();
        assert_eq!(requests[0].video.ideal_width(), Some(1280));
        assert_eq!(requests[0].video.ideal_height(), Some(720));
        assert_eq!(requests[0].video.ideal_frame_rate(), Some(30));
    }

    #[test]
    fn test_reacquire_stops_previous_first() {
        let devices = SyntheticMediaDevices::new();
        let log = devices.events();
        let mut streams = manager(devices);

        let first = streams
            .acquire(FacingMode::Environment, None)
            .unwrap()
            .video_track()
            .unwrap()
            .id()
            .to_string();
        streams.acquire(FacingMode::User, None).unwrap();

        let events = log.snapshot();
        let stop = events
            .iter()
            .position(|e| matches!(e, PlatformEvent::TrackStopped(id) if *id == first))
            .expect("first track stopped");
        let second_request = events
            .iter()
            .enumerate()
            .filter(|(_, e)| matches!(e, PlatformEvent::MediaRequested(_)))
            .nth(1)
            .map(|(i, _)| i)
            .expect("second request issued");
        assert!(stop < second_request);
    }

    #[test]
    fn test_failed_acquire_leaves_no_handle() {
        let devices = SyntheticMediaDevices::new();
        let control = devices.control();
        let mut streams = manager(devices);

        streams.acquire(FacingMode::Environment, None).unwrap();
        control.deny_access("Permission denied");

        let result = streams.acquire(FacingMode::User, None);
        assert!(matches!(result, Err(CameraError::DeviceUnavailable(_))));
        assert!(!streams.is_active());
    }

    #[test]
    fn test_release_is_idempotent() {
        let devices = SyntheticMediaDevices::new();
        let log = devices.events();
        let mut streams = manager(devices);

        streams.release();
        streams.acquire(FacingMode::Environment, None).unwrap();
        streams.release();
        streams.release();

        let stops = log
            .snapshot()
            .iter()
            .filter(|e| matches!(e, PlatformEvent::TrackStopped(_)))
            .count();
        assert_eq!(stops, 1);
        assert!(!streams.is_active());
    }
}
