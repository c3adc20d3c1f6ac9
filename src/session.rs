//! The camera session a host application drives.
//!
//! Owns the stream manager, the working pixel buffer and the output
//! dispatcher. Photos are captured into the working buffer, edited there in
//! place, and exported from it when saved or shared.

use crate::buffer::{EncodedImage, PixelBuffer};
use crate::capture::FrameCapturer;
use crate::config::CrabSnapConfig;
use crate::controls;
use crate::errors::CameraError;
use crate::filters::{self, FilterKind};
use crate::output::OutputDispatcher;
use crate::platform::{
    DirectoryDownloads, DownloadTarget, MediaDevices, NativeMediaDevices, ShareTarget,
};
use crate::stream::StreamManager;
use crate::types::{
    CapabilitySet, ConstraintRequest, FacingMode, FlashMode, StreamInfo, Viewport, ViewportRect,
};

pub struct CameraSession {
    config: CrabSnapConfig,
    streams: StreamManager,
    capturer: FrameCapturer,
    buffer: PixelBuffer,
    last_capture: Option<EncodedImage>,
    output: OutputDispatcher,
}

impl CameraSession {
    pub fn new(
        config: CrabSnapConfig,
        devices: Box<dyn MediaDevices>,
        downloads: Box<dyn DownloadTarget>,
        share: Option<Box<dyn ShareTarget>>,
    ) -> Self {
        Self {
            streams: StreamManager::new(devices, config.camera.clone()),
            capturer: FrameCapturer::new(config.capture.jpeg_quality),
            buffer: PixelBuffer::new(0, 0),
            last_capture: None,
            output: OutputDispatcher::new(downloads, share, config.share.clone()),
            config,
        }
    }

    /// Session over nokhwa devices saving into the configured output
    /// directory. Desktop platforms have no share sheet.
    pub fn native(config: CrabSnapConfig) -> Self {
        let devices = NativeMediaDevices::new(config.camera.clone());
        let downloads = DirectoryDownloads::new(&config.storage.output_directory);
        Self::new(config, Box::new(devices), Box::new(downloads), None)
    }

    pub fn config(&self) -> &CrabSnapConfig {
        &self.config
    }

    /// Validate and apply a new configuration. The active stream keeps its
    /// current mode until the camera is restarted.
    pub fn update_config(&mut self, config: CrabSnapConfig) -> Result<(), CameraError> {
        config.validate()?;
        self.streams.set_config(config.camera.clone());
        self.capturer = FrameCapturer::new(config.capture.jpeg_quality);
        self.output.set_defaults(config.share.clone());
        self.config = config;
        log::info!("Camera configuration updated");
        Ok(())
    }

    pub fn set_download_target(&mut self, downloads: Box<dyn DownloadTarget>) {
        self.output.set_download_target(downloads);
    }

    pub fn set_share_target(&mut self, share: Option<Box<dyn ShareTarget>>) {
        self.output.set_share_target(share);
    }

    /// Acquire a stream for `facing` (configured default when `None`),
    /// replacing any active one
    pub fn start_camera(
        &mut self,
        facing: Option<FacingMode>,
        viewport: Option<Viewport>,
    ) -> Result<StreamInfo, CameraError> {
        let facing = facing.unwrap_or(self.config.camera.default_facing);
        let handle = self.streams.acquire(facing, viewport)?;
        let track = handle.video_track().ok_or(CameraError::NoActiveStream)?;
        let (width, height) = track.frame_size();

        Ok(StreamInfo {
            id: handle.id().to_string(),
            facing: handle.facing(),
            label: track.label().to_string(),
            width,
            height,
            capabilities: track.capabilities(),
        })
    }

    pub fn stop_camera(&mut self) {
        self.streams.release();
    }

    pub fn is_streaming(&self) -> bool {
        self.streams.is_active()
    }

    pub fn facing(&self) -> Option<FacingMode> {
        self.streams.current().map(|handle| handle.facing())
    }

    pub fn capabilities(&self) -> CapabilitySet {
        controls::probe(self.streams.current())
    }

    pub fn update_settings(&mut self, settings: &ConstraintRequest) -> bool {
        controls::apply_settings(self.streams.current_mut(), settings)
    }

    pub fn set_flash_mode(&mut self, mode: FlashMode) -> bool {
        controls::set_flash_mode(self.streams.current_mut(), mode)
    }

    pub fn set_torch(&mut self, on: bool) -> bool {
        controls::set_torch(self.streams.current_mut(), on)
    }

    pub fn set_focus_point(&mut self, x: f64, y: f64, rect: &ViewportRect) -> bool {
        controls::set_focus_point(self.streams.current_mut(), x, y, rect)
    }

    /// Snapshot the live frame into the working buffer
    pub fn capture(&mut self) -> Result<EncodedImage, CameraError> {
        let image = self
            .capturer
            .capture(self.streams.current_mut(), Some(&mut self.buffer))?;
        self.last_capture = Some(image.clone());
        Ok(image)
    }

    /// The image as captured, before any edits
    pub fn last_capture(&self) -> Option<&EncodedImage> {
        self.last_capture.as_ref()
    }

    pub fn has_image(&self) -> bool {
        self.last_capture.is_some()
    }

    /// The working buffer, once a photo has been captured
    pub fn image(&self) -> Option<&PixelBuffer> {
        self.has_image().then_some(&self.buffer)
    }

    fn working_buffer(&mut self) -> Result<&mut PixelBuffer, CameraError> {
        if self.has_image() {
            Ok(&mut self.buffer)
        } else {
            Err(CameraError::NoImage)
        }
    }

    pub fn apply_filter(&mut self, kind: FilterKind) -> Result<(), CameraError> {
        kind.apply(self.working_buffer()?);
        log::debug!("Applied {} filter", kind);
        Ok(())
    }

    pub fn apply_filter_by_name(&mut self, tag: &str) -> Result<FilterKind, CameraError> {
        let kind = filters::apply_filter_by_name(self.working_buffer()?, tag)?;
        log::debug!("Applied {} filter", kind);
        Ok(kind)
    }

    pub fn adjust_brightness_contrast(
        &mut self,
        brightness: f32,
        contrast: f32,
    ) -> Result<(), CameraError> {
        filters::adjust_brightness_contrast(self.working_buffer()?, brightness, contrast)
    }

    /// Encode the working buffer with every edit applied so far
    pub fn export(&self) -> Result<EncodedImage, CameraError> {
        let buffer = self.image().ok_or(CameraError::NoImage)?;
        self.capturer.export(buffer)
    }

    /// Save the edited photo, returning the file name used
    pub fn save(&mut self, filename: Option<&str>) -> Result<String, CameraError> {
        let image = self.export()?;
        self.output.save(&image, filename)
    }

    pub fn share(&mut self, title: Option<&str>, text: Option<&str>) -> Result<bool, CameraError> {
        let image = self.export()?;
        self.output.share(&image, title, text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{EventLog, MemoryDownloads, RecordingShareTarget, SyntheticMediaDevices};
    use crate::types::Capability;

    fn session(devices: SyntheticMediaDevices, log: &EventLog) -> CameraSession {
        CameraSession::new(
            CrabSnapConfig::default(),
            Box::new(devices.with_event_log(log.clone())),
            Box::new(MemoryDownloads::new(log.clone())),
            Some(Box::new(RecordingShareTarget::new(log.clone()))),
        )
    }

    #[test]
    fn test_start_camera_reports_stream() {
        let log = EventLog::default();
        let mut session = session(SyntheticMediaDevices::new().with_frame_size(40, 30), &log);

        let info = session.start_camera(None, None).unwrap();
        assert_eq!(info.facing, FacingMode::Environment);
        assert_eq!((info.width, info.height), (40, 30));
        assert!(info.capabilities.supports(Capability::Torch));
        assert!(session.is_streaming());

        session.stop_camera();
        assert!(!session.is_streaming());
        assert!(session.capabilities().is_empty());
    }

    #[test]
    fn test_edits_need_a_capture() {
        let log = EventLog::default();
        let mut session = session(SyntheticMediaDevices::new(), &log);
        session.start_camera(None, None).unwrap();

        assert!(matches!(
            session.apply_filter(FilterKind::Sepia),
            Err(CameraError::NoImage)
        ));
        assert!(matches!(session.save(None), Err(CameraError::NoImage)));
        assert!(matches!(session.share(None, None), Err(CameraError::NoImage)));
    }

    #[test]
    fn test_capture_without_stream() {
        let log = EventLog::default();
        let mut session = session(SyntheticMediaDevices::new(), &log);
        assert!(matches!(session.capture(), Err(CameraError::NoActiveStream)));
        assert!(!session.has_image());
    }

    #[test]
    fn test_filter_edits_working_buffer() {
        let log = EventLog::default();
        let mut session = session(SyntheticMediaDevices::new().with_frame_size(8, 8), &log);
        session.start_camera(None, None).unwrap();
        session.capture().unwrap();

        session.apply_filter_by_name("grayscale").unwrap();
        assert_ne!(
            session.export().unwrap().bytes(),
            session.last_capture().unwrap().bytes()
        );
        let buffer = session.image().unwrap();
        for pixel in buffer.as_bytes().chunks_exact(4) {
            assert_eq!(pixel[0], pixel[1]);
            assert_eq!(pixel[1], pixel[2]);
        }
    }

    #[test]
    fn test_failed_recapture_keeps_edited_photo() {
        let log = EventLog::default();
        let devices = SyntheticMediaDevices::new().with_frame_size(8, 8);
        let control = devices.control();
        let mut session = session(devices, &log);
        session.start_camera(None, None).unwrap();
        session.capture().unwrap();
        session.apply_filter(FilterKind::Sepia).unwrap();
        let edited = session.image().unwrap().clone();
        let exported = session.export().unwrap();

        control.fail_frames(true);
        assert!(matches!(session.capture(), Err(CameraError::CaptureFailed(_))));

        assert!(session.has_image());
        assert_eq!(session.image(), Some(&edited));
        assert_eq!(session.export().unwrap().bytes(), exported.bytes());
        assert_eq!(session.save(Some("kept.jpg")).unwrap(), "kept.jpg");
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let log = EventLog::default();
        let mut session = session(SyntheticMediaDevices::new(), &log);
        let mut config = CrabSnapConfig::default();
        config.capture.jpeg_quality = 0;
        assert!(matches!(
            session.update_config(config),
            Err(CameraError::Config(_))
        ));
        assert_eq!(session.config().capture.jpeg_quality, 92);
    }

    #[test]
    fn test_config_default_facing_applies() {
        let log = EventLog::default();
        let mut session = session(SyntheticMediaDevices::new(), &log);
        let mut config = CrabSnapConfig::default();
        config.camera.default_facing = FacingMode::User;
        session.update_config(config).unwrap();

        let info = session.start_camera(None, None).unwrap();
        assert_eq!(info.facing, FacingMode::User);
        assert_eq!(session.facing(), Some(FacingMode::User));
    }
}
