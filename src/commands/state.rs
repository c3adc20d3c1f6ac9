//! Shared plugin state.
//!
//! Commands run the synchronous session on the blocking pool. The mutex
//! serializes them, so two stream acquisitions never interleave.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::buffer::EncodedImage;
use crate::config::CrabSnapConfig;
use crate::errors::CameraError;
use crate::filters::FilterKind;
use crate::platform::DirectoryDownloads;
use crate::session::CameraSession;
use crate::types::{
    CapabilitySet, ConstraintRequest, FacingMode, FlashMode, StreamInfo, Viewport, ViewportRect,
};

#[derive(Clone)]
pub struct CameraState {
    session: Arc<Mutex<CameraSession>>,
    config_path: Option<PathBuf>,
    downloads_follow_config: bool,
}

impl CameraState {
    /// Wrap a session. Configuration changes are kept in memory only.
    pub fn new(session: CameraSession) -> Self {
        Self {
            session: Arc::new(Mutex::new(session)),
            config_path: None,
            downloads_follow_config: false,
        }
    }

    /// Native session persisting configuration to `config_path`. Changing
    /// the storage section moves downloads to the new directory.
    pub fn native(config: CrabSnapConfig, config_path: PathBuf) -> Self {
        Self {
            session: Arc::new(Mutex::new(CameraSession::native(config))),
            config_path: Some(config_path),
            downloads_follow_config: true,
        }
    }

    /// Persist configuration changes to `path`
    pub fn with_config_path(mut self, path: PathBuf) -> Self {
        self.config_path = Some(path);
        self
    }

    async fn run<T, F>(&self, operation: F) -> Result<T, CameraError>
    where
        T: Send + 'static,
        F: FnOnce(&mut CameraSession) -> Result<T, CameraError> + Send + 'static,
    {
        let session = Arc::clone(&self.session);
        tokio::task::spawn_blocking(move || {
            let mut guard = session
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            operation(&mut *guard)
        })
        .await
        .map_err(|e| CameraError::CaptureFailed(format!("Camera task failed: {}", e)))?
    }

    pub async fn init_camera(
        &self,
        facing: Option<FacingMode>,
        viewport: Option<Viewport>,
    ) -> Result<StreamInfo, CameraError> {
        self.run(move |session| session.start_camera(facing, viewport))
            .await
    }

    pub async fn release_camera(&self) -> Result<(), CameraError> {
        self.run(|session| {
            session.stop_camera();
            Ok(())
        })
        .await
    }

    pub async fn update_camera_settings(
        &self,
        settings: ConstraintRequest,
    ) -> Result<bool, CameraError> {
        self.run(move |session| Ok(session.update_settings(&settings)))
            .await
    }

    pub async fn set_flash_mode(&self, mode: FlashMode) -> Result<bool, CameraError> {
        self.run(move |session| Ok(session.set_flash_mode(mode)))
            .await
    }

    pub async fn set_camera_focus(
        &self,
        x: f64,
        y: f64,
        rect: ViewportRect,
    ) -> Result<bool, CameraError> {
        self.run(move |session| Ok(session.set_focus_point(x, y, &rect)))
            .await
    }

    pub async fn get_camera_capabilities(&self) -> Result<CapabilitySet, CameraError> {
        self.run(|session| Ok(session.capabilities())).await
    }

    pub async fn capture_image(&self) -> Result<EncodedImage, CameraError> {
        self.run(|session| session.capture()).await
    }

    pub async fn apply_image_filter(&self, filter: String) -> Result<FilterKind, CameraError> {
        self.run(move |session| session.apply_filter_by_name(&filter))
            .await
    }

    pub async fn adjust_brightness_and_contrast(
        &self,
        brightness: f32,
        contrast: f32,
    ) -> Result<(), CameraError> {
        self.run(move |session| session.adjust_brightness_contrast(brightness, contrast))
            .await
    }

    pub async fn save_image(&self, filename: Option<String>) -> Result<String, CameraError> {
        self.run(move |session| session.save(filename.as_deref()))
            .await
    }

    pub async fn share_image(
        &self,
        title: Option<String>,
        text: Option<String>,
    ) -> Result<bool, CameraError> {
        self.run(move |session| session.share(title.as_deref(), text.as_deref()))
            .await
    }

    pub async fn get_config(&self) -> Result<CrabSnapConfig, CameraError> {
        self.run(|session| Ok(session.config().clone())).await
    }

    pub async fn update_config(&self, config: CrabSnapConfig) -> Result<(), CameraError> {
        let config_path = self.config_path.clone();
        let downloads_follow_config = self.downloads_follow_config;
        self.run(move |session| {
            session.update_config(config.clone())?;
            if downloads_follow_config {
                session.set_download_target(Box::new(DirectoryDownloads::new(
                    &config.storage.output_directory,
                )));
            }
            if let Some(path) = config_path {
                config.save_to_file(path)?;
            }
            Ok(())
        })
        .await
    }

    pub async fn reset_config(&self) -> Result<CrabSnapConfig, CameraError> {
        let defaults = CrabSnapConfig::default();
        self.update_config(defaults.clone()).await?;
        Ok(defaults)
    }
}
