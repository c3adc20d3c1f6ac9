//! Save and share of encoded photos.

use chrono::Utc;

use crate::buffer::EncodedImage;
use crate::config::ShareConfig;
use crate::errors::CameraError;
use crate::platform::{DownloadTarget, SharePayload, ShareTarget};

/// `camera_<epoch-ms>.jpg`
pub fn default_filename(epoch_ms: i64) -> String {
    format!("camera_{}.jpg", epoch_ms)
}

fn timestamped_filename() -> String {
    default_filename(Utc::now().timestamp_millis())
}

pub struct OutputDispatcher {
    downloads: Box<dyn DownloadTarget>,
    share: Option<Box<dyn ShareTarget>>,
    defaults: ShareConfig,
}

impl OutputDispatcher {
    pub fn new(
        downloads: Box<dyn DownloadTarget>,
        share: Option<Box<dyn ShareTarget>>,
        defaults: ShareConfig,
    ) -> Self {
        Self {
            downloads,
            share,
            defaults,
        }
    }

    pub fn can_share(&self) -> bool {
        self.share.is_some()
    }

    pub fn set_download_target(&mut self, downloads: Box<dyn DownloadTarget>) {
        self.downloads = downloads;
    }

    pub fn set_share_target(&mut self, share: Option<Box<dyn ShareTarget>>) {
        self.share = share;
    }

    pub fn set_defaults(&mut self, defaults: ShareConfig) {
        self.defaults = defaults;
    }

    /// Download the image, returning the file name used
    pub fn save(
        &mut self,
        image: &EncodedImage,
        filename: Option<&str>,
    ) -> Result<String, CameraError> {
        let name = match filename {
            Some(name) if !name.trim().is_empty() => name.to_string(),
            _ => timestamped_filename(),
        };
        self.downloads.download(&name, image)?;
        log::info!("Saved image as {}", name);
        Ok(name)
    }

    /// Hand the image to the share sheet.
    ///
    /// `Ok(false)` when the platform has no share capability; a refused or
    /// cancelled share is `ShareRejected`.
    pub fn share(
        &mut self,
        image: &EncodedImage,
        title: Option<&str>,
        text: Option<&str>,
    ) -> Result<bool, CameraError> {
        let Some(target) = self.share.as_mut() else {
            log::debug!("No share capability available");
            return Ok(false);
        };

        let payload = SharePayload {
            title: non_empty(title).unwrap_or(&self.defaults.default_title).to_string(),
            text: non_empty(text).unwrap_or(&self.defaults.default_text).to_string(),
            file_name: timestamped_filename(),
            image: image.clone(),
        };
        let file_name = payload.file_name.clone();

        match target.share(payload) {
            Ok(()) => {
                log::info!("Shared image as {}", file_name);
                Ok(true)
            }
            Err(e) => {
                log::error!("Error sharing image: {}", e);
                Err(match e {
                    CameraError::ShareRejected(_) => e,
                    other => CameraError::ShareRejected(other.to_string()),
                })
            }
        }
    }
}

/// Empty strings count as absent
fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
