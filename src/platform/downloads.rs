use std::fs;
use std::path::{Path, PathBuf};

use super::DownloadTarget;
use crate::buffer::EncodedImage;
use crate::errors::CameraError;

/// Writes downloads into a local directory, creating it on first use
#[derive(Debug, Clone)]
pub struct DirectoryDownloads {
    directory: PathBuf,
}

impl DirectoryDownloads {
    pub fn new<P: Into<PathBuf>>(directory: P) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }
}

impl DownloadTarget for DirectoryDownloads {
    fn download(&mut self, file_name: &str, image: &EncodedImage) -> Result<(), CameraError> {
        // Only a bare file name, never a path
        let name = Path::new(file_name);
        if name.file_name().map(|n| n != name.as_os_str()).unwrap_or(true) {
            return Err(CameraError::InvalidParameter(format!(
                "download name must be a plain file name: {}",
                file_name
            )));
        }

        fs::create_dir_all(&self.directory)?;
        let path = self.directory.join(name);
        fs::write(&path, image.bytes())?;
        log::info!("Downloaded {} bytes to {}", image.len(), path.display());
        Ok(())
    }
}
