//! Configuration management for CrabSnap
//!
//! Provides loading, saving and validation of camera preferences, capture
//! encoding, download location and share defaults.

use crate::errors::CameraError;
use crate::types::{FacingMode, Viewport};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Root configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrabSnapConfig {
    pub camera: CameraConfig,
    pub capture: CaptureConfig,
    pub storage: StorageConfig,
    pub share: ShareConfig,
}

/// Camera acquisition preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraConfig {
    /// Facing mode used when the host does not ask for one
    pub default_facing: FacingMode,
    /// Viewport [width, height] used to size requests when none is supplied
    pub default_viewport: [u32; 2],
    /// Ideal frames per second
    pub frame_rate: u32,
    /// Device index to use for the front camera
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_device: Option<u32>,
    /// Device index to use for the rear camera
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment_device: Option<u32>,
}

/// Encoding of captured frames
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// JPEG quality (1-100)
    pub jpeg_quality: u8,
}

/// Where downloads land
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    pub output_directory: String,
}

/// Metadata attached to shared photos when the host gives none
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShareConfig {
    pub default_title: String,
    pub default_text: String,
}

impl Default for CrabSnapConfig {
    fn default() -> Self {
        Self {
            camera: CameraConfig {
                default_facing: FacingMode::Environment,
                default_viewport: [1280, 720],
                frame_rate: 30,
                user_device: None,
                environment_device: None,
            },
            capture: CaptureConfig { jpeg_quality: 92 },
            storage: StorageConfig {
                output_directory: "./captures".to_string(),
            },
            share: ShareConfig {
                default_title: "Camera App Photo".to_string(),
                default_text: "Check out this photo I took!".to_string(),
            },
        }
    }
}

impl CameraConfig {
    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.default_viewport[0], self.default_viewport[1])
    }

    /// Configured device index for a facing mode, if any
    pub fn device_for(&self, facing: FacingMode) -> Option<u32> {
        match facing {
            FacingMode::User => self.user_device,
            FacingMode::Environment => self.environment_device,
        }
    }
}

/// Environment variable naming the config file used by the plugin
pub const CONFIG_PATH_ENV: &str = "CRABSNAP_CONFIG";

const DEFAULT_CONFIG_FILE: &str = "crabsnap.toml";

fn config_error(path: &Path, action: &str, detail: impl fmt::Display) -> CameraError {
    CameraError::Config(format!("{} {}: {}", action, path.display(), detail))
}

/// Prefix a validation failure with the file it concerns
fn locate(path: &Path, action: &str, error: CameraError) -> CameraError {
    match error {
        CameraError::Config(detail) => config_error(path, action, detail),
        other => other,
    }
}

impl CrabSnapConfig {
    /// Read and validate a TOML file. A missing file yields the defaults;
    /// sections absent from the file take their default values.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, CameraError> {
        let path = path.as_ref();

        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::info!("No config at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(e) => return Err(config_error(path, "cannot read", e)),
        };

        let config: CrabSnapConfig =
            toml::from_str(&contents).map_err(|e| config_error(path, "cannot parse", e))?;
        config
            .validate()
            .map_err(|e| locate(path, "invalid settings in", e))?;

        log::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Validate, then write as TOML, creating parent directories
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), CameraError> {
        let path = path.as_ref();
        self.validate()
            .map_err(|e| locate(path, "refusing to write", e))?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|e| config_error(parent, "cannot create directory", e))?;
        }

        let toml_string =
            toml::to_string_pretty(self).map_err(|e| config_error(path, "cannot serialize", e))?;
        fs::write(path, toml_string).map_err(|e| config_error(path, "cannot write", e))?;

        log::info!("Saved configuration to {}", path.display());
        Ok(())
    }

    /// `$CRABSNAP_CONFIG` when set and non-empty, else `crabsnap.toml`
    pub fn default_path() -> PathBuf {
        path_from_env(std::env::var_os(CONFIG_PATH_ENV))
    }

    /// Load from [`default_path`](Self::default_path). An unreadable or
    /// invalid file is logged and replaced by the defaults.
    pub fn load_or_default() -> Self {
        Self::load_from_file(Self::default_path()).unwrap_or_else(|e| {
            log::warn!("{}; using defaults", e);
            Self::default()
        })
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), CameraError> {
        let [width, height] = self.camera.default_viewport;
        if width == 0 || height == 0 {
            return Err(CameraError::Config("Invalid default viewport".to_string()));
        }
        if self.camera.frame_rate == 0 || self.camera.frame_rate > 240 {
            return Err(CameraError::Config(
                "Invalid frame rate (must be 1-240)".to_string(),
            ));
        }
        if self.capture.jpeg_quality == 0 || self.capture.jpeg_quality > 100 {
            return Err(CameraError::Config(
                "JPEG quality must be between 1 and 100".to_string(),
            ));
        }
        if self.storage.output_directory.trim().is_empty() {
            return Err(CameraError::Config(
                "Output directory must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

fn path_from_env(value: Option<OsString>) -> PathBuf {
    value
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CrabSnapConfig::default();
        assert_eq!(config.camera.default_facing, FacingMode::Environment);
        assert_eq!(config.camera.viewport(), Viewport::new(1280, 720));
        assert_eq!(config.share.default_title, "Camera App Photo");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut bad_viewport = CrabSnapConfig::default();
        bad_viewport.camera.default_viewport = [0, 720];
        assert!(bad_viewport.validate().is_err());

        let mut bad_quality = CrabSnapConfig::default();
        bad_quality.capture.jpeg_quality = 0;
        assert!(bad_quality.validate().is_err());

        let mut bad_fps = CrabSnapConfig::default();
        bad_fps.camera.frame_rate = 500;
        assert!(bad_fps.validate().is_err());
    }

    #[test]
    fn test_config_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("nested").join("crabsnap.toml");

        let mut config = CrabSnapConfig::default();
        config.camera.user_device = Some(2);
        config.capture.jpeg_quality = 80;
        config.save_to_file(&config_path).unwrap();

        let loaded = CrabSnapConfig::load_from_file(&config_path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.camera.device_for(FacingMode::User), Some(2));
        assert_eq!(loaded.camera.device_for(FacingMode::Environment), None);
    }

    #[test]
    fn test_config_toml_format() {
        let toml_string = toml::to_string_pretty(&CrabSnapConfig::default()).unwrap();
        assert!(toml_string.contains("[camera]"));
        assert!(toml_string.contains("[capture]"));
        assert!(toml_string.contains("[storage]"));
        assert!(toml_string.contains("[share]"));
        assert!(toml_string.contains("default_facing = \"environment\""));
        assert!(!toml_string.contains("user_device"));
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = CrabSnapConfig::load_from_file("nonexistent_crabsnap.toml");
        assert_eq!(result.unwrap(), CrabSnapConfig::default());
    }

    #[test]
    fn test_load_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        fs::write(&path, "camera = [").unwrap();
        match CrabSnapConfig::load_from_file(&path) {
            Err(CameraError::Config(message)) => {
                assert!(message.contains("cannot parse"), "{}", message);
                assert!(message.contains(&path.display().to_string()), "{}", message);
            }
            other => panic!("expected a config error, got {:?}", other),
        }
    }

    #[test]
    fn test_load_rejects_invalid_values_with_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("crabsnap.toml");
        let mut config = CrabSnapConfig::default();
        config.capture.jpeg_quality = 0;
        fs::write(&path, toml::to_string_pretty(&config).unwrap()).unwrap();

        match CrabSnapConfig::load_from_file(&path) {
            Err(CameraError::Config(message)) => {
                assert!(message.contains(&path.display().to_string()), "{}", message);
                assert!(message.contains("JPEG quality"), "{}", message);
            }
            other => panic!("expected a config error, got {:?}", other),
        }
    }

    #[test]
    fn test_save_refuses_invalid_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("crabsnap.toml");
        let mut config = CrabSnapConfig::default();
        config.storage.output_directory = " ".to_string();

        assert!(matches!(
            config.save_to_file(&path),
            Err(CameraError::Config(message)) if message.contains("refusing to write")
        ));
        assert!(!path.exists());
    }

    #[test]
    fn test_missing_sections_take_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("crabsnap.toml");
        fs::write(&path, "[capture]\njpeg_quality = 70\n").unwrap();

        let loaded = CrabSnapConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded.capture.jpeg_quality, 70);
        assert_eq!(loaded.camera, CrabSnapConfig::default().camera);
        assert_eq!(loaded.share, CrabSnapConfig::default().share);
    }

    #[test]
    fn test_path_from_env() {
        assert_eq!(path_from_env(None), PathBuf::from("crabsnap.toml"));
        assert_eq!(
            path_from_env(Some(OsString::new())),
            PathBuf::from("crabsnap.toml")
        );
        assert_eq!(
            path_from_env(Some(OsString::from("/etc/crabsnap/app.toml"))),
            PathBuf::from("/etc/crabsnap/app.toml")
        );
    }
}
