//! CrabSnap: camera capture and photo editing for Tauri applications
//!
//! This crate drives a single device camera through a capture session:
//! acquire a stream for the front or rear camera, toggle the torch and
//! request focus, snapshot frames into a working buffer, edit it with photo
//! filters, and save or share the result as JPEG.
//!
//! # Usage
//! Add this to your `Cargo.toml`:
//! ```toml
//! [dependencies]
//! crabsnap = "0.1"
//! tauri = "2.0"
//! ```
//!
//! Then in your Tauri app:
//! ```rust,ignore
//! use crabsnap;
//!
//! fn main() {
//!     tauri::Builder::default()
//!         .plugin(crabsnap::init())
//!         .run(tauri::generate_context!())
//!         .expect("error while running tauri application");
//! }
//! ```
//!
//! Without Tauri, build a [`CameraSession`] directly:
//! ```rust,ignore
//! let mut session = crabsnap::CameraSession::native(crabsnap::CrabSnapConfig::load_or_default());
//! session.start_camera(None, None)?;
//! session.capture()?;
//! session.apply_filter(crabsnap::FilterKind::Vintage)?;
//! let file_name = session.save(None)?;
//! ```
pub mod buffer;
pub mod capture;
pub mod commands;
pub mod config;
pub mod controls;
pub mod errors;
pub mod filters;
pub mod output;
pub mod platform;
pub mod session;
pub mod stream;
pub mod types;

// Testing utilities - synthetic platform for offline testing
pub mod testing;

// Re-exports for convenience
pub use buffer::{EncodedImage, PixelBuffer};
pub use commands::CameraState;
pub use config::CrabSnapConfig;
pub use errors::CameraError;
pub use filters::FilterKind;
pub use session::CameraSession;
pub use types::{
    Capability, CapabilitySet, ConstraintRequest, ConstraintValue, FacingMode, FlashMode,
    Platform, StreamInfo, Viewport, ViewportRect,
};

use tauri::{
    plugin::{Builder, TauriPlugin},
    Manager, Runtime,
};

/// Commands the plugin registers, in `generate_handler!` order
pub const COMMANDS: [&str; 14] = [
    "init_camera",
    "release_camera",
    "update_camera_settings",
    "set_flash_mode",
    "set_camera_focus",
    "get_camera_capabilities",
    "capture_image",
    "apply_image_filter",
    "adjust_brightness_and_contrast",
    "save_image",
    "share_image",
    "get_config",
    "update_config",
    "reset_config",
];

/// Initialize the CrabSnap plugin with all commands
pub fn init<R: Runtime>() -> TauriPlugin<R> {
    Builder::new("crabsnap")
        .invoke_handler(tauri::generate_handler![
            // Camera lifecycle
            commands::init_camera,
            commands::release_camera,
            // Track controls
            commands::update_camera_settings,
            commands::set_flash_mode,
            commands::set_camera_focus,
            commands::get_camera_capabilities,
            // Capture and editing
            commands::capture_image,
            commands::apply_image_filter,
            commands::adjust_brightness_and_contrast,
            // Output
            commands::save_image,
            commands::share_image,
            // Configuration commands
            commands::get_config,
            commands::update_config,
            commands::reset_config,
        ])
        .setup(|app, _api| {
            let path = CrabSnapConfig::default_path();
            let config = CrabSnapConfig::load_from_file(&path).unwrap_or_else(|e| {
                log::warn!("{}; starting with defaults", e);
                CrabSnapConfig::default()
            });
            log::info!(
                "CrabSnap {} on {} with config {}",
                VERSION,
                Platform::current().as_str(),
                path.display()
            );
            app.manage(CameraState::native(config, path));
            Ok(())
        })
        .build()
}

/// Default filter for [`init_logging`] when `RUST_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "crabsnap=info";

/// Install `env_logger`, honouring `RUST_LOG` and otherwise logging this
/// crate at info level. Calling it again is a no-op.
pub fn init_logging() {
    let env = env_logger::Env::default().default_filter_or(DEFAULT_LOG_FILTER);
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp_millis()
        .try_init();
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// What this build offers a host: its commands, supported filters, platform
/// and the config file the plugin would load
pub fn get_info() -> CrateInfo {
    CrateInfo {
        name: NAME.to_string(),
        version: VERSION.to_string(),
        platform: Platform::current(),
        commands: COMMANDS.iter().map(|c| c.to_string()).collect(),
        filters: FilterKind::ALL.iter().map(|f| f.to_string()).collect(),
        config_path: CrabSnapConfig::default_path().display().to_string(),
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrateInfo {
    pub name: String,
    pub version: String,
    pub platform: Platform,
    pub commands: Vec<String>,
    pub filters: Vec<String>,
    pub config_path: String,
}

#[cfg(test)]
mod lib_tests {
    use super::*;

    #[test]
    fn test_crate_info_lists_commands_and_filters() {
        let info = get_info();
        assert_eq!(info.name, "crabsnap");
        assert!(!info.version.is_empty());
        assert_eq!(info.platform, Platform::current());
        assert_eq!(info.commands.len(), 14);
        assert!(info.commands.iter().any(|c| c == "capture_image"));
        assert!(info.filters.iter().any(|f| f == "sepia"));
        assert!(!info.config_path.is_empty());
    }

    #[test]
    fn test_crate_info_serializes_camel_case() {
        let json = serde_json::to_value(get_info()).unwrap();
        assert!(json["configPath"].is_string());
        assert_eq!(json["commands"][0], "init_camera");
    }

    #[test]
    fn test_init_logging_is_repeatable() {
        init_logging();
        init_logging();
        log::info!("logging initialised twice");
    }
}
