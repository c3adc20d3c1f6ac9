use tauri::{command, State};

use super::state::CameraState;
use crate::config::CrabSnapConfig;

/// Get the current configuration
#[command]
pub async fn get_config(state: State<'_, CameraState>) -> Result<CrabSnapConfig, String> {
    state.get_config().await.map_err(|e| e.to_string())
}

/// Validate, apply and persist a new configuration
#[command]
pub async fn update_config(
    state: State<'_, CameraState>,
    new_config: CrabSnapConfig,
) -> Result<(), String> {
    state
        .update_config(new_config)
        .await
        .map_err(|e| e.to_string())
}

/// Reset configuration to defaults
#[command]
pub async fn reset_config(state: State<'_, CameraState>) -> Result<CrabSnapConfig, String> {
    state
        .reset_config()
        .await
        .map_err(|e| format!("Failed to reset config: {}", e))
}
