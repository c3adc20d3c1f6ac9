use tauri::{command, State};

use super::state::CameraState;
use crate::buffer::EncodedImage;
use crate::filters::FilterKind;
use crate::types::{
    CapabilitySet, ConstraintRequest, FacingMode, FlashMode, StreamInfo, Viewport, ViewportRect,
};

/// Start the camera, replacing any active stream
#[command]
pub async fn init_camera(
    state: State<'_, CameraState>,
    facing_mode: Option<FacingMode>,
    viewport: Option<Viewport>,
) -> Result<StreamInfo, String> {
    log::info!("Initializing camera: {:?}", facing_mode);
    state
        .init_camera(facing_mode, viewport)
        .await
        .map_err(|e| format!("Failed to start camera: {}", e))
}

#[command]
pub async fn release_camera(state: State<'_, CameraState>) -> Result<(), String> {
    state.release_camera().await.map_err(|e| e.to_string())
}

#[command]
pub async fn update_camera_settings(
    state: State<'_, CameraState>,
    settings: ConstraintRequest,
) -> Result<bool, String> {
    state
        .update_camera_settings(settings)
        .await
        .map_err(|e| e.to_string())
}

#[command]
pub async fn set_flash_mode(
    state: State<'_, CameraState>,
    mode: FlashMode,
) -> Result<bool, String> {
    state.set_flash_mode(mode).await.map_err(|e| e.to_string())
}

/// Manual focus after a tap on the preview element
#[command]
pub async fn set_camera_focus(
    state: State<'_, CameraState>,
    x: f64,
    y: f64,
    rect: ViewportRect,
) -> Result<bool, String> {
    state
        .set_camera_focus(x, y, rect)
        .await
        .map_err(|e| e.to_string())
}

#[command]
pub async fn get_camera_capabilities(
    state: State<'_, CameraState>,
) -> Result<CapabilitySet, String> {
    state
        .get_camera_capabilities()
        .await
        .map_err(|e| e.to_string())
}

#[command]
pub async fn capture_image(state: State<'_, CameraState>) -> Result<EncodedImage, String> {
    state.capture_image().await.map_err(|e| {
        log::error!("Failed to capture image: {}", e);
        format!("Failed to capture image: {}", e)
    })
}

#[command]
pub async fn apply_image_filter(
    state: State<'_, CameraState>,
    filter: String,
) -> Result<FilterKind, String> {
    state
        .apply_image_filter(filter)
        .await
        .map_err(|e| e.to_string())
}

#[command]
pub async fn adjust_brightness_and_contrast(
    state: State<'_, CameraState>,
    brightness: f32,
    contrast: f32,
) -> Result<(), String> {
    state
        .adjust_brightness_and_contrast(brightness, contrast)
        .await
        .map_err(|e| e.to_string())
}

/// Save the edited photo; returns the file name used
#[command]
pub async fn save_image(
    state: State<'_, CameraState>,
    filename: Option<String>,
) -> Result<String, String> {
    state
        .save_image(filename)
        .await
        .map_err(|e| format!("Failed to save image: {}", e))
}

#[command]
pub async fn share_image(
    state: State<'_, CameraState>,
    title: Option<String>,
    text: Option<String>,
) -> Result<bool, String> {
    state
        .share_image(title, text)
        .await
        .map_err(|e| e.to_string())
}
