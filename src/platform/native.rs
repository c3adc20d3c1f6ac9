use image::RgbaImage;
use nokhwa::{
    pixel_format::RgbFormat,
    query,
    utils::{
        ApiBackend, CameraFormat, CameraInfo, ControlValueDescription, ControlValueSetter,
        FrameFormat, KnownCameraControl, RequestedFormat, RequestedFormatType, Resolution,
    },
    Camera,
};
use uuid::Uuid;

use super::torch::TorchLed;
use super::{CaptureHandle, MediaDevices, VideoTrack};
use crate::config::CameraConfig;
use crate::errors::CameraError;
use crate::types::{Capability, CapabilitySet, ConstraintRequest, FacingMode, StreamConstraints};

const FRONT_HINTS: [&str; 4] = ["front", "user", "face", "integrated"];
const REAR_HINTS: [&str; 4] = ["back", "rear", "environment", "world"];

/// Local camera devices through nokhwa
pub struct NativeMediaDevices {
    config: CameraConfig,
}

impl NativeMediaDevices {
    pub fn new(config: CameraConfig) -> Self {
        Self { config }
    }
}

impl MediaDevices for NativeMediaDevices {
    fn get_user_media(
        &mut self,
        constraints: &StreamConstraints,
    ) -> Result<CaptureHandle, CameraError> {
        let video = &constraints.video;
        let facing = video.facing_mode.unwrap_or(self.config.default_facing);

        let devices = query(ApiBackend::Auto).map_err(|e| {
            CameraError::DeviceUnavailable(format!("Failed to query cameras: {}", e))
        })?;
        if devices.is_empty() {
            return Err(CameraError::DeviceUnavailable(
                "No camera devices found".to_string(),
            ));
        }

        let labels: Vec<String> = devices.iter().map(CameraInfo::human_name).collect();
        let position = select_device(&labels, facing, self.config.device_for(facing));
        let info = &devices[position];

        let viewport = self.config.viewport();
        let width = video.ideal_width().unwrap_or(viewport.width);
        let height = video.ideal_height().unwrap_or(viewport.height);
        let fps = video.ideal_frame_rate().unwrap_or(self.config.frame_rate);

        log::debug!(
            "Opening camera '{}' for {} facing, ideal {}x{}@{}",
            info.human_name(),
            facing,
            width,
            height,
            fps
        );

        let requested = RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(
            CameraFormat::new(Resolution::new(width, height), FrameFormat::MJPEG, fps),
        ));

        let mut camera = Camera::new(info.index().clone(), requested).map_err(|e| {
            CameraError::DeviceUnavailable(format!("Failed to initialize camera: {}", e))
        })?;
        camera.open_stream().map_err(|e| {
            CameraError::DeviceUnavailable(format!("Failed to start stream: {}", e))
        })?;

        let track = NativeVideoTrack::new(camera, info.human_name(), TorchLed::discover());
        Ok(CaptureHandle::new(facing, vec![Box::new(track) as Box<dyn VideoTrack>]))
    }
}

/// Pick a device for a facing mode: configured position, then label hints,
/// then the first device
pub fn select_device(labels: &[String], facing: FacingMode, configured: Option<u32>) -> usize {
    if let Some(position) = configured.map(|p| p as usize) {
        if position < labels.len() {
            return position;
        }
        log::warn!(
            "Configured {} camera {} not present ({} devices)",
            facing,
            position,
            labels.len()
        );
    }

    let hints: &[&str] = match facing {
        FacingMode::User => &FRONT_HINTS,
        FacingMode::Environment => &REAR_HINTS,
    };

    labels
        .iter()
        .position(|label| {
            let label = label.to_lowercase();
            hints.iter().any(|hint| label.contains(hint))
        })
        .unwrap_or(0)
}

/// A nokhwa camera exposed as a video track
pub struct NativeVideoTrack {
    id: String,
    label: String,
    camera: Camera,
    torch: Option<TorchLed>,
    capabilities: CapabilitySet,
    live: bool,
}

// The camera is only reached through `&mut self`, and the session holding
// the track sits behind a mutex.
unsafe impl Send for NativeVideoTrack {}

impl NativeVideoTrack {
    fn new(camera: Camera, label: String, torch: Option<TorchLed>) -> Self {
        let mut capabilities = CapabilitySet::empty().with(Capability::ApplyConstraints);

        match camera.camera_controls() {
            Ok(controls) => {
                if controls
                    .iter()
                    .any(|c| c.control() == KnownCameraControl::Focus)
                {
                    capabilities.insert(Capability::ManualFocus);
                }
            }
            Err(e) => log::debug!("Camera controls unavailable for '{}': {}", label, e),
        }

        if torch.is_some() {
            capabilities.insert(Capability::Torch);
        }

        Self {
            id: Uuid::new_v4().to_string(),
            label,
            camera,
            torch,
            capabilities,
            live: true,
        }
    }

    fn focus_control_value(&mut self, distance: f64) -> Result<i64, CameraError> {
        let controls = self
            .camera
            .camera_controls()
            .map_err(|e| CameraError::PlatformRejected(format!("Failed to read controls: {}", e)))?;

        let focus = controls
            .into_iter()
            .find(|c| c.control() == KnownCameraControl::Focus)
            .ok_or_else(|| CameraError::CapabilityUnsupported("manual focus".to_string()))?;

        match focus.description() {
            ControlValueDescription::IntegerRange { min, max, .. } => {
                let span = (*max - *min) as f64;
                Ok(*min + (span * distance.clamp(0.0, 1.0)).round() as i64)
            }
            other => Err(CameraError::PlatformRejected(format!(
                "Focus control is not an integer range: {:?}",
                other
            ))),
        }
    }
}

impl VideoTrack for NativeVideoTrack {
    fn id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> &str {
        &self.label
    }

    fn capabilities(&self) -> CapabilitySet {
        self.capabilities.clone()
    }

    fn apply_constraints(&mut self, constraints: &ConstraintRequest) -> Result<(), CameraError> {
        if constraints.width.is_some() || constraints.height.is_some() {
            let current = self.camera.resolution();
            let resolution = Resolution::new(
                constraints.ideal_width().unwrap_or(current.width_x),
                constraints.ideal_height().unwrap_or(current.height_y),
            );
            self.camera.set_resolution(resolution).map_err(|e| {
                CameraError::PlatformRejected(format!("Failed to set resolution: {}", e))
            })?;
        }

        if let Some(fps) = constraints.ideal_frame_rate() {
            self.camera.set_frame_rate(fps).map_err(|e| {
                CameraError::PlatformRejected(format!("Failed to set frame rate: {}", e))
            })?;
        }

        if constraints.facing_mode.is_some() {
            log::debug!("facingMode cannot change on an open track, ignored");
        }

        if let Some(on) = constraints.requested_torch() {
            let led = self
                .torch
                .as_ref()
                .ok_or_else(|| CameraError::CapabilityUnsupported("torch".to_string()))?;
            led.set(on).map_err(|e| {
                CameraError::PlatformRejected(format!("Failed to switch {}: {}", led.name(), e))
            })?;
        }

        if let Some(distance) = constraints.requested_focus_distance() {
            let value = self.focus_control_value(distance)?;
            self.camera
                .set_camera_control(KnownCameraControl::Focus, ControlValueSetter::Integer(value))
                .map_err(|e| CameraError::PlatformRejected(format!("Failed to set focus: {}", e)))?;
        }

        Ok(())
    }

    fn frame_size(&self) -> (u32, u32) {
        let resolution = self.camera.resolution();
        (resolution.width_x, resolution.height_y)
    }

    fn read_frame(&mut self) -> Result<RgbaImage, CameraError> {
        if !self.live {
            return Err(CameraError::NoActiveStream);
        }

        let frame = self
            .camera
            .frame()
            .map_err(|e| CameraError::CaptureFailed(format!("Failed to capture frame: {}", e)))?;

        let resolution = frame.resolution();
        let raw = frame.buffer_bytes();
        log::debug!(
            "Raw frame: {}x{} {} ({} bytes)",
            resolution.width_x,
            resolution.height_y,
            frame.source_frame_format(),
            raw.len()
        );

        decode_to_rgba(&raw, resolution.width_x, resolution.height_y)
    }

    fn stop(&mut self) {
        if !self.live {
            return;
        }
        if let Some(led) = &self.torch {
            if let Err(e) = led.set(false) {
                log::warn!("Failed to switch torch off: {}", e);
            }
        }
        if let Err(e) = self.camera.stop_stream() {
            log::warn!("Failed to stop camera '{}': {}", self.label, e);
        }
        self.live = false;
        log::debug!("Stopped track {} ('{}')", self.id, self.label);
    }

    fn is_live(&self) -> bool {
        self.live
    }
}

/// Decode a raw device frame into RGBA. Accepts MJPEG, packed RGB24,
/// YUYV 4:2:2 and RGBA.
pub fn decode_to_rgba(raw: &[u8], width: u32, height: u32) -> Result<RgbaImage, CameraError> {
    let pixels = width as usize * height as usize;

    if raw.len() >= 3 && raw[..3] == [0xFF, 0xD8, 0xFF] {
        let decoded = image::load_from_memory(raw)
            .map_err(|e| CameraError::CaptureFailed(format!("Failed to decode MJPEG: {}", e)))?;
        return Ok(decoded.to_rgba8());
    }

    let rgba = if raw.len() == pixels * 4 {
        raw.to_vec()
    } else if raw.len() == pixels * 3 {
        raw.chunks_exact(3)
            .flat_map(|rgb| [rgb[0], rgb[1], rgb[2], 255])
            .collect()
    } else if raw.len() == pixels * 2 && width % 2 == 0 {
        yuyv_to_rgba(raw)
    } else {
        return Err(CameraError::CaptureFailed(format!(
            "Unrecognized frame layout: {} bytes for {}x{}",
            raw.len(),
            width,
            height
        )));
    };

    RgbaImage::from_raw(width, height, rgba)
        .ok_or_else(|| CameraError::CaptureFailed("Frame size mismatch".to_string()))
}

/// YUYV (Y0 U Y1 V) to RGBA, BT.601 limited range
fn yuyv_to_rgba(raw: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(raw.len() * 2);
    for chunk in raw.chunks_exact(4) {
        let u = chunk[1] as f32 - 128.0;
        let v = chunk[3] as f32 - 128.0;
        for y in [chunk[0], chunk[2]] {
            let c = (y as f32 - 16.0) * 1.164;
            out.push((c + 1.596 * v).round().clamp(0.0, 255.0) as u8);
            out.push((c - 0.392 * u - 0.813 * v).round().clamp(0.0, 255.0) as u8);
            out.push((c + 2.017 * u).round().clamp(0.0, 255.0) as u8);
            out.push(255);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_select_device_prefers_configuration() {
        let devices = labels(&["Rear Camera", "Front Camera"]);
        assert_eq!(select_device(&devices, FacingMode::Environment, Some(1)), 1);
        // Out of range falls back to hints
        assert_eq!(select_device(&devices, FacingMode::User, Some(7)), 1);
    }

    #[test]
    fn test_select_device_by_label() {
        let devices = labels(&["USB Webcam", "Back Camera", "FaceTime HD Camera"]);
        assert_eq!(select_device(&devices, FacingMode::Environment, None), 1);
        assert_eq!(select_device(&devices, FacingMode::User, None), 2);
    }

    #[test]
    fn test_select_device_defaults_to_first() {
        let devices = labels(&["USB Webcam", "Capture Card"]);
        assert_eq!(select_device(&devices, FacingMode::User, None), 0);
    }

    #[test]
    fn test_decode_rgb24() {
        let raw = vec![10, 20, 30, 40, 50, 60];
        let image = decode_to_rgba(&raw, 2, 1).unwrap();
        assert_eq!(image.as_raw(), &vec![10, 20, 30, 255, 40, 50, 60, 255]);
    }

    #[test]
    fn test_decode_yuyv_gray() {
        // Y=126 (mid gray in limited range), neutral chroma
        let raw = vec![126, 128, 126, 128];
        let image = decode_to_rgba(&raw, 2, 1).unwrap();
        let px = image.get_pixel(0, 0);
        assert_eq!(px[0], px[1]);
        assert_eq!(px[1], px[2]);
        assert_eq!(px[3], 255);
    }

    #[test]
    fn test_decode_mjpeg() {
        let encoded = crate::buffer::PixelBuffer::from_rgba(4, 4, vec![90; 64])
            .unwrap()
            .encode_jpeg(95)
            .unwrap();
        let image = decode_to_rgba(encoded.bytes(), 4, 4).unwrap();
        assert_eq!(image.dimensions(), (4, 4));
    }

    #[test]
    fn test_decode_rejects_unknown_layout() {
        assert!(matches!(
            decode_to_rgba(&[1, 2, 3, 4, 5], 2, 2),
            Err(CameraError::CaptureFailed(_))
        ));
    }
}
