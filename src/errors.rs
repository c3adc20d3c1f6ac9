use thiserror::Error;

#[derive(Debug, Error)]
pub enum CameraError {
    #[error("Camera device unavailable: {0}")]
    DeviceUnavailable(String),
    #[error("Capability unsupported: {0}")]
    CapabilityUnsupported(String),
    #[error("Platform rejected request: {0}")]
    PlatformRejected(String),
    #[error("No active camera stream")]
    NoActiveStream,
    #[error("No captured image")]
    NoImage,
    #[error("Unknown filter: {0}")]
    UnknownFilter(String),
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("Capture error: {0}")]
    CaptureFailed(String),
    #[error("Encoding error: {0}")]
    EncodingFailed(String),
    #[error("Share rejected: {0}")]
    ShareRejected(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<image::ImageError> for CameraError {
    fn from(error: image::ImageError) -> Self {
        CameraError::EncodingFailed(error.to_string())
    }
}
