pub mod camera;
pub mod config;
pub mod state;

pub use camera::*;
pub use config::*;
pub use state::CameraState;
