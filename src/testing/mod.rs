//! Testing utilities for CrabSnap
//!
//! A synthetic platform that stands in for the camera, the download
//! location and the share sheet, plus deterministic frame data. Every
//! interaction with the synthetic platform is recorded in an [`EventLog`].

pub mod synthetic_data;
pub mod synthetic_platform;

pub use synthetic_data::synthetic_frame;
pub use synthetic_platform::{
    EventLog, MemoryDownloads, PlatformEvent, RecordingShareTarget, SyntheticControl,
    SyntheticMediaDevices,
};
