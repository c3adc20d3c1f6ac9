//! Shared value types passed between the session, the platform backends and
//! the host page.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::errors::CameraError;

/// Which physical camera a stream should come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacingMode {
    /// Rear camera, pointing away from the user
    #[default]
    Environment,
    /// Front camera, pointing at the user
    User,
}

impl FacingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FacingMode::Environment => "environment",
            FacingMode::User => "user",
        }
    }

    /// The opposite camera, used by "switch camera" buttons
    pub fn flipped(self) -> Self {
        match self {
            FacingMode::Environment => FacingMode::User,
            FacingMode::User => FacingMode::Environment,
        }
    }
}

impl fmt::Display for FacingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FacingMode {
    type Err = CameraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "environment" => Ok(FacingMode::Environment),
            "user" => Ok(FacingMode::User),
            other => Err(CameraError::InvalidParameter(format!(
                "unknown facing mode: {}",
                other
            ))),
        }
    }
}

/// Flash toggle as exposed to the host page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashMode {
    #[default]
    Off,
    On,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FocusMode {
    Manual,
    Continuous,
    SingleShot,
}

/// Caller viewport used to size stream acquisition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Bounding rectangle of the preview element, in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl ViewportRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Map a tap position to `[0, 1]` coordinates; `None` for an empty rect
    pub fn normalize(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        if self.width <= 0.0 || self.height <= 0.0 {
            return None;
        }
        Some((x / self.width, y / self.height))
    }
}

/// One entry in the `advanced` list of a constraint request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConstraintSet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub torch: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focus_mode: Option<FocusMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focus_distance: Option<f64>,
}

/// A numeric constraint, either a bare number or `{ "ideal": n }`.
/// Both ask for the nearest mode the platform can deliver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConstraintValue {
    Bare(u32),
    Ideal { ideal: u32 },
}

impl ConstraintValue {
    pub fn value(self) -> u32 {
        match self {
            ConstraintValue::Bare(v) | ConstraintValue::Ideal { ideal: v } => v,
        }
    }
}

impl From<u32> for ConstraintValue {
    fn from(value: u32) -> Self {
        ConstraintValue::Bare(value)
    }
}

/// Video track constraints. Width, height and frame rate are ideal values;
/// the platform picks the nearest mode it can deliver.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConstraintRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facing_mode: Option<FacingMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<ConstraintValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<ConstraintValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_rate: Option<ConstraintValue>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub advanced: Vec<ConstraintSet>,
}

impl ConstraintRequest {
    pub fn torch(on: bool) -> Self {
        Self {
            advanced: vec![ConstraintSet {
                torch: Some(on),
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    pub fn manual_focus(distance: f64) -> Self {
        Self {
            advanced: vec![ConstraintSet {
                focus_mode: Some(FocusMode::Manual),
                focus_distance: Some(distance),
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    pub fn ideal_width(&self) -> Option<u32> {
        self.width.map(ConstraintValue::value)
    }

    pub fn ideal_height(&self) -> Option<u32> {
        self.height.map(ConstraintValue::value)
    }

    pub fn ideal_frame_rate(&self) -> Option<u32> {
        self.frame_rate.map(ConstraintValue::value)
    }

    /// Torch value requested by the advanced list, last entry wins
    pub fn requested_torch(&self) -> Option<bool> {
        self.advanced.iter().rev().find_map(|set| set.torch)
    }

    /// Focus distance requested by the advanced list, last entry wins
    pub fn requested_focus_distance(&self) -> Option<f64> {
        self.advanced.iter().rev().find_map(|set| set.focus_distance)
    }
}

/// Constraints for a media request. Audio is never requested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamConstraints {
    pub video: ConstraintRequest,
    pub audio: bool,
}

impl StreamConstraints {
    pub fn video_only(video: ConstraintRequest) -> Self {
        Self {
            video,
            audio: false,
        }
    }
}

/// A controllable feature a video track may expose
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Capability {
    ApplyConstraints,
    Torch,
    ManualFocus,
}

/// Result of a capability probe
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CapabilitySet(BTreeSet<Capability>);

impl CapabilitySet {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with(mut self, capability: Capability) -> Self {
        self.0.insert(capability);
        self
    }

    pub fn insert(&mut self, capability: Capability) {
        self.0.insert(capability);
    }

    pub fn supports(&self, capability: Capability) -> bool {
        self.0.contains(&capability)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Capability> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<Capability> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Summary of the active stream handed back to the host page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamInfo {
    pub id: String,
    pub facing: FacingMode,
    pub label: String,
    pub width: u32,
    pub height: u32,
    pub capabilities: CapabilitySet,
}

/// Operating system the crate was built for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Platform {
    Windows,
    MacOS,
    Linux,
    Unknown,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            Platform::Windows
        } else if cfg!(target_os = "macos") {
            Platform::MacOS
        } else if cfg!(target_os = "linux") {
            Platform::Linux
        } else {
            Platform::Unknown
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Windows => "windows",
            Platform::MacOS => "macos",
            Platform::Linux => "linux",
            Platform::Unknown => "unknown",
        }
    }
}
