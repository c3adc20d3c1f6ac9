//! Constraint updates on the active video track.
//!
//! Every operation probes the track's capabilities first and answers with a
//! plain `bool`: `false` when there is no stream, when the feature is not
//! supported, or when the platform rejects the update. Platform errors are
//! logged here and go no further.

use crate::platform::{CaptureHandle, VideoTrack};
use crate::types::{Capability, CapabilitySet, ConstraintRequest, FlashMode, ViewportRect};

/// Focus distance sent with every manual focus request. Tap coordinates are
/// not mapped to a distance.
pub const PLACEHOLDER_FOCUS_DISTANCE: f64 = 0.5;

/// Features of the first video track; empty without a stream
pub fn probe(handle: Option<&CaptureHandle>) -> CapabilitySet {
    handle
        .and_then(CaptureHandle::video_track)
        .map(|track| track.capabilities())
        .unwrap_or_default()
}

fn track_with(
    handle: Option<&mut CaptureHandle>,
    capability: Capability,
) -> Option<&mut (dyn VideoTrack + 'static)> {
    let track = handle?.video_track_mut()?;
    if track.capabilities().supports(capability) {
        Some(track)
    } else {
        log::debug!("Track '{}' does not support {:?}", track.label(), capability);
        None
    }
}

fn apply(track: &mut dyn VideoTrack, request: &ConstraintRequest, what: &str) -> bool {
    match track.apply_constraints(request) {
        Ok(()) => {
            log::debug!("Applied {} to track '{}'", what, track.label());
            true
        }
        Err(e) => {
            log::error!("Error applying {}: {}", what, e);
            false
        }
    }
}

/// Apply generic settings such as resolution or frame rate
pub fn apply_settings(handle: Option<&mut CaptureHandle>, settings: &ConstraintRequest) -> bool {
    match track_with(handle, Capability::ApplyConstraints) {
        Some(track) => apply(track, settings, "camera settings"),
        None => false,
    }
}

pub fn set_torch(handle: Option<&mut CaptureHandle>, on: bool) -> bool {
    match track_with(handle, Capability::Torch) {
        Some(track) => apply(track, &ConstraintRequest::torch(on), "flash mode"),
        None => false,
    }
}

pub fn set_flash_mode(handle: Option<&mut CaptureHandle>, mode: FlashMode) -> bool {
    set_torch(handle, mode == FlashMode::On)
}

/// Manual focus after a tap at `(x, y)` inside `rect`.
///
/// The normalized tap position is computed but the request always carries
/// `PLACEHOLDER_FOCUS_DISTANCE`.
pub fn set_focus_point(
    handle: Option<&mut CaptureHandle>,
    x: f64,
    y: f64,
    rect: &ViewportRect,
) -> bool {
    let Some(track) = track_with(handle, Capability::ManualFocus) else {
        return false;
    };

    match rect.normalize(x, y) {
        Some((fx, fy)) => log::debug!("Focus tap at ({:.3}, {:.3})", fx, fy),
        None => log::debug!("Focus tap on an empty element rect"),
    }

    apply(
        track,
        &ConstraintRequest::manual_focus(PLACEHOLDER_FOCUS_DISTANCE),
        "camera focus",
    )
}
