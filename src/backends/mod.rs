// SPDX-License-Identifier: GPL-3.0-only

//! Camera resource abstraction
//!
//! The session controller is the sole owner of a [`CameraResource`]; no other
//! component holds or mutates the camera handle. Acquisition, binding,
//! capture and finalize are genuine suspension points: each returns a future
//! the controller awaits in sequence.
//!
//! ```text
//! ┌──────────────────────┐
//! │  SessionController   │  ← state machine, rebind policy
//! └──────────┬───────────┘
//!            │ owns
//!            ▼
//! ┌──────────────────────┐
//! │ CameraResource trait │  ← acquire / bind / capture / record
//! └──────────┬───────────┘
//!            │
//!            ▼
//!      ┌───────────┐
//!      │ synthetic │  ← concrete implementation
//!      └───────────┘
//! ```

pub mod synthetic;

use crate::errors::RecordingError;
use crate::output::OutputDescriptor;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lens facing selected by the caller.
///
/// Persists across rebinds until explicitly toggled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CameraFacing {
    /// Front (selfie) camera
    Front,
    /// Back camera
    Back,
}

impl CameraFacing {
    /// The other lens
    pub fn flipped(self) -> Self {
        match self {
            CameraFacing::Front => CameraFacing::Back,
            CameraFacing::Back => CameraFacing::Front,
        }
    }
}

impl fmt::Display for CameraFacing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CameraFacing::Front => write!(f, "front"),
            CameraFacing::Back => write!(f, "back"),
        }
    }
}

/// Aspect ratio hint for a use case
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AspectRatio {
    /// 16:9, preferred for preview
    Ratio16x9,
    /// 4:3, preferred for stills
    Ratio4x3,
}

/// One atomic set of capabilities to bind to the camera.
///
/// Binding is all-or-nothing: the controller unbinds everything before
/// attaching a new graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UseCaseGraph {
    /// Lens to bind against
    pub facing: CameraFacing,
    /// Live preview rendering
    pub preview: bool,
    /// Still photo capture
    pub photo: bool,
    /// Video recording
    pub video: bool,
    /// Preview aspect hint
    pub preview_aspect: Option<AspectRatio>,
    /// Photo aspect hint
    pub photo_aspect: Option<AspectRatio>,
    /// Target rotation hint in degrees, from the render surface
    pub target_rotation: Option<u32>,
}

impl UseCaseGraph {
    /// Full graph for a capture mode: preview + photo, plus video recording
    /// when the caller is in video mode.
    pub fn full(facing: CameraFacing, video_mode: bool, target_rotation: Option<u32>) -> Self {
        Self {
            facing,
            preview: true,
            photo: true,
            video: video_mode,
            preview_aspect: Some(AspectRatio::Ratio16x9),
            photo_aspect: Some(AspectRatio::Ratio4x3),
            target_rotation,
        }
    }

    /// Minimal recovery graph: preview only, default facing, no hints.
    ///
    /// Used after a full bind failure so the user at least sees a live image.
    pub fn fallback() -> Self {
        Self {
            facing: CameraFacing::Back,
            preview: true,
            photo: false,
            video: false,
            preview_aspect: None,
            photo_aspect: None,
            target_rotation: None,
        }
    }
}

/// Handle to the surface the live preview is rendered into.
///
/// Rotation and size negotiation happen on the caller's side; the capture
/// core only forwards the handle at bind time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewSurface {
    label: String,
    /// Current surface rotation in degrees, if the surface reports one
    pub rotation: Option<u32>,
}

impl PreviewSurface {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            rotation: None,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

/// Result type for backend operations
pub type BackendResult<T> = Result<T, BackendError>;

/// Errors reported by a camera backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// The platform refused to hand over the camera
    AcquireDenied(String),
    /// No camera device with the requested facing
    NoDevice(CameraFacing),
    /// The use-case graph was rejected
    BindRejected(String),
    /// Still capture failed
    CaptureFailed(String),
    /// Recorder failure with a classified reason
    Record(RecordingError),
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendError::AcquireDenied(msg) => write!(f, "camera acquisition denied: {}", msg),
            BackendError::NoDevice(facing) => write!(f, "no {} camera device", facing),
            BackendError::BindRejected(msg) => write!(f, "use-case graph rejected: {}", msg),
            BackendError::CaptureFailed(msg) => write!(f, "capture failed: {}", msg),
            BackendError::Record(e) => write!(f, "recorder error: {}", e),
        }
    }
}

impl std::error::Error for BackendError {}

/// Acknowledgment of a completed still capture.
///
/// Structured stores report the saved reference; plain file sinks may only
/// confirm the write, leaving reference recovery to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureAck {
    /// Saved output reference, when the sink can report one
    pub output_ref: Option<String>,
}

/// A camera device abstraction the session controller can own.
///
/// Exactly one graph may be bound at a time; implementations must treat
/// `bind` after `unbind_all` as a fresh atomic attach. All async methods are
/// cancel-safe from the controller's perspective: a dropped future must not
/// leave the device half-bound.
pub trait CameraResource: Send {
    /// Recorder handle type produced by [`CameraResource::start_recording`]
    type Recorder: RecorderHandle;

    /// Acquire the physical camera with the given facing.
    ///
    /// Idempotent: re-acquiring with a different facing switches lenses.
    fn acquire(
        &mut self,
        facing: CameraFacing,
    ) -> impl Future<Output = BackendResult<()>> + Send;

    /// Detach every bound use case. Safe to call when nothing is bound.
    fn unbind_all(&mut self);

    /// Atomically attach a use-case graph, drawing preview into `surface`.
    fn bind(
        &mut self,
        graph: &UseCaseGraph,
        surface: &PreviewSurface,
    ) -> impl Future<Output = BackendResult<()>> + Send;

    /// Issue a single still capture against the bound photo use case.
    ///
    /// The artifact bytes are written by the sink described in `descriptor`;
    /// the core never encodes media itself.
    fn take_photo(
        &mut self,
        descriptor: &OutputDescriptor,
    ) -> impl Future<Output = BackendResult<CaptureAck>> + Send;

    /// Start a recording against the bound video use case.
    ///
    /// Returns the handle used to finalize the recording. At most one
    /// recorder may exist per device.
    fn start_recording(
        &mut self,
        descriptor: &OutputDescriptor,
    ) -> impl Future<Output = BackendResult<Self::Recorder>> + Send;

    /// Release the camera and cancel any pending acquisition listener.
    /// Safe to call repeatedly.
    fn release(&mut self);
}

/// In-flight recording owned by the recording pipeline.
///
/// Finalize consumes the handle: once the future resolves, the underlying
/// recorder has flushed and closed its output.
pub trait RecorderHandle: Send {
    /// Request finalize and wait for the recorder to confirm completion.
    ///
    /// Success yields the saved output reference.
    fn finalize(self) -> impl Future<Output = Result<String, RecordingError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_graph_includes_video_only_in_video_mode() {
        let photo_graph = UseCaseGraph::full(CameraFacing::Front, false, Some(90));
        assert!(photo_graph.preview && photo_graph.photo);
        assert!(!photo_graph.video);

        let video_graph = UseCaseGraph::full(CameraFacing::Front, true, None);
        assert!(video_graph.video);
    }

    #[test]
    fn fallback_graph_is_preview_only_with_default_facing() {
        let graph = UseCaseGraph::fallback();
        assert_eq!(graph.facing, CameraFacing::Back);
        assert!(graph.preview);
        assert!(!graph.photo && !graph.video);
        assert!(graph.preview_aspect.is_none() && graph.target_rotation.is_none());
    }
}
