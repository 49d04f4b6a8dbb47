// SPDX-License-Identifier: GPL-3.0-only

//! Capture session controller
//!
//! Owns the camera resource and orchestrates acquisition, use-case binding,
//! mode and lens switching, photo capture, and the recording lifecycle.
//! The controller is single-owner: all state lives behind `&mut self`, every
//! async boundary is an awaited suspension point, and completion/error
//! notifications are forwarded to the caller as [`SessionEvent`]s.

use crate::backends::{CameraFacing, CameraResource, PreviewSurface, UseCaseGraph};
use crate::catalog::{CapturedArtifact, MediaKind};
use crate::constants::{ACQUIRE_TIMEOUT, MODE_SWITCH_SETTLE};
use crate::errors::{SessionError, SessionResult};
use crate::output::{self, SinkPolicy};
use crate::permissions::{Permission, PermissionBroker};
use crate::pipelines::photo::PhotoPipeline;
use crate::pipelines::video::RecordingPipeline;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// What the session is currently doing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// No camera held
    #[default]
    Unbound,
    /// Acquisition or bind in flight
    Binding,
    /// Use-case graph bound, ready for capture
    Bound,
    /// Still capture in flight
    Capturing,
    /// Recording in flight
    Recording,
    /// Camera could not be acquired
    Error,
}

/// Active capture mode. Exactly one at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaptureMode {
    /// Still photos
    #[default]
    Photo,
    /// Video recording
    Video,
}

/// Events forwarded to the caller.
///
/// The caller persists saved artifacts through its catalog gateway; the
/// controller itself never touches the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A use-case graph was bound. `fallback` marks the minimal
    /// preview-only recovery graph.
    CameraBound { fallback: bool },
    /// Recording entered the active state
    RecordingStarted,
    /// Recording stop was requested
    RecordingStopped,
    /// A photo finished saving
    PhotoSaved(CapturedArtifact),
    /// A recording finalized successfully
    VideoSaved(CapturedArtifact),
    /// An operation failed
    Error(SessionError),
}

/// Capture session controller.
///
/// Sole owner of the camera resource handle; collaborators receive events,
/// never the handle.
pub struct SessionController<C: CameraResource, P: PermissionBroker> {
    camera: C,
    surface: PreviewSurface,
    permissions: P,
    sink_policy: SinkPolicy,
    photo_dir: PathBuf,
    video_dir: PathBuf,

    state: SessionState,
    facing: CameraFacing,
    mode: CaptureMode,
    acquired: bool,
    /// Graph currently bound, if any. Fallback graphs carry no capture
    /// use cases, which gates `capture_photo`/`toggle_recording`.
    bound_graph: Option<UseCaseGraph>,

    photo: PhotoPipeline,
    recording: RecordingPipeline<C::Recorder>,

    events: mpsc::UnboundedSender<SessionEvent>,
    settle_delay: Duration,
}

impl<C: CameraResource, P: PermissionBroker> SessionController<C, P> {
    /// Create a controller and the event stream the caller listens on.
    ///
    /// `photo_dir`/`video_dir` are the app-owned media directories backing
    /// direct-file sinks and the photo reference fallback lookup.
    pub fn new(
        camera: C,
        surface: PreviewSurface,
        permissions: P,
        sink_policy: SinkPolicy,
        photo_dir: PathBuf,
        video_dir: PathBuf,
    ) -> (Self, mpsc::UnboundedReceiver<SessionEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        let controller = Self {
            camera,
            surface,
            permissions,
            sink_policy,
            photo: PhotoPipeline::new(photo_dir.clone()),
            photo_dir,
            video_dir,
            state: SessionState::Unbound,
            facing: CameraFacing::Back,
            mode: CaptureMode::Photo,
            acquired: false,
            bound_graph: None,
            recording: RecordingPipeline::new(),
            events,
            settle_delay: MODE_SWITCH_SETTLE,
        };
        (controller, receiver)
    }

    /// Override the mode-switch settle delay (tests)
    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    /// Current session state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Current capture mode
    pub fn mode(&self) -> CaptureMode {
        self.mode
    }

    /// Current lens facing
    pub fn facing(&self) -> CameraFacing {
        self.facing
    }

    /// Whether a recording session exists
    pub fn is_recording_active(&self) -> bool {
        self.recording.is_active()
    }

    /// Whether the bound graph includes the photo use case
    pub fn can_capture_photo(&self) -> bool {
        self.bound_graph.as_ref().is_some_and(|g| g.photo)
    }

    fn emit(&self, event: SessionEvent) {
        // The receiver may be gone during teardown; events are best-effort
        let _ = self.events.send(event);
    }

    fn emit_error(&self, error: SessionError) -> SessionError {
        self.emit(SessionEvent::Error(error.clone()));
        error
    }

    /// Acquire the camera and bind the use cases for the current mode.
    ///
    /// Idempotent: calling while already binding or bound performs an
    /// unbind-then-rebind. Refused while a recording is active.
    pub async fn start(&mut self, facing: CameraFacing) -> SessionResult<()> {
        if self.recording.is_active() {
            return Err(self.emit_error(SessionError::Busy("recording in progress")));
        }
        for required in [Permission::Camera, Permission::Storage] {
            if !self.permissions.has_grant(required) {
                return Err(self.emit_error(SessionError::PermissionDenied(required)));
            }
        }

        self.facing = facing;
        self.state = SessionState::Binding;
        info!(%facing, mode = ?self.mode, "Starting capture session");

        match tokio::time::timeout(ACQUIRE_TIMEOUT, self.camera.acquire(facing)).await {
            Ok(Ok(())) => self.acquired = true,
            Ok(Err(e)) => {
                error!(error = %e, "Camera acquisition failed");
                self.acquired = false;
                self.state = SessionState::Error;
                return Err(
                    self.emit_error(SessionError::ResourceUnavailable(e.to_string()))
                );
            }
            Err(_) => {
                error!("Camera acquisition timed out");
                self.acquired = false;
                self.state = SessionState::Error;
                return Err(self.emit_error(SessionError::ResourceUnavailable(
                    "acquisition timed out".to_string(),
                )));
            }
        }

        self.bind_use_cases().await
    }

    /// Unbind everything and bind the graph implied by the current mode,
    /// falling back to a minimal preview-only graph on failure.
    async fn bind_use_cases(&mut self) -> SessionResult<()> {
        self.state = SessionState::Binding;
        self.bound_graph = None;
        self.camera.unbind_all();

        let graph = UseCaseGraph::full(
            self.facing,
            self.mode == CaptureMode::Video,
            self.surface.rotation,
        );

        match self.camera.bind(&graph, &self.surface).await {
            Ok(()) => {
                debug!(facing = %graph.facing, video = graph.video, "Use-case graph bound");
                self.bound_graph = Some(graph);
                self.state = SessionState::Bound;
                self.emit(SessionEvent::CameraBound { fallback: false });
                return Ok(());
            }
            Err(e) => {
                warn!(error = %e, "Full graph rejected, trying fallback");
                self.emit(SessionEvent::Error(SessionError::BindingFailed(
                    e.to_string(),
                )));
            }
        }

        // Minimal recovery graph: the user at least keeps a live preview
        self.camera.unbind_all();
        let fallback = UseCaseGraph::fallback();
        match self.camera.bind(&fallback, &self.surface).await {
            Ok(()) => {
                warn!("Using fallback camera configuration");
                self.bound_graph = Some(fallback);
                self.state = SessionState::Bound;
                self.emit(SessionEvent::CameraBound { fallback: true });
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Fallback camera configuration also failed");
                self.state = SessionState::Unbound;
                Err(self.emit_error(SessionError::BindingFailed(e.to_string())))
            }
        }
    }

    /// Switch the desired lens facing.
    ///
    /// Refused while recording. Rebinds immediately when a camera is held;
    /// otherwise takes effect on the next `start`.
    pub async fn set_facing(&mut self, facing: CameraFacing) -> SessionResult<()> {
        if self.recording.is_active() {
            return Err(self.emit_error(SessionError::Busy("recording in progress")));
        }

        self.facing = facing;
        if self.acquired {
            match tokio::time::timeout(ACQUIRE_TIMEOUT, self.camera.acquire(facing)).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    self.state = SessionState::Error;
                    return Err(
                        self.emit_error(SessionError::ResourceUnavailable(e.to_string()))
                    );
                }
                Err(_) => {
                    self.state = SessionState::Error;
                    return Err(self.emit_error(SessionError::ResourceUnavailable(
                        "acquisition timed out".to_string(),
                    )));
                }
            }
            self.bind_use_cases().await
        } else {
            debug!(%facing, "Facing stored, applies on next start");
            Ok(())
        }
    }

    /// Switch to the other lens. Refused while recording, like `set_facing`.
    pub async fn flip_facing(&mut self) -> SessionResult<()> {
        self.set_facing(self.facing.flipped()).await
    }

    /// Switch between photo and video mode.
    ///
    /// Refused while recording. The rebind waits a short settle delay so the
    /// render surface stabilizes after reconfiguration.
    pub async fn set_mode(&mut self, mode: CaptureMode) -> SessionResult<()> {
        if self.recording.is_active() {
            return Err(self.emit_error(SessionError::Busy("recording in progress")));
        }
        if self.mode == mode {
            return Ok(());
        }

        info!(?mode, "Switching capture mode");
        self.mode = mode;

        if self.acquired {
            tokio::time::sleep(self.settle_delay).await;
            self.bind_use_cases().await
        } else {
            Ok(())
        }
    }

    /// Capture a still photo.
    ///
    /// Valid only in photo mode with a bound photo use case. Overlapping
    /// calls are rejected, never queued.
    pub async fn capture_photo(&mut self) -> SessionResult<()> {
        if self.mode != CaptureMode::Photo {
            return Err(self.emit_error(SessionError::Busy("not in photo mode")));
        }
        match self.state {
            SessionState::Bound => {}
            SessionState::Capturing => {
                return Err(self.emit_error(SessionError::Busy("capture in progress")));
            }
            _ => return Err(self.emit_error(SessionError::Busy("camera not bound"))),
        }
        if !self.can_capture_photo() {
            return Err(self.emit_error(SessionError::CaptureFailed(
                "photo use case not bound".to_string(),
            )));
        }

        let descriptor = output::resolve(self.sink_policy, MediaKind::Photo, &self.photo_dir);

        self.state = SessionState::Capturing;
        let result = self.photo.take_photo(&mut self.camera, &descriptor).await;
        self.state = SessionState::Bound;

        match result {
            Ok(artifact) => {
                self.emit(SessionEvent::PhotoSaved(artifact));
                Ok(())
            }
            Err(e) => Err(self.emit_error(e)),
        }
    }

    /// Start or stop a recording, depending on whether one is active.
    ///
    /// Valid only in video mode. A recording fault triggers a full rebind,
    /// since a hardware-level failure often leaves the graph unusable.
    pub async fn toggle_recording(&mut self) -> SessionResult<()> {
        if self.mode != CaptureMode::Video {
            return Err(self.emit_error(SessionError::Busy("not in video mode")));
        }

        if self.recording.is_active() {
            self.stop_recording().await
        } else {
            self.start_recording().await
        }
    }

    async fn start_recording(&mut self) -> SessionResult<()> {
        if self.state != SessionState::Bound {
            return Err(self.emit_error(SessionError::Busy("camera not bound")));
        }
        let video_bound = self.bound_graph.as_ref().is_some_and(|g| g.video);
        if !video_bound {
            return Err(self.emit_error(SessionError::Recording(
                crate::errors::RecordingError::InvalidOutput,
            )));
        }

        let descriptor = output::resolve(self.sink_policy, MediaKind::Video, &self.video_dir);

        match self
            .recording
            .start(&mut self.camera, &descriptor, &self.permissions)
            .await
        {
            Ok(()) => {
                self.state = SessionState::Recording;
                self.emit(SessionEvent::RecordingStarted);
                Ok(())
            }
            Err(e @ SessionError::Recording(_)) => {
                let error = self.emit_error(e);
                // A recorder fault at start leaves the graph in the same
                // doubtful shape as a finalize fault; rebind to recover.
                if let Err(rebind) = self.bind_use_cases().await {
                    warn!(error = %rebind, "Rebind after recorder start fault failed");
                }
                Err(error)
            }
            Err(e) => Err(self.emit_error(e)),
        }
    }

    async fn stop_recording(&mut self) -> SessionResult<()> {
        self.emit(SessionEvent::RecordingStopped);

        match self.recording.stop().await {
            Ok(artifact) => {
                self.state = SessionState::Bound;
                self.emit(SessionEvent::VideoSaved(artifact));
                Ok(())
            }
            Err(e) => {
                let error = self.emit_error(e);
                // A recording fault frequently leaves the bound graph
                // unusable; rebind to recover the session.
                if let Err(rebind) = self.bind_use_cases().await {
                    warn!(error = %rebind, "Rebind after recording fault failed");
                }
                Err(error)
            }
        }
    }

    /// Stop any active recording, release the camera, and drop pending
    /// binds. Idempotent and safe to call from a terminating caller.
    pub async fn release(&mut self) {
        if self.recording.is_active() {
            // User-initiated stop, not an error; the artifact still flows
            // through the event stream if finalize succeeds.
            match self.recording.stop().await {
                Ok(artifact) => self.emit(SessionEvent::VideoSaved(artifact)),
                Err(e) => {
                    warn!(error = %e, "Recording finalize during release failed");
                    self.emit(SessionEvent::Error(e));
                }
            }
        }

        self.camera.unbind_all();
        self.camera.release();
        self.bound_graph = None;
        self.acquired = false;
        self.state = SessionState::Unbound;
        info!("Capture session released");
    }
}
