// SPDX-License-Identifier: GPL-3.0-only

//! Video recording pipeline
//!
//! Drives the start → active → stop → finalize lifecycle of one continuous
//! recording:
//!
//! ```text
//! Idle ──start──▶ Preparing ──recorder ready──▶ Active
//!   ▲                 │                           │
//!   │          permission missing            stop / fault
//!   │                 ▼                           ▼
//!   └───────────── (error) ◀──finalize── Finalizing
//! ```
//!
//! The pipeline exclusively owns the in-flight [`RecordingSession`]; the
//! session controller only ever observes presence or absence.

use crate::backends::{CameraResource, RecorderHandle};
use crate::catalog::{CapturedArtifact, MediaKind};
use crate::constants::FINALIZE_TIMEOUT;
use crate::errors::{RecordingError, SessionError, SessionResult};
use crate::output::OutputDescriptor;
use crate::permissions::{Permission, PermissionBroker};
use std::time::Instant;
use tracing::{debug, error, info};

/// Recording pipeline state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecorderState {
    /// No recording in flight
    #[default]
    Idle,
    /// Start requested, recorder not yet active
    Preparing,
    /// Recording
    Active,
    /// Stop requested, waiting for the recorder to flush and confirm
    Finalizing,
}

/// One in-flight recording
#[derive(Debug)]
struct RecordingSession<R> {
    started_at: Instant,
    recorder: R,
}

/// Video recording pipeline
#[derive(Debug, Default)]
pub struct RecordingPipeline<R> {
    state: RecorderState,
    session: Option<RecordingSession<R>>,
}

impl<R: RecorderHandle> RecordingPipeline<R> {
    pub fn new() -> Self {
        Self {
            state: RecorderState::Idle,
            session: None,
        }
    }

    /// Current pipeline state
    pub fn state(&self) -> RecorderState {
        self.state
    }

    /// Whether a recording session exists (preparing, active, or finalizing)
    pub fn is_active(&self) -> bool {
        self.session.is_some() || self.state != RecorderState::Idle
    }

    /// Start a recording.
    ///
    /// Requires the microphone grant; without it the pipeline returns to
    /// Idle and never reaches Active. Refused while a session exists.
    pub async fn start<C>(
        &mut self,
        camera: &mut C,
        descriptor: &OutputDescriptor,
        permissions: &impl PermissionBroker,
    ) -> SessionResult<()>
    where
        C: CameraResource<Recorder = R>,
    {
        if self.session.is_some() {
            return Err(SessionError::Busy("recording already in progress"));
        }

        self.state = RecorderState::Preparing;

        if !permissions.has_grant(Permission::Microphone) {
            self.state = RecorderState::Idle;
            return Err(SessionError::PermissionDenied(Permission::Microphone));
        }

        let recorder = match camera.start_recording(descriptor).await {
            Ok(recorder) => recorder,
            Err(e) => {
                error!(error = %e, "Recorder start failed");
                self.state = RecorderState::Idle;
                return Err(match e {
                    crate::backends::BackendError::Record(fault) => SessionError::Recording(fault),
                    other => SessionError::Recording(RecordingError::Unknown(other.to_string())),
                });
            }
        };

        self.session = Some(RecordingSession {
            started_at: Instant::now(),
            recorder,
        });
        self.state = RecorderState::Active;
        info!("Recording active");
        Ok(())
    }

    /// Request finalize and wait for the recorder to confirm.
    ///
    /// Success yields the finished video artifact with its measured duration.
    /// Called before the recording reached Active, the pipeline returns to
    /// Idle and no artifact is produced.
    pub async fn stop(&mut self) -> SessionResult<CapturedArtifact> {
        let Some(session) = self.session.take() else {
            debug!(state = ?self.state, "Stop requested with no active session");
            self.state = RecorderState::Idle;
            return Err(SessionError::Busy("no recording in progress"));
        };

        self.state = RecorderState::Finalizing;
        info!("Finalizing recording");

        let result = tokio::time::timeout(FINALIZE_TIMEOUT, session.recorder.finalize()).await;
        self.state = RecorderState::Idle;

        let output_ref = match result {
            Ok(Ok(reference)) => reference,
            Ok(Err(fault)) => {
                error!(error = %fault, "Recording finalize failed");
                return Err(SessionError::Recording(fault));
            }
            Err(_) => {
                error!("Recording finalize timed out");
                return Err(SessionError::Recording(RecordingError::Unknown(
                    "finalize timed out".to_string(),
                )));
            }
        };

        let duration_ms = session.started_at.elapsed().as_millis() as u64;
        info!(%output_ref, duration_ms, "Recording saved");
        Ok(CapturedArtifact::new(
            MediaKind::Video,
            Some(output_ref),
            Some(duration_ms),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::synthetic::SyntheticCamera;
    use crate::backends::{CameraFacing, PreviewSurface, UseCaseGraph};
    use crate::output::{SinkPolicy, resolve};
    use crate::permissions::{GrantAll, StaticGrants};
    use std::time::Duration;

    async fn video_camera(root: std::path::PathBuf) -> SyntheticCamera {
        let mut camera = SyntheticCamera::new(root.clone());
        camera.acquire(CameraFacing::Back).await.unwrap();
        camera
            .bind(
                &UseCaseGraph::full(CameraFacing::Back, true, None),
                &PreviewSurface::new("test"),
            )
            .await
            .unwrap();
        camera
    }

    #[tokio::test]
    async fn start_without_microphone_grant_never_reaches_active() {
        let dir = tempfile::tempdir().unwrap();
        let mut camera = video_camera(dir.path().to_path_buf()).await;
        let mut pipeline = RecordingPipeline::new();

        let descriptor = resolve(SinkPolicy::DirectFile, MediaKind::Video, dir.path());
        let no_mic = StaticGrants::new([Permission::Camera, Permission::Storage]);

        let result = pipeline.start(&mut camera, &descriptor, &no_mic).await;
        assert_eq!(
            result,
            Err(SessionError::PermissionDenied(Permission::Microphone))
        );
        assert_eq!(pipeline.state(), RecorderState::Idle);
        assert!(!pipeline.is_active());
    }

    #[tokio::test]
    async fn stop_before_start_produces_no_artifact() {
        let mut pipeline: RecordingPipeline<crate::backends::synthetic::SyntheticRecorder> =
            RecordingPipeline::new();

        assert!(pipeline.stop().await.is_err());
        assert_eq!(pipeline.state(), RecorderState::Idle);
    }

    #[tokio::test]
    async fn double_start_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let mut camera = video_camera(dir.path().to_path_buf()).await;
        let mut pipeline = RecordingPipeline::new();
        let descriptor = resolve(SinkPolicy::DirectFile, MediaKind::Video, dir.path());

        pipeline
            .start(&mut camera, &descriptor, &GrantAll)
            .await
            .unwrap();
        let second = pipeline.start(&mut camera, &descriptor, &GrantAll).await;
        assert!(matches!(second, Err(SessionError::Busy(_))));

        // Still exactly one session, and it finalizes normally
        let artifact = pipeline.stop().await.unwrap();
        assert_eq!(artifact.kind, MediaKind::Video);
    }

    #[tokio::test]
    async fn duration_tracks_wall_clock() {
        let dir = tempfile::tempdir().unwrap();
        let mut camera = video_camera(dir.path().to_path_buf()).await;
        let mut pipeline = RecordingPipeline::new();
        let descriptor = resolve(SinkPolicy::DirectFile, MediaKind::Video, dir.path());

        pipeline
            .start(&mut camera, &descriptor, &GrantAll)
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(120)).await;
        let artifact = pipeline.stop().await.unwrap();

        let duration = artifact.duration_ms.expect("video artifacts have duration");
        assert!(duration >= 120, "duration {} shorter than recording", duration);
        assert!(duration < 2_000, "duration {} implausibly long", duration);
        assert!(artifact.output_ref.is_some());
    }

    #[tokio::test]
    async fn classified_fault_surfaces_and_resets() {
        let dir = tempfile::tempdir().unwrap();
        let mut camera = SyntheticCamera::new(dir.path().to_path_buf())
            .fail_recording(RecordingError::SourceInactive);
        camera.acquire(CameraFacing::Back).await.unwrap();
        camera
            .bind(
                &UseCaseGraph::full(CameraFacing::Back, true, None),
                &PreviewSurface::new("test"),
            )
            .await
            .unwrap();

        let mut pipeline = RecordingPipeline::new();
        let descriptor = resolve(SinkPolicy::DirectFile, MediaKind::Video, dir.path());
        pipeline
            .start(&mut camera, &descriptor, &GrantAll)
            .await
            .unwrap();

        let result = pipeline.stop().await;
        assert_eq!(
            result,
            Err(SessionError::Recording(RecordingError::SourceInactive))
        );
        assert_eq!(pipeline.state(), RecorderState::Idle);
        assert!(!pipeline.is_active());
    }
}
