// SPDX-License-Identifier: GPL-3.0-only

//! End-to-end capture session scenarios against the synthetic backend

use simplecam::backends::synthetic::SyntheticCamera;
use simplecam::{
    CameraFacing, CaptureMode, MediaKind, Permission, PreviewSurface, RecordingError,
    SessionController, SessionError, SessionEvent, SessionState, SinkPolicy, StaticGrants,
};
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;

fn all_grants() -> StaticGrants {
    StaticGrants::new([Permission::Camera, Permission::Microphone, Permission::Storage])
}

fn session_with(
    camera: SyntheticCamera,
    grants: StaticGrants,
    dir: &std::path::Path,
) -> (
    SessionController<SyntheticCamera, StaticGrants>,
    UnboundedReceiver<SessionEvent>,
) {
    let (controller, events) = SessionController::new(
        camera,
        PreviewSurface::new("test-surface"),
        grants,
        SinkPolicy::StructuredStore,
        dir.to_path_buf(),
        dir.to_path_buf(),
    );
    (
        controller.with_settle_delay(Duration::from_millis(1)),
        events,
    )
}

fn drain(events: &mut UnboundedReceiver<SessionEvent>) -> Vec<SessionEvent> {
    let mut collected = Vec::new();
    while let Ok(event) = events.try_recv() {
        collected.push(event);
    }
    collected
}

#[tokio::test]
async fn record_scenario_emits_one_video_artifact_with_duration() {
    let dir = tempfile::tempdir().unwrap();
    let camera = SyntheticCamera::new(dir.path().to_path_buf());
    let (mut session, mut events) = session_with(camera, all_grants(), dir.path());

    session.start(CameraFacing::Back).await.unwrap();
    session.set_mode(CaptureMode::Video).await.unwrap();

    session.toggle_recording().await.unwrap();
    assert_eq!(session.state(), SessionState::Recording);
    tokio::time::sleep(Duration::from_millis(300)).await;
    session.toggle_recording().await.unwrap();
    assert_eq!(session.state(), SessionState::Bound);

    let saved: Vec<_> = drain(&mut events)
        .into_iter()
        .filter_map(|e| match e {
            SessionEvent::VideoSaved(artifact) => Some(artifact),
            _ => None,
        })
        .collect();

    assert_eq!(saved.len(), 1, "exactly one video artifact");
    let artifact = &saved[0];
    assert_eq!(artifact.kind, MediaKind::Video);
    assert!(artifact.output_ref.is_some());

    let duration = artifact.duration_ms.unwrap();
    assert!(duration >= 300, "duration {}ms shorter than recording", duration);
    assert!(duration < 1_500, "duration {}ms implausibly long", duration);
}

#[tokio::test]
async fn photo_round_trip_has_reference_and_no_duration() {
    let dir = tempfile::tempdir().unwrap();
    let camera = SyntheticCamera::new(dir.path().to_path_buf());
    let (mut session, mut events) = session_with(camera, all_grants(), dir.path());

    session.start(CameraFacing::Back).await.unwrap();
    session.capture_photo().await.unwrap();

    let saved: Vec<_> = drain(&mut events)
        .into_iter()
        .filter_map(|e| match e {
            SessionEvent::PhotoSaved(artifact) => Some(artifact),
            _ => None,
        })
        .collect();

    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].kind, MediaKind::Photo);
    assert!(saved[0].duration_ms.is_none());
    assert!(saved[0].output_ref.as_deref().is_some_and(|r| !r.is_empty()));
}

#[tokio::test]
async fn mode_and_facing_switches_are_busy_while_recording() {
    let dir = tempfile::tempdir().unwrap();
    let camera = SyntheticCamera::new(dir.path().to_path_buf());
    let (mut session, mut events) = session_with(camera, all_grants(), dir.path());

    session.start(CameraFacing::Back).await.unwrap();
    session.set_mode(CaptureMode::Video).await.unwrap();
    session.toggle_recording().await.unwrap();
    assert!(session.is_recording_active());
    let _ = drain(&mut events);

    assert!(matches!(
        session.set_mode(CaptureMode::Photo).await,
        Err(SessionError::Busy(_))
    ));
    assert!(matches!(
        session.set_facing(CameraFacing::Front).await,
        Err(SessionError::Busy(_))
    ));
    // State untouched, no rebind happened
    assert_eq!(session.state(), SessionState::Recording);
    assert_eq!(session.mode(), CaptureMode::Video);
    assert_eq!(session.facing(), CameraFacing::Back);
    let rebinds = drain(&mut events)
        .into_iter()
        .filter(|e| matches!(e, SessionEvent::CameraBound { .. }))
        .count();
    assert_eq!(rebinds, 0);

    // Recording still stops cleanly afterwards
    session.toggle_recording().await.unwrap();
    assert_eq!(session.state(), SessionState::Bound);
    assert!(session.set_mode(CaptureMode::Photo).await.is_ok());
}

#[tokio::test]
async fn fallback_graph_recovers_preview_without_capture() {
    let dir = tempfile::tempdir().unwrap();
    let camera = SyntheticCamera::new(dir.path().to_path_buf()).reject_capture_graphs();
    let (mut session, mut events) = session_with(camera, all_grants(), dir.path());

    session.start(CameraFacing::Front).await.unwrap();
    assert_eq!(session.state(), SessionState::Bound);
    assert!(!session.can_capture_photo());

    let collected = drain(&mut events);
    assert!(collected
        .iter()
        .any(|e| matches!(e, SessionEvent::Error(SessionError::BindingFailed(_)))));
    assert!(collected
        .iter()
        .any(|e| matches!(e, SessionEvent::CameraBound { fallback: true })));

    // Preview-only session: stills are refused
    assert!(matches!(
        session.capture_photo().await,
        Err(SessionError::CaptureFailed(_))
    ));
}

#[tokio::test]
async fn terminal_bind_failure_leaves_session_unbound() {
    let dir = tempfile::tempdir().unwrap();
    let camera = SyntheticCamera::new(dir.path().to_path_buf()).reject_all_graphs();
    let (mut session, _events) = session_with(camera, all_grants(), dir.path());

    let result = session.start(CameraFacing::Back).await;
    assert!(matches!(result, Err(SessionError::BindingFailed(_))));
    assert_eq!(session.state(), SessionState::Unbound);
}

#[tokio::test]
async fn recording_fault_triggers_automatic_rebind() {
    let dir = tempfile::tempdir().unwrap();
    let camera = SyntheticCamera::new(dir.path().to_path_buf())
        .fail_recording(RecordingError::EncodingFault("synthetic".to_string()));
    let (mut session, mut events) = session_with(camera, all_grants(), dir.path());

    session.start(CameraFacing::Back).await.unwrap();
    session.set_mode(CaptureMode::Video).await.unwrap();
    session.toggle_recording().await.unwrap();
    let _ = drain(&mut events);

    let result = session.toggle_recording().await;
    assert!(matches!(
        result,
        Err(SessionError::Recording(RecordingError::EncodingFault(_)))
    ));

    let collected = drain(&mut events);
    assert!(collected
        .iter()
        .any(|e| matches!(e, SessionEvent::Error(SessionError::Recording(_)))));
    // The controller rebound the graph after the fault
    assert!(collected
        .iter()
        .any(|e| matches!(e, SessionEvent::CameraBound { fallback: false })));
    assert_eq!(session.state(), SessionState::Bound);
    assert!(!session.is_recording_active());
}

#[tokio::test]
async fn recorder_start_fault_triggers_automatic_rebind() {
    let dir = tempfile::tempdir().unwrap();
    let camera = SyntheticCamera::new(dir.path().to_path_buf())
        .fail_recording_start(RecordingError::EncodingFault("synthetic".to_string()));
    let (mut session, mut events) = session_with(camera, all_grants(), dir.path());

    session.start(CameraFacing::Back).await.unwrap();
    session.set_mode(CaptureMode::Video).await.unwrap();
    let _ = drain(&mut events);

    let result = session.toggle_recording().await;
    assert!(matches!(
        result,
        Err(SessionError::Recording(RecordingError::EncodingFault(_)))
    ));
    assert!(!session.is_recording_active());

    let collected = drain(&mut events);
    assert!(collected
        .iter()
        .any(|e| matches!(e, SessionEvent::Error(SessionError::Recording(_)))));
    // The failed start triggered the same rebind recovery as a finalize fault
    assert!(collected
        .iter()
        .any(|e| matches!(e, SessionEvent::CameraBound { fallback: false })));
    assert_eq!(session.state(), SessionState::Bound);
}

#[tokio::test]
async fn recording_requires_microphone_grant() {
    let dir = tempfile::tempdir().unwrap();
    let camera = SyntheticCamera::new(dir.path().to_path_buf());
    let no_mic = StaticGrants::new([Permission::Camera, Permission::Storage]);
    let (mut session, mut events) = session_with(camera, no_mic, dir.path());

    session.start(CameraFacing::Back).await.unwrap();
    session.set_mode(CaptureMode::Video).await.unwrap();

    let result = session.toggle_recording().await;
    assert_eq!(
        result,
        Err(SessionError::PermissionDenied(Permission::Microphone))
    );
    assert!(!session.is_recording_active());
    assert_eq!(session.state(), SessionState::Bound);

    let saved = drain(&mut events)
        .into_iter()
        .filter(|e| matches!(e, SessionEvent::VideoSaved(_)))
        .count();
    assert_eq!(saved, 0);
}

#[tokio::test]
async fn start_requires_camera_grant() {
    let dir = tempfile::tempdir().unwrap();
    let camera = SyntheticCamera::new(dir.path().to_path_buf());
    let no_camera = StaticGrants::new([Permission::Storage]);
    let (mut session, _events) = session_with(camera, no_camera, dir.path());

    assert_eq!(
        session.start(CameraFacing::Back).await,
        Err(SessionError::PermissionDenied(Permission::Camera))
    );
    assert_eq!(session.state(), SessionState::Unbound);
}

#[tokio::test]
async fn release_during_recording_finalizes_as_user_stop() {
    let dir = tempfile::tempdir().unwrap();
    let camera = SyntheticCamera::new(dir.path().to_path_buf());
    let (mut session, mut events) = session_with(camera, all_grants(), dir.path());

    session.start(CameraFacing::Back).await.unwrap();
    session.set_mode(CaptureMode::Video).await.unwrap();
    session.toggle_recording().await.unwrap();

    session.release().await;
    assert_eq!(session.state(), SessionState::Unbound);
    assert!(!session.is_recording_active());

    // The in-flight recording was finalized, not discarded
    let saved = drain(&mut events)
        .into_iter()
        .filter(|e| matches!(e, SessionEvent::VideoSaved(_)))
        .count();
    assert_eq!(saved, 1);
}
