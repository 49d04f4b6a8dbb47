// SPDX-License-Identifier: GPL-3.0-only

//! Synthetic camera backend
//!
//! Stands in for real camera hardware on machines without one: frames are
//! generated, but sinks write real files, so the capture/record/catalog path
//! behaves end to end. Also the backend the test suite drives, via the
//! failure-injection knobs.

use super::{
    BackendError, BackendResult, CameraFacing, CameraResource, CaptureAck, PreviewSurface,
    RecorderHandle, UseCaseGraph,
};
use crate::errors::RecordingError;
use crate::output::OutputDescriptor;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Synthetic image dimensions
const FRAME_WIDTH: u32 = 64;
const FRAME_HEIGHT: u32 = 48;

/// Simulated encoder flush time on finalize
const FINALIZE_LATENCY: Duration = Duration::from_millis(10);

/// Synthetic camera device
#[derive(Debug)]
pub struct SyntheticCamera {
    /// Root directory structured-store artifacts are materialized under
    store_root: PathBuf,
    facing: Option<CameraFacing>,
    bound: Option<UseCaseGraph>,

    // Failure injection
    deny_acquire: bool,
    reject_capture_graphs: bool,
    reject_all_graphs: bool,
    recording_start_fault: Option<RecordingError>,
    recording_fault: Option<RecordingError>,
}

impl SyntheticCamera {
    /// Camera whose structured-store sink materializes under `store_root`
    pub fn new(store_root: PathBuf) -> Self {
        Self {
            store_root,
            facing: None,
            bound: None,
            deny_acquire: false,
            reject_capture_graphs: false,
            reject_all_graphs: false,
            recording_start_fault: None,
            recording_fault: None,
        }
    }

    /// Refuse all acquisition attempts
    pub fn deny_acquire(mut self) -> Self {
        self.deny_acquire = true;
        self
    }

    /// Reject any graph carrying photo or video use cases (the preview-only
    /// fallback still binds)
    pub fn reject_capture_graphs(mut self) -> Self {
        self.reject_capture_graphs = true;
        self
    }

    /// Reject every graph, fallback included
    pub fn reject_all_graphs(mut self) -> Self {
        self.reject_all_graphs = true;
        self
    }

    /// Fail the next recorder start with the given reason
    pub fn fail_recording_start(mut self, fault: RecordingError) -> Self {
        self.recording_start_fault = Some(fault);
        self
    }

    /// Fail the next recording finalize with the given reason
    pub fn fail_recording(mut self, fault: RecordingError) -> Self {
        self.recording_fault = Some(fault);
        self
    }

    /// Graph currently bound, if any
    pub fn bound_graph(&self) -> Option<&UseCaseGraph> {
        self.bound.as_ref()
    }

    /// Full path a descriptor resolves to under this backend
    fn target_path(&self, descriptor: &OutputDescriptor) -> PathBuf {
        match descriptor {
            OutputDescriptor::StructuredStore {
                display_name,
                relative_path,
                ..
            } => self.store_root.join(relative_path).join(display_name),
            OutputDescriptor::DirectFile { path } => path.clone(),
        }
    }
}

/// Write a small gradient frame to `path`, format inferred from extension
fn write_frame(path: PathBuf) -> BackendResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| BackendError::CaptureFailed(e.to_string()))?;
    }

    let frame = image::RgbImage::from_fn(FRAME_WIDTH, FRAME_HEIGHT, |x, y| {
        image::Rgb([
            (x * 255 / FRAME_WIDTH) as u8,
            (y * 255 / FRAME_HEIGHT) as u8,
            128,
        ])
    });
    frame
        .save(&path)
        .map_err(|e| BackendError::CaptureFailed(e.to_string()))
}

impl CameraResource for SyntheticCamera {
    type Recorder = SyntheticRecorder;

    async fn acquire(&mut self, facing: CameraFacing) -> BackendResult<()> {
        if self.deny_acquire {
            warn!(%facing, "Synthetic camera configured to deny acquisition");
            return Err(BackendError::AcquireDenied(
                "synthetic denial".to_string(),
            ));
        }

        info!(%facing, "Synthetic camera acquired");
        self.facing = Some(facing);
        Ok(())
    }

    fn unbind_all(&mut self) {
        if self.bound.take().is_some() {
            debug!("Synthetic camera unbound");
        }
    }

    async fn bind(&mut self, graph: &UseCaseGraph, surface: &PreviewSurface) -> BackendResult<()> {
        if self.facing.is_none() {
            return Err(BackendError::BindRejected("camera not acquired".to_string()));
        }
        if self.reject_all_graphs {
            return Err(BackendError::BindRejected("synthetic rejection".to_string()));
        }
        if self.reject_capture_graphs && (graph.photo || graph.video) {
            return Err(BackendError::BindRejected(
                "capture use cases rejected".to_string(),
            ));
        }

        info!(
            surface = surface.label(),
            facing = %graph.facing,
            preview = graph.preview,
            photo = graph.photo,
            video = graph.video,
            "Synthetic camera bound"
        );
        self.facing = Some(graph.facing);
        self.bound = Some(graph.clone());
        Ok(())
    }

    async fn take_photo(&mut self, descriptor: &OutputDescriptor) -> BackendResult<CaptureAck> {
        let bound_photo = self.bound.as_ref().is_some_and(|g| g.photo);
        if !bound_photo {
            return Err(BackendError::CaptureFailed(
                "photo use case not bound".to_string(),
            ));
        }

        let path = self.target_path(descriptor);
        let structured = matches!(descriptor, OutputDescriptor::StructuredStore { .. });

        // Hardware write happens off the async executor
        let write_path = path.clone();
        tokio::task::spawn_blocking(move || write_frame(write_path))
            .await
            .map_err(|e| BackendError::CaptureFailed(e.to_string()))??;

        debug!(path = %path.display(), "Synthetic frame written");

        // The structured store echoes the saved reference; the plain file
        // sink only confirms the write, like the original platform sinks.
        let output_ref = structured.then(|| format!("file://{}", path.display()));
        Ok(CaptureAck { output_ref })
    }

    async fn start_recording(
        &mut self,
        descriptor: &OutputDescriptor,
    ) -> BackendResult<Self::Recorder> {
        let bound_video = self.bound.as_ref().is_some_and(|g| g.video);
        if !bound_video {
            return Err(BackendError::Record(RecordingError::InvalidOutput));
        }
        if let Some(fault) = self.recording_start_fault.take() {
            warn!(error = %fault, "Synthetic recorder start fault");
            return Err(BackendError::Record(fault));
        }

        let path = self.target_path(descriptor);
        info!(path = %path.display(), "Synthetic recording started");
        Ok(SyntheticRecorder {
            path,
            fault: self.recording_fault.take(),
        })
    }

    fn release(&mut self) {
        self.unbind_all();
        if self.facing.take().is_some() {
            info!("Synthetic camera released");
        }
    }
}

/// In-flight synthetic recording
#[derive(Debug)]
pub struct SyntheticRecorder {
    path: PathBuf,
    fault: Option<RecordingError>,
}

impl RecorderHandle for SyntheticRecorder {
    async fn finalize(self) -> Result<String, RecordingError> {
        // Simulated flush of buffered data
        tokio::time::sleep(FINALIZE_LATENCY).await;

        if let Some(fault) = self.fault {
            warn!(path = %self.path.display(), error = %fault, "Synthetic finalize fault");
            return Err(fault);
        }

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| RecordingError::Unknown(e.to_string()))?;
        }
        std::fs::write(&self.path, b"synthetic video payload")
            .map_err(|e| RecordingError::Unknown(e.to_string()))?;

        info!(path = %self.path.display(), "Synthetic recording finalized");
        Ok(format!("file://{}", self.path.display()))
    }
}
