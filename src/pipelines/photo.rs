// SPDX-License-Identifier: GPL-3.0-only

//! Still photo capture pipeline
//!
//! Issues one asynchronous capture against the bound photo use case and
//! resolves the saved artifact's output reference: from the sink's own
//! acknowledgment when it reports one, otherwise from a deterministic
//! latest-file lookup in the app-owned directory.

use crate::backends::CameraResource;
use crate::catalog::CapturedArtifact;
use crate::errors::{SessionError, SessionResult};
use crate::output::{self, OutputDescriptor};
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Photo capture pipeline
#[derive(Debug, Clone)]
pub struct PhotoPipeline {
    /// App-owned photo directory, searched by the fallback lookup
    media_dir: PathBuf,
}

impl PhotoPipeline {
    pub fn new(media_dir: PathBuf) -> Self {
        Self { media_dir }
    }

    /// Take a single photo.
    ///
    /// Never retries: a failed shot is reported and discarded. A sink that
    /// saved without reporting a reference degrades, at worst, to an artifact
    /// with no reference rather than a failed capture.
    pub async fn take_photo<C: CameraResource>(
        &self,
        camera: &mut C,
        descriptor: &OutputDescriptor,
    ) -> SessionResult<CapturedArtifact> {
        info!(?descriptor, "Taking photo");
        let kind = descriptor.media_kind();

        let ack = camera
            .take_photo(descriptor)
            .await
            .map_err(|e| SessionError::CaptureFailed(e.to_string()))?;

        let output_ref = match ack.output_ref {
            Some(reference) => {
                debug!(%reference, "Sink acknowledged with reference");
                Some(reference)
            }
            None => {
                // Deterministic last resort: newest matching file in the
                // app-owned directory. A miss is absorbed, not fatal.
                let found = output::latest_reference(&self.media_dir, kind).await;
                if found.is_none() {
                    warn!("Photo saved but no output reference could be recovered");
                }
                found
            }
        };

        Ok(CapturedArtifact::new(kind, output_ref, None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::synthetic::SyntheticCamera;
    use crate::backends::{CameraFacing, PreviewSurface, UseCaseGraph};
    use crate::catalog::MediaKind;
    use crate::output::{SinkPolicy, resolve};

    async fn bound_camera(root: PathBuf) -> SyntheticCamera {
        let mut camera = SyntheticCamera::new(root);
        camera.acquire(CameraFacing::Back).await.unwrap();
        camera
            .bind(
                &UseCaseGraph::full(CameraFacing::Back, false, None),
                &PreviewSurface::new("test"),
            )
            .await
            .unwrap();
        camera
    }

    #[tokio::test]
    async fn photo_artifact_has_reference_and_no_duration() {
        let dir = tempfile::tempdir().unwrap();
        let mut camera = bound_camera(dir.path().to_path_buf()).await;
        let pipeline = PhotoPipeline::new(dir.path().to_path_buf());

        let descriptor = resolve(SinkPolicy::StructuredStore, MediaKind::Photo, dir.path());
        let artifact = pipeline.take_photo(&mut camera, &descriptor).await.unwrap();

        assert_eq!(artifact.kind, MediaKind::Photo);
        assert!(artifact.duration_ms.is_none());
        assert!(artifact.output_ref.is_some_and(|r| !r.is_empty()));
    }

    #[tokio::test]
    async fn silent_sink_reference_recovered_by_lookup() {
        let dir = tempfile::tempdir().unwrap();
        let mut camera = bound_camera(dir.path().to_path_buf()).await;
        let pipeline = PhotoPipeline::new(dir.path().to_path_buf());

        // Direct-file sink writes but does not echo a reference
        let descriptor = resolve(SinkPolicy::DirectFile, MediaKind::Photo, dir.path());
        let artifact = pipeline.take_photo(&mut camera, &descriptor).await.unwrap();

        let reference = artifact.output_ref.expect("lookup recovers the reference");
        assert!(reference.ends_with(".jpg"));
    }

    #[tokio::test]
    async fn capture_failure_surfaces_as_capture_failed() {
        let dir = tempfile::tempdir().unwrap();
        // Acquired but never bound: no photo use case
        let mut camera = SyntheticCamera::new(dir.path().to_path_buf());
        camera.acquire(CameraFacing::Back).await.unwrap();
        let pipeline = PhotoPipeline::new(dir.path().to_path_buf());

        let descriptor = resolve(SinkPolicy::DirectFile, MediaKind::Photo, dir.path());
        match pipeline.take_photo(&mut camera, &descriptor).await {
            Err(SessionError::CaptureFailed(_)) => {}
            other => panic!("expected CaptureFailed, got {:?}", other),
        }
    }
}
