// SPDX-License-Identifier: GPL-3.0-only

//! Output target resolution
//!
//! Decides, per capture or recording start, where the artifact bytes go:
//! a structured media store addressed by metadata, or a plain file inside
//! the app-owned directory. The decision is a tagged variant resolved once
//! per call, never cached.

use crate::catalog::MediaKind;
use crate::constants::{
    PHOTO_EXT, PHOTO_MIME, PHOTO_PREFIX, TIMESTAMP_FORMAT, VIDEO_EXT, VIDEO_MIME, VIDEO_PREFIX,
    photo_collection, video_collection,
};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Which sink family the platform supports.
///
/// Structured store is used when the platform restricts direct filesystem
/// writes; direct file when unrestricted access is available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub enum SinkPolicy {
    /// Platform-managed media store addressed by metadata
    StructuredStore,
    /// Plain file in an app-owned directory
    #[default]
    DirectFile,
}

/// Resolved output sink for one capture or recording
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputDescriptor {
    /// Structured-store destination
    StructuredStore {
        /// Generated timestamped display name
        display_name: String,
        /// Fixed MIME type for the media kind
        mime_type: &'static str,
        /// Relative collection path, e.g. `Pictures/SimpleCam`
        relative_path: String,
    },
    /// Direct file path inside the app-owned directory
    DirectFile {
        /// Full target path
        path: PathBuf,
    },
}

impl OutputDescriptor {
    /// Media kind this descriptor was resolved for
    pub fn media_kind(&self) -> MediaKind {
        match self {
            OutputDescriptor::StructuredStore { mime_type, .. } => {
                if mime_type.starts_with("video/") {
                    MediaKind::Video
                } else {
                    MediaKind::Photo
                }
            }
            OutputDescriptor::DirectFile { path } => {
                match path.extension().and_then(|e| e.to_str()) {
                    Some(ext) if ext.eq_ignore_ascii_case(VIDEO_EXT) => MediaKind::Video,
                    _ => MediaKind::Photo,
                }
            }
        }
    }

}

/// Generated file name for a media kind, e.g. `IMG_20250101_120000.jpg`
pub fn file_name(kind: MediaKind) -> String {
    let stamp = chrono::Local::now().format(TIMESTAMP_FORMAT);
    match kind {
        MediaKind::Photo => format!("{}{}.{}", PHOTO_PREFIX, stamp, PHOTO_EXT),
        MediaKind::Video => format!("{}{}.{}", VIDEO_PREFIX, stamp, VIDEO_EXT),
    }
}

/// Resolve the concrete output sink for one operation.
///
/// `media_dir` is the app-owned directory for the media kind (see
/// [`crate::storage::media_dir`]); it backs the direct-file branch and the
/// fallback lookup.
pub fn resolve(policy: SinkPolicy, kind: MediaKind, media_dir: &Path) -> OutputDescriptor {
    let name = file_name(kind);

    let descriptor = match policy {
        SinkPolicy::StructuredStore => OutputDescriptor::StructuredStore {
            display_name: name,
            mime_type: match kind {
                MediaKind::Photo => PHOTO_MIME,
                MediaKind::Video => VIDEO_MIME,
            },
            relative_path: match kind {
                MediaKind::Photo => photo_collection(),
                MediaKind::Video => video_collection(),
            },
        },
        SinkPolicy::DirectFile => OutputDescriptor::DirectFile {
            path: media_dir.join(name),
        },
    };

    debug!(?kind, ?descriptor, "Resolved output target");
    descriptor
}

/// Last-resort output reference lookup for sinks that do not echo one back:
/// the most recently modified file of the right kind in the app-owned
/// directory.
pub async fn latest_reference(media_dir: &Path, kind: MediaKind) -> Option<String> {
    let extension = match kind {
        MediaKind::Photo => PHOTO_EXT,
        MediaKind::Video => VIDEO_EXT,
    };

    crate::storage::latest_file_with_extension(media_dir, extension)
        .await
        .map(|path| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structured_photo_descriptor_has_mime_and_collection() {
        let dir = PathBuf::from("/tmp/unused");
        match resolve(SinkPolicy::StructuredStore, MediaKind::Photo, &dir) {
            OutputDescriptor::StructuredStore {
                display_name,
                mime_type,
                relative_path,
            } => {
                assert!(display_name.starts_with(PHOTO_PREFIX));
                assert!(display_name.ends_with(".jpg"));
                assert_eq!(mime_type, "image/jpeg");
                assert_eq!(relative_path, photo_collection());
            }
            other => panic!("expected structured store descriptor, got {:?}", other),
        }
    }

    #[test]
    fn descriptor_reports_the_kind_it_was_resolved_for() {
        let dir = PathBuf::from("/tmp/unused");
        let photo = resolve(SinkPolicy::StructuredStore, MediaKind::Photo, &dir);
        assert_eq!(photo.media_kind(), MediaKind::Photo);
        let video = resolve(SinkPolicy::DirectFile, MediaKind::Video, &dir);
        assert_eq!(video.media_kind(), MediaKind::Video);
    }

    #[test]
    fn direct_video_descriptor_lands_in_media_dir() {
        let dir = PathBuf::from("/tmp/videos");
        match resolve(SinkPolicy::DirectFile, MediaKind::Video, &dir) {
            OutputDescriptor::DirectFile { path } => {
                assert!(path.starts_with(&dir));
                let name = path.file_name().unwrap().to_string_lossy();
                assert!(name.starts_with(VIDEO_PREFIX));
                assert!(name.ends_with(".mp4"));
            }
            other => panic!("expected direct file descriptor, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn latest_reference_finds_matching_kind_only() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("VID_1.mp4"), b"v").unwrap();

        assert!(latest_reference(dir.path(), MediaKind::Photo).await.is_none());
        let video = latest_reference(dir.path(), MediaKind::Video).await;
        assert!(video.is_some_and(|r| r.ends_with("VID_1.mp4")));
    }
}
