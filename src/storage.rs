// SPDX-License-Identifier: GPL-3.0-only

//! Storage utilities for the app-owned media directories

use crate::catalog::MediaKind;
use crate::constants::APP_NAME;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// App-owned directory for a media kind, created on demand.
///
/// Photos land under the platform pictures directory, videos under the
/// platform videos directory, each in an `APP_NAME` subdirectory. Falls back
/// to the home directory when the platform dirs are missing.
pub fn media_dir(kind: MediaKind) -> std::io::Result<PathBuf> {
    let base = match kind {
        MediaKind::Photo => dirs::picture_dir(),
        MediaKind::Video => dirs::video_dir(),
    };

    let dir = base
        .or_else(dirs::home_dir)
        .ok_or_else(|| std::io::Error::other("no home directory"))?
        .join(APP_NAME);

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Most recently modified file in `dir` with the given extension.
///
/// Used as a last-resort lookup when a sink saves a file without reporting a
/// reference back. Scans on the blocking pool; the directory is expected to
/// stay small (app-owned, per media kind).
pub async fn latest_file_with_extension(dir: &Path, extension: &str) -> Option<PathBuf> {
    let dir = dir.to_path_buf();
    let extension = extension.to_ascii_lowercase();

    let result = tokio::task::spawn_blocking(move || {
        let entries = std::fs::read_dir(&dir).ok()?;

        let mut newest: Option<(std::time::SystemTime, PathBuf)> = None;
        for entry in entries.flatten() {
            let path = entry.path();
            let matches = path
                .extension()
                .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case(&extension))
                .unwrap_or(false);
            if !matches {
                continue;
            }

            let Some(modified) = entry.metadata().ok().and_then(|m| m.modified().ok()) else {
                continue;
            };
            match &newest {
                Some((time, _)) if *time >= modified => {}
                _ => newest = Some((modified, path)),
            }
        }

        newest.map(|(_, path)| path)
    })
    .await;

    match result {
        Ok(Some(path)) => {
            debug!(path = %path.display(), "Latest matching file found");
            Some(path)
        }
        Ok(None) => None,
        Err(e) => {
            warn!(error = %e, "Latest-file scan task failed");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[tokio::test]
    async fn latest_file_picks_newest_matching_extension() {
        let dir = tempfile::tempdir().unwrap();

        let older = dir.path().join("IMG_a.jpg");
        fs::write(&older, b"a").unwrap();
        // Ensure a strictly newer mtime on the second file
        std::thread::sleep(std::time::Duration::from_millis(20));
        let newer = dir.path().join("IMG_b.jpg");
        fs::write(&newer, b"b").unwrap();
        fs::write(dir.path().join("VID_c.mp4"), b"c").unwrap();

        let found = latest_file_with_extension(dir.path(), "jpg").await;
        assert_eq!(found, Some(newer));
    }

    #[tokio::test]
    async fn latest_file_in_empty_dir_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(latest_file_with_extension(dir.path(), "jpg").await, None);
    }
}
