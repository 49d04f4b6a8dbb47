// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

use std::time::Duration;

/// Application name, used for the media collection subdirectories
pub const APP_NAME: &str = "SimpleCam";

/// Settle delay after a mode switch before the use-case graph is rebound.
///
/// Rebinding immediately after reconfiguring the preview surface produces a
/// visible glitch on most devices; a short pause lets the surface stabilize.
/// Latency/smoothness tradeoff, not a hard requirement.
pub const MODE_SWITCH_SETTLE: Duration = Duration::from_millis(200);

/// Upper bound on camera acquisition. A hung provider is reported as
/// `ResourceUnavailable` instead of blocking the session forever.
pub const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// Upper bound on recording finalize (flushing buffered data can outlast the
/// stop request, but not by this much).
pub const FINALIZE_TIMEOUT: Duration = Duration::from_secs(10);

/// Filename prefix for photos (IMG_20250101_120000.jpg)
pub const PHOTO_PREFIX: &str = "IMG_";

/// Filename prefix for videos (VID_20250101_120000.mp4)
pub const VIDEO_PREFIX: &str = "VID_";

/// Timestamp format used in generated file names
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// MIME type for captured photos
pub const PHOTO_MIME: &str = "image/jpeg";

/// MIME type for recorded videos
pub const VIDEO_MIME: &str = "video/mp4";

/// File extension for captured photos
pub const PHOTO_EXT: &str = "jpg";

/// File extension for recorded videos
pub const VIDEO_EXT: &str = "mp4";

/// Relative collection path for photos in a structured store
pub fn photo_collection() -> String {
    format!("Pictures/{}", APP_NAME)
}

/// Relative collection path for videos in a structured store
pub fn video_collection() -> String {
    format!("Movies/{}", APP_NAME)
}
