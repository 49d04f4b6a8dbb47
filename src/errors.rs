// SPDX-License-Identifier: GPL-3.0-only

//! Error types for capture sessions
//!
//! Every failure in the session controller and its pipelines is reported
//! upward as one of these typed values. Nothing here panics the caller.

use crate::permissions::Permission;
use std::fmt;

/// Result type alias using SessionError
pub type SessionResult<T> = Result<T, SessionError>;

/// Main capture session error type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Camera resource could not be acquired
    ResourceUnavailable(String),
    /// Use-case graph rejected, even after the fallback attempt
    BindingFailed(String),
    /// Operation refused due to conflicting state (e.g. mode switch while recording)
    Busy(&'static str),
    /// Photo capture failed
    CaptureFailed(String),
    /// Required permission grant is missing
    PermissionDenied(Permission),
    /// Recording failed with a classified reason
    Recording(RecordingError),
    /// Storage/filesystem errors (catalog, media directories)
    Storage(String),
}

/// Classified recording failure reasons
///
/// Mirrors the finalize error codes the underlying recorder can report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordingError {
    /// Storage or file size limit reached
    StorageLimit,
    /// Encoder fault while writing the stream
    EncodingFault(String),
    /// Output target rejected by the recorder
    InvalidOutput,
    /// Video source became inactive during recording
    SourceInactive,
    /// Unclassified recorder error
    Unknown(String),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::ResourceUnavailable(msg) => write!(f, "Camera unavailable: {}", msg),
            SessionError::BindingFailed(msg) => write!(f, "Camera binding failed: {}", msg),
            SessionError::Busy(what) => write!(f, "Busy: {}", what),
            SessionError::CaptureFailed(msg) => write!(f, "Photo capture failed: {}", msg),
            SessionError::PermissionDenied(permission) => {
                write!(f, "Permission not granted: {}", permission)
            }
            SessionError::Recording(e) => write!(f, "Recording failed: {}", e),
            SessionError::Storage(msg) => write!(f, "Storage error: {}", msg),
        }
    }
}

impl fmt::Display for RecordingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordingError::StorageLimit => write!(f, "storage limit reached"),
            RecordingError::EncodingFault(msg) => write!(f, "encoding fault: {}", msg),
            RecordingError::InvalidOutput => write!(f, "invalid output target"),
            RecordingError::SourceInactive => write!(f, "video source became inactive"),
            RecordingError::Unknown(msg) => write!(f, "unknown error: {}", msg),
        }
    }
}

impl std::error::Error for SessionError {}
impl std::error::Error for RecordingError {}

impl From<RecordingError> for SessionError {
    fn from(err: RecordingError) -> Self {
        SessionError::Recording(err)
    }
}

impl From<std::io::Error> for SessionError {
    fn from(err: std::io::Error) -> Self {
        SessionError::Storage(err.to_string())
    }
}
