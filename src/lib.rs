// SPDX-License-Identifier: GPL-3.0-only

//! simplecam - camera capture sessions with an on-device media catalog
//!
//! The crate is organized into several modules:
//!
//! - [`session`]: the capture session controller (camera ownership, binding,
//!   mode switching, recording lifecycle)
//! - [`pipelines`]: photo capture and video recording pipelines
//! - [`backends`]: camera resource abstraction and the synthetic backend
//! - [`output`]: output target resolution (structured store vs direct file)
//! - [`catalog`]: captured artifact records and the JSON catalog
//! - [`permissions`]: permission broker seam
//! - [`config`]: user configuration handling
//! - [`storage`]: app-owned media directories and file lookups

pub mod backends;
pub mod catalog;
pub mod config;
pub mod constants;
pub mod errors;
pub mod output;
pub mod permissions;
pub mod pipelines;
pub mod session;
pub mod storage;

// Re-export commonly used types
pub use backends::{CameraFacing, CameraResource, PreviewSurface, RecorderHandle, UseCaseGraph};
pub use catalog::{CapturedArtifact, CatalogGateway, JsonCatalog, MediaKind};
pub use config::Config;
pub use errors::{RecordingError, SessionError, SessionResult};
pub use output::{OutputDescriptor, SinkPolicy};
pub use permissions::{GrantAll, Permission, PermissionBroker, StaticGrants};
pub use session::{CaptureMode, SessionController, SessionEvent, SessionState};
