// SPDX-License-Identifier: GPL-3.0-only

//! Capture pipelines
//!
//! - [`photo`]: single still-image acquisition
//! - [`video`]: recording lifecycle (start, active, stop, finalize)
//!
//! Both are driven by the session controller and report through typed
//! results; neither touches session state.

pub mod photo;
pub mod video;
