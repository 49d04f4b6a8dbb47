// SPDX-License-Identifier: GPL-3.0-only

//! Permission broker seam
//!
//! The session controller never prompts for permissions itself; it only
//! checks grants through this trait. Prompt plumbing lives with the caller.

use std::collections::HashSet;
use std::fmt;

/// Permission identifiers the capture core cares about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    /// Access to the camera device
    Camera,
    /// Audio capture, required before a recording may start
    Microphone,
    /// Writing media files to shared storage
    Storage,
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Permission::Camera => write!(f, "camera"),
            Permission::Microphone => write!(f, "microphone"),
            Permission::Storage => write!(f, "storage"),
        }
    }
}

/// Read-only view of the caller's permission grants
pub trait PermissionBroker: Send + Sync {
    /// Check whether a permission has been granted
    fn has_grant(&self, permission: Permission) -> bool;
}

/// Broker that grants everything (desktop environments without a
/// permission model)
#[derive(Debug, Clone, Copy, Default)]
pub struct GrantAll;

impl PermissionBroker for GrantAll {
    fn has_grant(&self, _permission: Permission) -> bool {
        true
    }
}

/// Broker backed by a fixed set of grants
#[derive(Debug, Clone, Default)]
pub struct StaticGrants {
    granted: HashSet<Permission>,
}

impl StaticGrants {
    /// Create a broker with the given grants
    pub fn new(granted: impl IntoIterator<Item = Permission>) -> Self {
        Self {
            granted: granted.into_iter().collect(),
        }
    }

    /// Add a grant
    pub fn grant(&mut self, permission: Permission) {
        self.granted.insert(permission);
    }

    /// Remove a grant
    pub fn revoke(&mut self, permission: Permission) {
        self.granted.remove(&permission);
    }
}

impl PermissionBroker for StaticGrants {
    fn has_grant(&self, permission: Permission) -> bool {
        self.granted.contains(&permission)
    }
}
