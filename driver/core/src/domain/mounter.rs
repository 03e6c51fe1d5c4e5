// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Mounter Trait - Anti-Corruption Layer over the host's mount machinery
//!
//! The node service never touches the filesystem, the mount table or the
//! mount helpers directly. It goes through [`Mounter`], which the
//! infrastructure layer implements for the real host (`SystemMounter`) and
//! in memory for tests (`MockMounter`).
//!
//! The mounted/unmounted state of a target path is never cached in-process;
//! [`current_state`] re-derives it from the mount table on every call so a
//! restart between publish and unpublish is harmless.

use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

use crate::domain::mount_spec::MountSpec;

/// Permissions for target directories created during publish
pub const TARGET_DIR_MODE: u32 = 0o750;

/// Mount-table answer for a path
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MountReference {
    /// Device (source) mounted at the path; empty when not mounted
    pub device: String,
    /// Number of mount-table entries for that device; 0 means not mounted
    pub count: usize,
}

/// Host primitives consumed by the node service
#[async_trait]
pub trait Mounter: Send + Sync {
    async fn directory_exists(&self, path: &Path) -> bool;

    /// Create `path` (and missing parents) with `mode`
    async fn create_directory(&self, path: &Path, mode: u32) -> Result<(), MountError>;

    /// Remove the (empty) directory at `path`
    async fn remove_directory(&self, path: &Path) -> Result<(), MountError>;

    async fn mount_reference_count(&self, path: &Path) -> Result<MountReference, MountError>;

    /// Run the mount helper for `spec`.
    ///
    /// Implementations must never log `spec.sensitive_options` or
    /// `spec.stdin_inputs`.
    async fn mount(&self, spec: &MountSpec) -> Result<(), MountError>;

    async fn unmount(&self, path: &Path) -> Result<(), MountError>;
}

/// Mount primitive errors
#[derive(Debug, Error)]
pub enum MountError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{command} failed ({status}): {output}")]
    CommandFailed {
        /// Rendered command line with sensitive options masked
        command: String,
        status: String,
        output: String,
    },

    #[error("mount table unavailable: {0}")]
    MountTable(String),

    #[error("{0}")]
    Other(String),
}

/// Derived state of a target path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MountState {
    Unmounted,
    Mounted { device: String, references: usize },
}

impl MountState {
    pub fn is_mounted(&self) -> bool {
        matches!(self, Self::Mounted { .. })
    }
}

impl From<MountReference> for MountState {
    fn from(reference: MountReference) -> Self {
        if reference.count == 0 {
            Self::Unmounted
        } else {
            Self::Mounted {
                device: reference.device,
                references: reference.count,
            }
        }
    }
}

/// Query the mount table for the state of `path`.
pub async fn current_state(mounter: &dyn Mounter, path: &Path) -> Result<MountState, MountError> {
    mounter.mount_reference_count(path).await.map(MountState::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_from_reference() {
        assert_eq!(MountState::from(MountReference::default()), MountState::Unmounted);

        let state = MountState::from(MountReference {
            device: "nfs.example.org:/export/data".to_string(),
            count: 2,
        });
        assert!(state.is_mounted());
        assert_eq!(
            state,
            MountState::Mounted {
                device: "nfs.example.org:/export/data".to_string(),
                references: 2,
            }
        );
    }

    #[test]
    fn test_command_failure_message() {
        let err = MountError::CommandFailed {
            command: "mount -t nfs nfs.example.org:/export/data /mnt/nfs".to_string(),
            status: "exit status: 32".to_string(),
            output: "mount.nfs: access denied".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "mount -t nfs nfs.example.org:/export/data /mnt/nfs failed (exit status: 32): mount.nfs: access denied"
        );
    }
}
