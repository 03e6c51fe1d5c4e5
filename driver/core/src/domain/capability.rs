// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Volume and node capabilities.

use crate::domain::errors::NodeError;

/// How the volume is consumed by the workload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessType {
    /// Filesystem mount with caller-supplied mount flags
    Mount { fs_type: String, mount_flags: Vec<String> },
    /// Raw block device
    Block,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    Unknown,
    SingleNodeWriter,
    SingleNodeReaderOnly,
    MultiNodeReaderOnly,
    MultiNodeSingleWriter,
    MultiNodeMultiWriter,
    SingleNodeSingleWriter,
    SingleNodeMultiWriter,
}

/// Access modes a published volume may be requested with
pub const SUPPORTED_ACCESS_MODES: &[AccessMode] = &[
    AccessMode::SingleNodeWriter,
    AccessMode::SingleNodeReaderOnly,
    AccessMode::MultiNodeReaderOnly,
    AccessMode::MultiNodeSingleWriter,
    AccessMode::MultiNodeMultiWriter,
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeCapability {
    /// `None` when the caller left the access type unset
    pub access_type: Option<AccessType>,
    pub access_mode: AccessMode,
}

impl VolumeCapability {
    pub fn mount(access_mode: AccessMode, mount_flags: Vec<String>) -> Self {
        Self {
            access_type: Some(AccessType::Mount {
                fs_type: String::new(),
                mount_flags,
            }),
            access_mode,
        }
    }

    pub fn is_supported(&self) -> bool {
        matches!(self.access_type, Some(AccessType::Mount { .. }))
            && SUPPORTED_ACCESS_MODES.contains(&self.access_mode)
    }

    pub fn validate(&self) -> Result<(), NodeError> {
        if self.is_supported() {
            Ok(())
        } else {
            Err(NodeError::UnsupportedCapability)
        }
    }

    pub fn mount_flags(&self) -> &[String] {
        match &self.access_type {
            Some(AccessType::Mount { mount_flags, .. }) => mount_flags,
            _ => &[],
        }
    }
}

/// Optional node RPCs a plugin may advertise
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeCapability {
    StageUnstageVolume,
    GetVolumeStats,
    ExpandVolume,
}

/// This plugin publishes directly to the target path and advertises nothing
pub const NODE_CAPABILITIES: &[NodeCapability] = &[];
