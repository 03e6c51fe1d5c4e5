// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Node Service Errors
//!
//! Every failure the node service can report to its caller. Each variant maps
//! onto one of three categories ([`ErrorKind`]) which the presentation layer
//! translates into gRPC status codes.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Error taxonomy shared by extraction, orchestration and transport

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::backend::BackendKind;
use crate::domain::mounter::MountError;

/// Caller-facing error category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request is malformed or asks for something this plugin cannot do
    InvalidArgument,
    /// A side-effecting step (directory, mount table, mount, unmount) failed
    Internal,
    /// The operation is permanently unsupported by this plugin
    Unimplemented,
}

/// Node service errors
#[derive(Debug, Error)]
pub enum NodeError {
    #[error("{0} not provided")]
    MissingField(&'static str),

    #[error("Volume capability not supported")]
    UnsupportedCapability,

    #[error("Volume context property {0} not supported")]
    UnsupportedContextKey(String),

    #[error("unknown client type - {0}")]
    UnknownBackend(String),

    #[error("Argument {key} is not given for {backend} client")]
    MissingParameter { backend: BackendKind, key: &'static str },

    #[error("Argument {key} has invalid value {value:?}: {reason}")]
    InvalidParameter {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("Could not create dir {path:?}: {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: MountError,
    },

    #[error("Could not mount {source_id:?} ({fs_type:?}) at {target:?}: {source}")]
    Mount {
        source_id: String,
        fs_type: &'static str,
        target: PathBuf,
        #[source]
        source: MountError,
    },

    #[error("failed to check if volume is mounted: {0}")]
    MountTable(#[source] MountError),

    #[error("Could not unmount {path:?}: {source}")]
    Unmount {
        path: PathBuf,
        #[source]
        source: MountError,
    },

    #[error("{0} is not supported by this plugin")]
    Unimplemented(&'static str),
}

impl NodeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingField(_)
            | Self::UnsupportedCapability
            | Self::UnsupportedContextKey(_)
            | Self::UnknownBackend(_)
            | Self::MissingParameter { .. }
            | Self::InvalidParameter { .. } => ErrorKind::InvalidArgument,
            Self::CreateDirectory { .. }
            | Self::Mount { .. }
            | Self::MountTable(_)
            | Self::Unmount { .. } => ErrorKind::Internal,
            Self::Unimplemented(_) => ErrorKind::Unimplemented,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(NodeError::MissingField("Volume ID").kind(), ErrorKind::InvalidArgument);
        assert_eq!(
            NodeError::UnsupportedContextKey("hots".to_string()).kind(),
            ErrorKind::InvalidArgument
        );
        assert_eq!(
            NodeError::MountTable(MountError::MountTable("unreadable".to_string())).kind(),
            ErrorKind::Internal
        );
        assert_eq!(
            NodeError::Unimplemented("NodeStageVolume").kind(),
            ErrorKind::Unimplemented
        );
    }

    #[test]
    fn test_messages_name_the_offending_input() {
        let err = NodeError::UnsupportedContextKey("Hots".to_string());
        assert_eq!(err.to_string(), "Volume context property Hots not supported");

        let err = NodeError::MissingParameter {
            backend: BackendKind::Nfs,
            key: "path",
        };
        assert_eq!(err.to_string(), "Argument path is not given for nfs client");
    }
}
