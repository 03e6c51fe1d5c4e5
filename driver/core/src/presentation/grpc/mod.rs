// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! gRPC Presentation
//!
//! CSI v1 Identity and Node services and the server that hosts them.
//!
//! # Architecture
//!
//! - **Layer:** Presentation Layer
//! - **Purpose:** Translate CSI messages to application calls and `NodeError`
//!   to gRPC status codes

use tonic::Status;

use crate::domain::errors::{ErrorKind, NodeError};

// Generated protobuf code
pub mod csi {
    tonic::include_proto!("csi.v1");
}

pub mod identity;
pub mod node;
pub mod server;

pub use identity::IdentityGrpcService;
pub use node::NodeGrpcService;
pub use server::start_grpc_server;

impl From<NodeError> for Status {
    fn from(err: NodeError) -> Self {
        let message = err.to_string();
        match err.kind() {
            ErrorKind::InvalidArgument => Status::invalid_argument(message),
            ErrorKind::Internal => Status::internal(message),
            ErrorKind::Unimplemented => Status::unimplemented(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::mounter::MountError;
    use std::path::PathBuf;
    use tonic::Code;

    #[test]
    fn test_status_codes() {
        assert_eq!(Status::from(NodeError::MissingField("Volume ID")).code(), Code::InvalidArgument);
        assert_eq!(
            Status::from(NodeError::Unmount {
                path: PathBuf::from("/mnt/nfs"),
                source: MountError::Other("device busy".to_string()),
            })
            .code(),
            Code::Internal
        );
        assert_eq!(Status::from(NodeError::Unimplemented("NodeExpandVolume")).code(), Code::Unimplemented);
    }

    #[test]
    fn test_status_message_carries_cause() {
        let status = Status::from(NodeError::Unmount {
            path: PathBuf::from("/mnt/nfs"),
            source: MountError::Other("device busy".to_string()),
        });
        assert!(status.message().contains("/mnt/nfs"));
        assert!(status.message().contains("device busy"));
    }
}
