// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! gRPC Node Service Implementation
//! Exposes NodePublishVolume, NodeUnpublishVolume, NodeGetCapabilities, NodeGetInfo.
//! Staging, volume stats and expansion are answered with `Unimplemented`.

use std::sync::Arc;
use tonic::{Request, Response, Status};
use tracing::debug;

use crate::application::node_service::{NodeService, PublishVolumeRequest, UnpublishVolumeRequest};
use crate::domain::capability::{AccessMode, AccessType, NodeCapability, VolumeCapability};
use crate::domain::errors::NodeError;
use crate::domain::parameters::{VolumeContext, VolumeSecrets};

use super::csi::node_server::{Node, NodeServer};
use super::csi::node_service_capability::{self, rpc};
use super::csi::volume_capability::{self, access_mode::Mode};
use super::csi::*;

/// Implementation of the CSI Node gRPC service
pub struct NodeGrpcService {
    node_service: Arc<dyn NodeService>,
}

impl NodeGrpcService {
    pub fn new(node_service: Arc<dyn NodeService>) -> Self {
        Self { node_service }
    }

    /// Create a gRPC server instance
    pub fn into_server(self) -> NodeServer<Self> {
        NodeServer::new(self)
    }
}

#[tonic::async_trait]
impl Node for NodeGrpcService {
    async fn node_stage_volume(
        &self,
        _request: Request<NodeStageVolumeRequest>,
    ) -> Result<Response<NodeStageVolumeResponse>, Status> {
        Err(NodeError::Unimplemented("NodeStageVolume").into())
    }

    async fn node_unstage_volume(
        &self,
        _request: Request<NodeUnstageVolumeRequest>,
    ) -> Result<Response<NodeUnstageVolumeResponse>, Status> {
        Err(NodeError::Unimplemented("NodeUnstageVolume").into())
    }

    async fn node_publish_volume(
        &self,
        request: Request<NodePublishVolumeRequest>,
    ) -> Result<Response<NodePublishVolumeResponse>, Status> {
        let request = publish_request_from_proto(request.into_inner());
        self.node_service.publish_volume(request).await?;
        Ok(Response::new(NodePublishVolumeResponse {}))
    }

    async fn node_unpublish_volume(
        &self,
        request: Request<NodeUnpublishVolumeRequest>,
    ) -> Result<Response<NodeUnpublishVolumeResponse>, Status> {
        let req = request.into_inner();
        self.node_service
            .unpublish_volume(UnpublishVolumeRequest {
                volume_id: req.volume_id,
                target_path: req.target_path,
            })
            .await?;
        Ok(Response::new(NodeUnpublishVolumeResponse {}))
    }

    async fn node_get_volume_stats(
        &self,
        _request: Request<NodeGetVolumeStatsRequest>,
    ) -> Result<Response<NodeGetVolumeStatsResponse>, Status> {
        Err(NodeError::Unimplemented("NodeGetVolumeStats").into())
    }

    async fn node_expand_volume(
        &self,
        _request: Request<NodeExpandVolumeRequest>,
    ) -> Result<Response<NodeExpandVolumeResponse>, Status> {
        Err(NodeError::Unimplemented("NodeExpandVolume").into())
    }

    async fn node_get_capabilities(
        &self,
        _request: Request<NodeGetCapabilitiesRequest>,
    ) -> Result<Response<NodeGetCapabilitiesResponse>, Status> {
        debug!("NodeGetCapabilities: called");
        let capabilities = self
            .node_service
            .capabilities()
            .iter()
            .map(|cap| NodeServiceCapability {
                r#type: Some(node_service_capability::Type::Rpc(node_service_capability::Rpc {
                    r#type: rpc_type(*cap) as i32,
                })),
            })
            .collect();

        Ok(Response::new(NodeGetCapabilitiesResponse { capabilities }))
    }

    async fn node_get_info(
        &self,
        _request: Request<NodeGetInfoRequest>,
    ) -> Result<Response<NodeGetInfoResponse>, Status> {
        debug!("NodeGetInfo: called");
        Ok(Response::new(NodeGetInfoResponse {
            node_id: self.node_service.node_id().to_string(),
            max_volumes_per_node: 0,
            accessible_topology: None,
        }))
    }
}

fn rpc_type(capability: NodeCapability) -> rpc::Type {
    match capability {
        NodeCapability::StageUnstageVolume => rpc::Type::StageUnstageVolume,
        NodeCapability::GetVolumeStats => rpc::Type::GetVolumeStats,
        NodeCapability::ExpandVolume => rpc::Type::ExpandVolume,
    }
}

fn publish_request_from_proto(req: NodePublishVolumeRequest) -> PublishVolumeRequest {
    PublishVolumeRequest {
        volume_id: req.volume_id,
        target_path: req.target_path,
        volume_capability: req.volume_capability.map(capability_from_proto),
        readonly: req.readonly,
        volume_context: VolumeContext::from(req.volume_context),
        secrets: VolumeSecrets::from(req.secrets),
    }
}

fn capability_from_proto(cap: super::csi::VolumeCapability) -> VolumeCapability {
    let access_type = cap.access_type.map(|access_type| match access_type {
        volume_capability::AccessType::Mount(mount) => AccessType::Mount {
            fs_type: mount.fs_type,
            mount_flags: mount.mount_flags,
        },
        volume_capability::AccessType::Block(_) => AccessType::Block,
    });

    let access_mode = cap
        .access_mode
        .map(|m| access_mode_from_proto(m.mode()))
        .unwrap_or(AccessMode::Unknown);

    VolumeCapability {
        access_type,
        access_mode,
    }
}

fn access_mode_from_proto(mode: Mode) -> AccessMode {
    match mode {
        Mode::Unknown => AccessMode::Unknown,
        Mode::SingleNodeWriter => AccessMode::SingleNodeWriter,
        Mode::SingleNodeReaderOnly => AccessMode::SingleNodeReaderOnly,
        Mode::MultiNodeReaderOnly => AccessMode::MultiNodeReaderOnly,
        Mode::MultiNodeSingleWriter => AccessMode::MultiNodeSingleWriter,
        Mode::MultiNodeMultiWriter => AccessMode::MultiNodeMultiWriter,
        Mode::SingleNodeSingleWriter => AccessMode::SingleNodeSingleWriter,
        Mode::SingleNodeMultiWriter => AccessMode::SingleNodeMultiWriter,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn mount_capability(mode: Mode, flags: &[&str]) -> super::super::csi::VolumeCapability {
        super::super::csi::VolumeCapability {
            access_type: Some(volume_capability::AccessType::Mount(volume_capability::MountVolume {
                fs_type: String::new(),
                mount_flags: flags.iter().map(|f| f.to_string()).collect(),
                volume_mount_group: String::new(),
            })),
            access_mode: Some(volume_capability::AccessMode { mode: mode as i32 }),
        }
    }

    #[test]
    fn test_publish_request_conversion() {
        let req = NodePublishVolumeRequest {
            volume_id: "pv-1".to_string(),
            target_path: "/mnt/target".to_string(),
            volume_capability: Some(mount_capability(Mode::MultiNodeMultiWriter, &["noatime"])),
            readonly: true,
            volume_context: HashMap::from([("Host".to_string(), "nfs.example.org".to_string())]),
            secrets: HashMap::from([("password".to_string(), "pw123".to_string())]),
            ..Default::default()
        };

        let converted = publish_request_from_proto(req);
        assert_eq!(converted.volume_id, "pv-1");
        assert!(converted.readonly);
        assert_eq!(converted.volume_context.get("host"), Some("nfs.example.org"));
        assert_eq!(converted.secrets.get("PASSWORD"), Some("pw123"));

        let capability = converted.volume_capability.unwrap();
        assert_eq!(capability.access_mode, AccessMode::MultiNodeMultiWriter);
        assert_eq!(capability.mount_flags(), &["noatime".to_string()]);
        assert!(capability.is_supported());
    }

    #[test]
    fn test_block_and_unset_capabilities() {
        let block = super::super::csi::VolumeCapability {
            access_type: Some(volume_capability::AccessType::Block(volume_capability::BlockVolume {})),
            access_mode: Some(volume_capability::AccessMode {
                mode: Mode::SingleNodeWriter as i32,
            }),
        };
        assert_eq!(capability_from_proto(block).access_type, Some(AccessType::Block));

        let unset = capability_from_proto(super::super::csi::VolumeCapability::default());
        assert_eq!(unset.access_type, None);
        assert_eq!(unset.access_mode, AccessMode::Unknown);
        assert!(!unset.is_supported());
    }

    #[test]
    fn test_out_of_range_mode_is_unknown() {
        let cap = super::super::csi::VolumeCapability {
            access_type: None,
            access_mode: Some(volume_capability::AccessMode { mode: 42 }),
        };
        assert_eq!(capability_from_proto(cap).access_mode, AccessMode::Unknown);
    }
}
