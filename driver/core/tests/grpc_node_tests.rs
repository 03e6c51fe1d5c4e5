//! Integration tests for the CSI Node gRPC service
//!
//! Calls the tonic service trait directly and checks status codes and the
//! mounts recorded by the in-memory mounter.

use irods_csi_core::application::node_service::StandardNodeService;
use irods_csi_core::domain::backend::BackendKind;
use irods_csi_core::infrastructure::mount::mock::MockMounter;
use irods_csi_core::presentation::grpc::csi::node_server::Node;
use irods_csi_core::presentation::grpc::csi::volume_capability::{self, access_mode::Mode};
use irods_csi_core::presentation::grpc::csi::*;
use irods_csi_core::presentation::grpc::NodeGrpcService;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tonic::{Code, Request};

const TARGET: &str = "/var/lib/kubelet/pods/p2/volumes/kubernetes.io~csi/pv2/mount";

fn grpc_service(mounter: &Arc<MockMounter>) -> NodeGrpcService {
    NodeGrpcService::new(Arc::new(StandardNodeService::new(
        mounter.clone(),
        "worker-7",
        BackendKind::Direct,
    )))
}

fn mount_capability(mode: Mode) -> VolumeCapability {
    VolumeCapability {
        access_type: Some(volume_capability::AccessType::Mount(volume_capability::MountVolume::default())),
        access_mode: Some(volume_capability::AccessMode { mode: mode as i32 }),
    }
}

fn nfs_publish_request() -> NodePublishVolumeRequest {
    NodePublishVolumeRequest {
        volume_id: "pv2".to_string(),
        target_path: TARGET.to_string(),
        volume_capability: Some(mount_capability(Mode::MultiNodeMultiWriter)),
        volume_context: HashMap::from([
            ("client".to_string(), "nfs".to_string()),
            ("host".to_string(), "nfs.example.org".to_string()),
            ("path".to_string(), "/export/data".to_string()),
        ]),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_publish_and_unpublish_over_grpc() {
    let mounter = Arc::new(MockMounter::new());
    let service = grpc_service(&mounter);

    service
        .node_publish_volume(Request::new(nfs_publish_request()))
        .await
        .unwrap();
    assert!(mounter.is_mounted(Path::new(TARGET)));

    service
        .node_unpublish_volume(Request::new(NodeUnpublishVolumeRequest {
            volume_id: "pv2".to_string(),
            target_path: TARGET.to_string(),
        }))
        .await
        .unwrap();
    assert!(!mounter.is_mounted(Path::new(TARGET)));
}

#[tokio::test]
async fn test_publish_errors_map_to_status_codes() {
    let mounter = Arc::new(MockMounter::new());
    let service = grpc_service(&mounter);

    let mut request = nfs_publish_request();
    request.volume_capability = Some(mount_capability(Mode::SingleNodeMultiWriter));
    let status = service.node_publish_volume(Request::new(request)).await.unwrap_err();
    assert_eq!(status.code(), Code::InvalidArgument);

    let mut request = nfs_publish_request();
    request.volume_id.clear();
    let status = service.node_publish_volume(Request::new(request)).await.unwrap_err();
    assert_eq!(status.code(), Code::InvalidArgument);
    assert_eq!(status.message(), "Volume ID not provided");

    mounter.fail_with(|f| f.mount = Some("mount.nfs: access denied by server".to_string()));
    let status = service
        .node_publish_volume(Request::new(nfs_publish_request()))
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::Internal);
    assert!(status.message().contains("access denied by server"));
}

#[tokio::test]
async fn test_unsupported_rpcs_are_unimplemented() {
    let mounter = Arc::new(MockMounter::new());
    let service = grpc_service(&mounter);

    let status = service
        .node_stage_volume(Request::new(NodeStageVolumeRequest::default()))
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::Unimplemented);

    let status = service
        .node_unstage_volume(Request::new(NodeUnstageVolumeRequest::default()))
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::Unimplemented);

    let status = service
        .node_get_volume_stats(Request::new(NodeGetVolumeStatsRequest::default()))
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::Unimplemented);

    let status = service
        .node_expand_volume(Request::new(NodeExpandVolumeRequest::default()))
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::Unimplemented);

    assert!(mounter.calls().is_empty());
}

#[tokio::test]
async fn test_capabilities_and_info() {
    let mounter = Arc::new(MockMounter::new());
    let service = grpc_service(&mounter);

    let capabilities = service
        .node_get_capabilities(Request::new(NodeGetCapabilitiesRequest {}))
        .await
        .unwrap()
        .into_inner();
    assert!(capabilities.capabilities.is_empty());

    let info = service
        .node_get_info(Request::new(NodeGetInfoRequest {}))
        .await
        .unwrap()
        .into_inner();
    assert_eq!(info.node_id, "worker-7");
    assert_eq!(info.max_volumes_per_node, 0);
    assert!(info.accessible_topology.is_none());
}
