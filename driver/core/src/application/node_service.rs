// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Node Service Application Service
//!
//! Publish/unpublish orchestration coordinating:
//! - Domain layer: Backend Selector, Parameter Extractor, Mount Option Builder
//! - Mounter port: directory, mount-table and mount/unmount primitives
//!
//! Every call is independent. No lock is held and nothing is remembered
//! between calls; whether a path is mounted is always asked of the mount
//! table. All validation and extraction happens before the first side effect.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::domain::backend::{select_backend, BackendKind};
use crate::domain::capability::{NodeCapability, VolumeCapability, NODE_CAPABILITIES};
use crate::domain::connection::extract_connection;
use crate::domain::errors::NodeError;
use crate::domain::mount_spec::MountSpec;
use crate::domain::mounter::{current_state, MountState, Mounter, TARGET_DIR_MODE};
use crate::domain::parameters::{VolumeContext, VolumeSecrets};

// ============================================================================
// Requests
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct PublishVolumeRequest {
    pub volume_id: String,
    pub target_path: String,
    pub volume_capability: Option<VolumeCapability>,
    pub readonly: bool,
    pub volume_context: VolumeContext,
    pub secrets: VolumeSecrets,
}

#[derive(Debug, Clone, Default)]
pub struct UnpublishVolumeRequest {
    pub volume_id: String,
    pub target_path: String,
}

// ============================================================================
// Service Trait
// ============================================================================

#[async_trait]
pub trait NodeService: Send + Sync {
    /// Mount the requested volume at the target path
    async fn publish_volume(&self, request: PublishVolumeRequest) -> Result<(), NodeError>;

    /// Unmount the target path if it is mounted; succeeds when it is not
    async fn unpublish_volume(&self, request: UnpublishVolumeRequest) -> Result<(), NodeError>;

    /// Optional node RPCs advertised to the container orchestrator
    fn capabilities(&self) -> &'static [NodeCapability];

    /// Identifier of this node
    fn node_id(&self) -> &str;
}

// ============================================================================
// Standard Implementation
// ============================================================================

pub struct StandardNodeService {
    mounter: Arc<dyn Mounter>,
    node_id: String,
    default_backend: BackendKind,
}

impl StandardNodeService {
    pub fn new(
        mounter: Arc<dyn Mounter>,
        node_id: impl Into<String>,
        default_backend: BackendKind,
    ) -> Self {
        Self {
            mounter,
            node_id: node_id.into(),
            default_backend,
        }
    }

    /// Selector -> Extractor -> Option Builder, no side effects
    fn prepare_mount(
        &self,
        request: &PublishVolumeRequest,
        capability: &VolumeCapability,
    ) -> Result<MountSpec, NodeError> {
        let backend = select_backend(&request.volume_context, self.default_backend)?;
        let connection = extract_connection(backend, &request.volume_context, &request.secrets)?;

        Ok(MountSpec::build(
            Path::new(&request.target_path),
            request.readonly,
            capability.mount_flags(),
            &connection,
        ))
    }

    /// Returns whether this call created the directory
    async fn ensure_target_directory(&self, target: &Path) -> Result<bool, NodeError> {
        if self.mounter.directory_exists(target).await {
            debug!("Target directory {} already exists", target.display());
            return Ok(false);
        }

        debug!("Creating target directory {}", target.display());
        self.mounter
            .create_directory(target, TARGET_DIR_MODE)
            .await
            .map_err(|source| NodeError::CreateDirectory {
                path: target.to_path_buf(),
                source,
            })?;
        Ok(true)
    }

    async fn rollback_target_directory(&self, target: &Path, created: bool) {
        if !created {
            debug!(
                "Leaving pre-existing target directory {} in place after failed mount",
                target.display()
            );
            return;
        }

        if let Err(e) = self.mounter.remove_directory(target).await {
            warn!(
                "Failed to remove target directory {} after failed mount: {}",
                target.display(),
                e
            );
        }
    }
}

fn require(value: &str, field: &'static str) -> Result<(), NodeError> {
    if value.is_empty() {
        Err(NodeError::MissingField(field))
    } else {
        Ok(())
    }
}

#[async_trait]
impl NodeService for StandardNodeService {
    async fn publish_volume(&self, request: PublishVolumeRequest) -> Result<(), NodeError> {
        require(&request.volume_id, "Volume ID")?;
        info!("NodePublishVolume: volumeId ({})", request.volume_id);

        require(&request.target_path, "Target path")?;
        let capability = request
            .volume_capability
            .as_ref()
            .ok_or(NodeError::MissingField("Volume capability"))?;
        capability.validate()?;

        let spec = self.prepare_mount(&request, capability)?;
        let target = PathBuf::from(&request.target_path);

        let created = self.ensure_target_directory(&target).await?;

        info!(
            "NodePublishVolume: mounting {} ({}) at {} with options {:?}",
            spec.source,
            spec.fs_type,
            target.display(),
            spec.options
        );
        if let Err(source) = self.mounter.mount(&spec).await {
            self.rollback_target_directory(&target, created).await;
            return Err(NodeError::Mount {
                source_id: spec.source,
                fs_type: spec.fs_type,
                target,
                source,
            });
        }

        info!("NodePublishVolume: {} was mounted", target.display());
        Ok(())
    }

    async fn unpublish_volume(&self, request: UnpublishVolumeRequest) -> Result<(), NodeError> {
        require(&request.volume_id, "Volume ID")?;
        info!("NodeUnpublishVolume: volumeId ({})", request.volume_id);

        require(&request.target_path, "Target path")?;
        let target = PathBuf::from(&request.target_path);

        let state = current_state(self.mounter.as_ref(), &target)
            .await
            .map_err(NodeError::MountTable)?;

        if let MountState::Mounted { device, references } = state {
            debug!(
                "NodeUnpublishVolume: unmounting {} ({} with {} reference(s))",
                target.display(),
                device,
                references
            );
            self.mounter
                .unmount(&target)
                .await
                .map_err(|source| NodeError::Unmount {
                    path: target.clone(),
                    source,
                })?;
            info!("NodeUnpublishVolume: {} unmounted", target.display());
        } else {
            debug!("NodeUnpublishVolume: {} target not mounted", target.display());
        }

        Ok(())
    }

    fn capabilities(&self) -> &'static [NodeCapability] {
        NODE_CAPABILITIES
    }

    fn node_id(&self) -> &str {
        &self.node_id
    }
}
