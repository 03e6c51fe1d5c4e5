// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod node_service;

pub use node_service::{
    NodeService, PublishVolumeRequest, StandardNodeService, UnpublishVolumeRequest,
};
