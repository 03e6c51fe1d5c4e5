// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Presentation Layer (`irods-csi-core`)
//!
//! gRPC surface that translates CSI requests into application service calls.
//! **No business logic lives here**: all real work is delegated to
//! `crate::application`.
//!
//! | Module | Transport | Description |
//! |--------|-----------|-------------|
//! | [`grpc`] | gRPC (Tonic) | CSI Identity and Node services, served to kubelet |

pub mod grpc;
