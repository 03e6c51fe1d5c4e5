// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Lib
//!
//! Node-side volume lifecycle for the iRODS CSI driver: validates publish
//! requests, selects a transport (irodsfs, WebDAV, NFS), assembles its mount
//! arguments and drives the host's mount utilities.
//!
//! # Architecture
//!
//! - **Layer:** Core System
//! - **Purpose:** Implements lib

pub mod domain;
pub mod application;
pub mod infrastructure;
pub mod presentation;

pub use domain::*;
