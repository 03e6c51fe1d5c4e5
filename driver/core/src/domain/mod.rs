// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Domain Layer
//!
//! Request parameters, backend profiles, connection extraction, mount
//! specification, capability rules, the `Mounter` port and the error
//! taxonomy. Apart from reading the driver configuration file, nothing in
//! here performs I/O.
//!
//! | Module | Responsibility |
//! |--------|----------------|
//! | [`parameters`] | Case-insensitive volume context and secrets |
//! | [`backend`] | Backend kinds, profile tables, Backend Selector |
//! | [`connection`] | Connection descriptors, Parameter Extractor |
//! | [`mount_spec`] | Mount Option Builder |
//! | [`capability`] | Volume/node capabilities |
//! | [`mounter`] | Host primitives port, derived mount state |
//! | [`errors`] | `NodeError` and its caller-facing kinds |
//! | [`driver_config`] | Startup configuration |

pub mod backend;
pub mod capability;
pub mod connection;
pub mod driver_config;
pub mod errors;
pub mod mount_spec;
pub mod mounter;
pub mod parameters;
