// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Build Script for irods-csi-core
//!
//! Compiles the CSI v1 Identity and Node service definitions from
//! `../../proto/csi.proto` into server stubs. Generated code is placed in
//! `OUT_DIR` and included via `tonic::include_proto!("csi.v1")` in
//! `src/presentation/grpc/mod.rs`.
//!
//! # Dependencies
//!
//! - **protoc**: Protocol buffer compiler (vendored via `protoc-bin-vendored`)
//! - **tonic-prost-build**: Code generator for Rust gRPC stubs

use std::path::PathBuf;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Point prost at the vendored protoc and its well-known type includes
    std::env::set_var("PROTOC", protoc_bin_vendored::protoc_bin_path()?);
    let well_known = protoc_bin_vendored::include_path()?;

    tonic_prost_build::configure()
        .build_server(true)
        .build_client(true)
        .compile_protos(
            &[PathBuf::from("../../proto/csi.proto")],
            &[PathBuf::from("../../proto"), well_known],
        )?;

    println!("cargo:rerun-if-changed=../../proto/csi.proto");

    Ok(())
}
