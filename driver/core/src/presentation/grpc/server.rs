// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! CSI gRPC server bootstrap on a unix socket or TCP address.

use anyhow::{Context, Result};
use std::future::Future;
use std::path::Path;
use tokio::net::UnixListener;
use tokio_stream::wrappers::UnixListenerStream;

use super::identity::IdentityGrpcService;
use super::node::NodeGrpcService;
use crate::domain::driver_config::Endpoint;

/// Start the gRPC server and serve until `shutdown` resolves
pub async fn start_grpc_server<F>(
    endpoint: Endpoint,
    identity: IdentityGrpcService,
    node: NodeGrpcService,
    shutdown: F,
) -> Result<()>
where
    F: Future<Output = ()> + Send,
{
    let router = tonic::transport::Server::builder()
        .add_service(identity.into_server())
        .add_service(node.into_server());

    match endpoint {
        Endpoint::Unix(path) => {
            let listener = bind_unix_socket(&path).await?;
            tracing::info!("Starting CSI gRPC server on unix://{}", path.display());

            router
                .serve_with_incoming_shutdown(UnixListenerStream::new(listener), shutdown)
                .await
                .context("CSI gRPC server failed")?;

            if let Err(e) = tokio::fs::remove_file(&path).await {
                tracing::debug!("Socket {} not removed: {}", path.display(), e);
            }
        }
        Endpoint::Tcp(addr) => {
            tracing::info!("Starting CSI gRPC server on tcp://{}", addr);

            router
                .serve_with_shutdown(addr, shutdown)
                .await
                .context("CSI gRPC server failed")?;
        }
    }

    tracing::info!("CSI gRPC server stopped");
    Ok(())
}

/// Bind a unix socket, replacing a stale socket file left by a previous run
async fn bind_unix_socket(path: &Path) -> Result<UnixListener> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create socket directory {}", parent.display()))?;
    }

    match tokio::fs::remove_file(path).await {
        Ok(()) => tracing::debug!("Removed stale socket {}", path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => {
            return Err(e)
                .with_context(|| format!("Failed to remove stale socket {}", path.display()));
        }
    }

    UnixListener::bind(path).with_context(|| format!("Failed to bind {}", path.display()))
}
