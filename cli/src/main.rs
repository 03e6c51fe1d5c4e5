// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! # iRODS CSI Node Driver
//!
//! The `irods-csi-driver` binary runs the node side of the iRODS CSI plugin:
//! it serves the CSI `Identity` and `Node` gRPC services on the configured
//! endpoint and mounts iRODS collections through one of three backends
//! (`irodsfs`, `davfs` over WebDAV, or NFS).
//!
//! ## Configuration
//!
//! Settings are read from the YAML file named by `--config` or
//! `IRODS_CSI_CONFIG`, then overridden by command-line flags and their
//! environment variables.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use irods_csi_core::application::StandardNodeService;
use irods_csi_core::domain::backend::BackendKind;
use irods_csi_core::domain::driver_config::DriverConfig;
use irods_csi_core::infrastructure::SystemMounter;
use irods_csi_core::presentation::grpc::{start_grpc_server, IdentityGrpcService, NodeGrpcService};

/// iRODS CSI node driver
#[derive(Parser)]
#[command(name = "irods-csi-driver")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// CSI endpoint (unix:///path/to/socket or tcp://host:port)
    #[arg(long, env = "CSI_ENDPOINT")]
    endpoint: Option<String>,

    /// Node identifier reported to the container orchestrator
    #[arg(long, env = "NODE_ID")]
    node_id: Option<String>,

    /// Backend used when a volume does not name one (fuse, webdav, nfs)
    #[arg(long, env = "DRIVER_TYPE")]
    driver_type: Option<BackendKind>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "IRODS_CSI_LOG_LEVEL")]
    log_level: Option<String>,
}

impl Cli {
    fn apply_overrides(self, mut config: DriverConfig) -> DriverConfig {
        if let Some(endpoint) = self.endpoint {
            config.endpoint = endpoint;
        }
        if let Some(node_id) = self.node_id {
            config.node_id = node_id;
        }
        if let Some(driver_type) = self.driver_type {
            config.default_client = driver_type;
        }
        if let Some(log_level) = self.log_level {
            config.log_level = log_level;
        }
        config
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = DriverConfig::load_or_default(cli.config.clone())?;
    let config = cli.apply_overrides(config);

    init_logging(&config.log_level)?;

    config.validate().context("Invalid driver configuration")?;
    let endpoint = config.parsed_endpoint()?;

    info!(
        "Starting {} {} on node {} (default client: {})",
        config.driver_name,
        env!("CARGO_PKG_VERSION"),
        config.node_id,
        config.default_client
    );

    let node_service = Arc::new(StandardNodeService::new(
        Arc::new(SystemMounter::new()),
        config.node_id.clone(),
        config.default_client,
    ));

    start_grpc_server(
        endpoint,
        IdentityGrpcService::new(config.driver_name.clone(), env!("CARGO_PKG_VERSION")),
        NodeGrpcService::new(node_service),
        shutdown_signal(),
    )
    .await
}

/// Resolves on Ctrl-C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}

/// Initialize tracing subscriber for logging
fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .context("Failed to create log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::parse_from([
            "irods-csi-driver",
            "--endpoint",
            "tcp://127.0.0.1:10000",
            "--node-id",
            "worker-3",
            "--driver-type",
            "webdav",
        ]);

        let config = cli.apply_overrides(DriverConfig::default());
        assert_eq!(config.endpoint, "tcp://127.0.0.1:10000");
        assert_eq!(config.node_id, "worker-3");
        assert_eq!(config.default_client, BackendKind::WebDav);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_unknown_driver_type_is_rejected() {
        let result = Cli::try_parse_from(["irods-csi-driver", "--driver-type", "smb"]);
        assert!(result.is_err());
    }
}
