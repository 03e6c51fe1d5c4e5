// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Driver Configuration Types
//
// Settings the node plugin is started with:
// - Plugin identity reported over the Identity service
// - Node identifier reported by NodeGetInfo
// - CSI endpoint (unix socket or TCP) the gRPC server binds to
// - Default backend for volume contexts without a `client` key

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use crate::domain::backend::BackendKind;

/// Environment variable naming a config file when `--config` is absent
pub const CONFIG_PATH_ENV: &str = "IRODS_CSI_CONFIG";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverConfig {
    /// Plugin name reported by GetPluginInfo
    #[serde(default = "default_driver_name")]
    pub driver_name: String,

    /// Node identifier reported by NodeGetInfo
    #[serde(default)]
    pub node_id: String,

    /// `unix:///path/to/socket` or `tcp://host:port`
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Backend used when the volume context carries no `client` key
    #[serde(default)]
    pub default_client: BackendKind,

    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            driver_name: default_driver_name(),
            node_id: String::new(),
            endpoint: default_endpoint(),
            default_client: BackendKind::default(),
            log_level: default_log_level(),
        }
    }
}

impl DriverConfig {
    pub fn from_yaml_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        serde_yaml::from_str(yaml).context("Failed to parse driver configuration")
    }

    /// Load from the explicit path, else from `IRODS_CSI_CONFIG`, else defaults
    pub fn load_or_default(cli_path: Option<PathBuf>) -> anyhow::Result<Self> {
        let path = cli_path.or_else(|| std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from));
        match path {
            Some(path) => Self::from_yaml_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.driver_name.trim().is_empty() {
            anyhow::bail!("driver_name cannot be empty");
        }

        if self.node_id.trim().is_empty() {
            anyhow::bail!("node_id cannot be empty");
        }

        Endpoint::parse(&self.endpoint)?;

        Ok(())
    }

    pub fn parsed_endpoint(&self) -> anyhow::Result<Endpoint> {
        Endpoint::parse(&self.endpoint)
    }
}

/// Address the CSI gRPC server listens on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    Unix(PathBuf),
    Tcp(SocketAddr),
}

impl Endpoint {
    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        let raw = raw.trim();
        if let Some(path) = raw.strip_prefix("unix://") {
            if path.is_empty() {
                anyhow::bail!("Invalid endpoint '{}': empty socket path", raw);
            }
            return Ok(Self::Unix(PathBuf::from(path)));
        }

        if let Some(addr) = raw.strip_prefix("tcp://") {
            let addr = addr
                .parse::<SocketAddr>()
                .with_context(|| format!("Invalid endpoint '{}'", raw))?;
            return Ok(Self::Tcp(addr));
        }

        anyhow::bail!(
            "Invalid endpoint '{}'. Must start with unix:// or tcp://",
            raw
        )
    }
}

fn default_driver_name() -> String {
    "irods.csi.cyverse.org".to_string()
}

fn default_endpoint() -> String {
    "unix:///csi/csi.sock".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DriverConfig::default();
        assert_eq!(config.driver_name, "irods.csi.cyverse.org");
        assert_eq!(config.endpoint, "unix:///csi/csi.sock");
        assert_eq!(config.default_client, BackendKind::Direct);
        assert_eq!(config.log_level, "info");
        assert!(config.node_id.is_empty());
    }

    #[test]
    fn test_yaml_partial_fills_defaults() {
        let config = DriverConfig::from_yaml_str("node_id: worker-1\ndefault_client: nfs\n").unwrap();
        assert_eq!(config.node_id, "worker-1");
        assert_eq!(config.default_client, BackendKind::Nfs);
        assert_eq!(config.endpoint, "unix:///csi/csi.sock");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_yaml_rejects_unknown_client() {
        assert!(DriverConfig::from_yaml_str("default_client: smb\n").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("driver.yaml");
        std::fs::write(&path, "node_id: worker-2\nendpoint: tcp://127.0.0.1:10000\n").unwrap();

        let config = DriverConfig::load_or_default(Some(path)).unwrap();
        assert_eq!(config.node_id, "worker-2");
        assert_eq!(
            config.parsed_endpoint().unwrap(),
            Endpoint::Tcp("127.0.0.1:10000".parse().unwrap())
        );

        assert!(DriverConfig::load_or_default(Some(dir.path().join("missing.yaml"))).is_err());
    }

    #[test]
    fn test_validation() {
        let mut config = DriverConfig::default();

        // Node id is mandatory
        assert!(config.validate().is_err());
        config.node_id = "worker-1".to_string();
        assert!(config.validate().is_ok());

        config.driver_name = " ".to_string();
        assert!(config.validate().is_err());
        config.driver_name = default_driver_name();

        config.endpoint = "http://localhost:10000".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_endpoint_parse() {
        assert_eq!(
            Endpoint::parse("unix:///csi/csi.sock").unwrap(),
            Endpoint::Unix(PathBuf::from("/csi/csi.sock"))
        );
        assert!(Endpoint::parse("unix://").is_err());
        assert!(Endpoint::parse("tcp://not-an-address").is_err());
    }
}
