// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Connection Descriptors
//!
//! Typed view of a request's volume context and secrets for one backend.
//! [`extract_connection`] enforces the backend's allow-list on the volume
//! context, resolves each field with secrets taking precedence over the
//! context, and rejects missing required fields.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Parameter Extractor

use secrecy::SecretString;
use std::collections::HashMap;

use crate::domain::backend::{BackendKind, NFS_DEFAULT_PORT};
use crate::domain::errors::NodeError;
use crate::domain::parameters::{VolumeContext, VolumeSecrets};

/// iRODS protocol connection (irodsfs)
#[derive(Debug)]
pub struct DirectConnection {
    pub user: String,
    /// Absent for anonymous or ticket-only access
    pub password: Option<SecretString>,
    pub host: String,
    pub port: u16,
    pub zone: String,
    pub path: String,
    pub ticket: Option<SecretString>,
}

/// WebDAV gateway connection (davfs)
#[derive(Debug)]
pub struct WebDavConnection {
    pub url: String,
    pub user: Option<String>,
    pub password: Option<SecretString>,
}

/// NFS gateway connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NfsConnection {
    pub host: String,
    pub path: String,
    pub port: u16,
}

/// Exactly one populated connection per request
#[derive(Debug)]
pub enum ConnectionDescriptor {
    Direct(DirectConnection),
    WebDav(WebDavConnection),
    Nfs(NfsConnection),
}

impl ConnectionDescriptor {
    pub fn kind(&self) -> BackendKind {
        match self {
            Self::Direct(_) => BackendKind::Direct,
            Self::WebDav(_) => BackendKind::WebDav,
            Self::Nfs(_) => BackendKind::Nfs,
        }
    }
}

/// Resolved, non-empty field values for one backend
struct ResolvedFields<'a> {
    kind: BackendKind,
    values: HashMap<&'static str, &'a str>,
}

impl<'a> ResolvedFields<'a> {
    fn resolve(
        kind: BackendKind,
        context: &'a VolumeContext,
        secrets: &'a VolumeSecrets,
    ) -> Result<Self, NodeError> {
        let profile = kind.profile();

        // Unknown context keys are typos until proven otherwise
        for (lower, original) in context.keys() {
            if !profile.accepts(lower) {
                return Err(NodeError::UnsupportedContextKey(original.to_string()));
            }
        }

        // A present secret wins even when empty; unrelated secret keys are never looked at
        let mut values = HashMap::new();
        for field in profile.fields {
            let value = secrets
                .get(field.key)
                .or_else(|| context.get(field.key))
                .filter(|v| !v.is_empty());

            match value {
                Some(v) => {
                    values.insert(field.key, v);
                }
                None if field.required => {
                    return Err(NodeError::MissingParameter { backend: kind, key: field.key });
                }
                None => {}
            }
        }

        Ok(Self { kind, values })
    }

    fn optional(&self, key: &'static str) -> Option<&'a str> {
        self.values.get(key).copied()
    }

    fn required(&self, key: &'static str) -> Result<&'a str, NodeError> {
        self.optional(key).ok_or(NodeError::MissingParameter { backend: self.kind, key })
    }

    fn port(&self, key: &'static str) -> Result<Option<u16>, NodeError> {
        self.optional(key)
            .map(|raw| {
                raw.trim()
                    .parse::<u16>()
                    .ok()
                    .filter(|port| *port != 0)
                    .ok_or_else(|| NodeError::InvalidParameter {
                        key,
                        value: raw.to_string(),
                        reason: "not a valid port number".to_string(),
                    })
            })
            .transpose()
    }
}

/// Parse the volume context and secrets into the descriptor for `kind`.
pub fn extract_connection(
    kind: BackendKind,
    context: &VolumeContext,
    secrets: &VolumeSecrets,
) -> Result<ConnectionDescriptor, NodeError> {
    let fields = ResolvedFields::resolve(kind, context, secrets)?;

    match kind {
        BackendKind::Direct => Ok(ConnectionDescriptor::Direct(DirectConnection {
            user: fields.required("user")?.to_string(),
            password: fields
                .optional("password")
                .map(|p| SecretString::from(p.to_string())),
            host: fields.required("host")?.to_string(),
            port: fields.port("port")?.ok_or(NodeError::MissingParameter {
                backend: kind,
                key: "port",
            })?,
            zone: fields.required("zone")?.to_string(),
            path: fields.required("path")?.to_string(),
            ticket: fields
                .optional("ticket")
                .map(|t| SecretString::from(t.to_string())),
        })),
        BackendKind::WebDav => {
            let url = fields.required("url")?;
            validate_webdav_url(url)?;

            Ok(ConnectionDescriptor::WebDav(WebDavConnection {
                url: url.to_string(),
                user: fields.optional("user").map(str::to_string),
                password: fields
                    .optional("password")
                    .map(|p| SecretString::from(p.to_string())),
            }))
        }
        BackendKind::Nfs => Ok(ConnectionDescriptor::Nfs(NfsConnection {
            host: fields.required("host")?.to_string(),
            path: fields.required("path")?.to_string(),
            port: fields.port("port")?.unwrap_or(NFS_DEFAULT_PORT),
        })),
    }
}

fn validate_webdav_url(raw: &str) -> Result<(), NodeError> {
    let invalid = |reason: String| NodeError::InvalidParameter {
        key: "url",
        value: raw.to_string(),
        reason,
    };

    let parsed = url::Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(invalid(format!("unsupported scheme {}", other))),
    }
}
