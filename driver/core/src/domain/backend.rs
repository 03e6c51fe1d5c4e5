// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Backend Kinds and Selection
//!
//! The three transports a volume can be attached with, the immutable profile
//! table describing each one (recognised parameters, filesystem-type tag,
//! default port), and the selector that picks a backend from a volume context.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Backend Selector

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::errors::NodeError;
use crate::domain::parameters::VolumeContext;

/// Context key carrying the backend discriminator
pub const CLIENT_KEY: &str = "client";

/// Well-known NFS port; an explicit `port=` option is only emitted for others
pub const NFS_DEFAULT_PORT: u16 = 2049;

/// Transport used to attach a volume
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum BackendKind {
    /// iRODS protocol client mounted through irodsfs (FUSE)
    #[default]
    Direct,
    /// iRODS WebDAV gateway mounted through davfs
    WebDav,
    /// iRODS NFS gateway mounted through the kernel NFS client
    Nfs,
}

impl BackendKind {
    pub const ALL: [BackendKind; 3] = [Self::Direct, Self::WebDav, Self::Nfs];

    /// Canonical discriminator value
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Direct => "fuse",
            Self::WebDav => "webdav",
            Self::Nfs => "nfs",
        }
    }

    pub fn profile(&self) -> &'static BackendProfile {
        match self {
            Self::Direct => &DIRECT_PROFILE,
            Self::WebDav => &WEBDAV_PROFILE,
            Self::Nfs => &NFS_PROFILE,
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = NodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fuse" | "irodsfuse" => Ok(Self::Direct),
            "webdav" => Ok(Self::WebDav),
            "nfs" => Ok(Self::Nfs),
            _ => Err(NodeError::UnknownBackend(s.to_string())),
        }
    }
}

impl TryFrom<String> for BackendKind {
    type Error = NodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<BackendKind> for String {
    fn from(kind: BackendKind) -> Self {
        kind.as_str().to_string()
    }
}

/// A parameter a backend recognises
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParameterField {
    pub key: &'static str,
    pub required: bool,
}

impl ParameterField {
    const fn required(key: &'static str) -> Self {
        Self { key, required: true }
    }

    const fn optional(key: &'static str) -> Self {
        Self { key, required: false }
    }
}

/// Fixed per-backend description
#[derive(Debug)]
pub struct BackendProfile {
    pub kind: BackendKind,
    /// Filesystem-type tag, used to pick the external mount helper
    pub fs_type: &'static str,
    /// Recognised parameters (volume context allow-list)
    pub fields: &'static [ParameterField],
}

impl BackendProfile {
    /// Whether `key` (already lowercase) may appear in the volume context
    pub fn accepts(&self, key: &str) -> bool {
        key == CLIENT_KEY || self.fields.iter().any(|f| f.key == key)
    }

    pub fn required_keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().filter(|f| f.required).map(|f| f.key)
    }
}

static DIRECT_PROFILE: BackendProfile = BackendProfile {
    kind: BackendKind::Direct,
    fs_type: "irodsfs",
    fields: &[
        ParameterField::required("host"),
        ParameterField::required("user"),
        ParameterField::optional("password"),
        ParameterField::required("port"),
        ParameterField::required("zone"),
        ParameterField::required("path"),
        ParameterField::optional("ticket"),
    ],
};

static WEBDAV_PROFILE: BackendProfile = BackendProfile {
    kind: BackendKind::WebDav,
    fs_type: "davfs",
    fields: &[
        ParameterField::required("url"),
        ParameterField::optional("user"),
        ParameterField::optional("password"),
    ],
};

static NFS_PROFILE: BackendProfile = BackendProfile {
    kind: BackendKind::Nfs,
    fs_type: "nfs",
    fields: &[
        ParameterField::required("host"),
        ParameterField::required("path"),
        ParameterField::optional("port"),
    ],
};

/// Pick the backend a request targets.
///
/// Driven by the `client` context key; when it is absent (or blank) the
/// configured `default` is used.
pub fn select_backend(
    context: &VolumeContext,
    default: BackendKind,
) -> Result<BackendKind, NodeError> {
    match context.get(CLIENT_KEY).map(str::trim) {
        None | Some("") => Ok(default),
        Some(value) => value.parse(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_when_discriminator_absent() {
        let context = VolumeContext::new([("host", "nfs.example.org")]);
        assert_eq!(select_backend(&context, BackendKind::Direct).unwrap(), BackendKind::Direct);
        assert_eq!(select_backend(&context, BackendKind::Nfs).unwrap(), BackendKind::Nfs);
    }

    #[test]
    fn test_default_kind_is_direct() {
        assert_eq!(BackendKind::default(), BackendKind::Direct);
        assert_eq!(BackendKind::default().as_str(), "fuse");
    }

    #[test]
    fn test_discriminator_is_case_insensitive() {
        let context = VolumeContext::new([("Client", "WebDAV")]);
        assert_eq!(select_backend(&context, BackendKind::Direct).unwrap(), BackendKind::WebDav);

        let context = VolumeContext::new([("CLIENT", "irodsfuse")]);
        assert_eq!(select_backend(&context, BackendKind::Nfs).unwrap(), BackendKind::Direct);
    }

    #[test]
    fn test_unknown_discriminator_names_value() {
        let context = VolumeContext::new([("client", "smb")]);
        let err = select_backend(&context, BackendKind::Direct).unwrap_err();

        assert!(matches!(err, NodeError::UnknownBackend(ref v) if v == "smb"));
        assert_eq!(err.kind(), crate::domain::errors::ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_profiles() {
        assert_eq!(BackendKind::Direct.profile().fs_type, "irodsfs");
        assert_eq!(BackendKind::WebDav.profile().fs_type, "davfs");
        assert_eq!(BackendKind::Nfs.profile().fs_type, "nfs");

        for kind in BackendKind::ALL {
            let profile = kind.profile();
            assert_eq!(profile.kind, kind);
            assert!(profile.accepts(CLIENT_KEY));
        }

        let required: Vec<_> = BackendKind::Nfs.profile().required_keys().collect();
        assert_eq!(required, vec!["host", "path"]);
        assert!(!BackendKind::WebDav.profile().accepts("zone"));
    }

    #[test]
    fn test_serde_uses_discriminator_names() {
        let kind: BackendKind = serde_yaml::from_str("webdav").unwrap();
        assert_eq!(kind, BackendKind::WebDav);
        assert_eq!(serde_yaml::to_string(&BackendKind::Nfs).unwrap().trim(), "nfs");
        assert!(serde_yaml::from_str::<BackendKind>("smb").is_err());
    }
}
