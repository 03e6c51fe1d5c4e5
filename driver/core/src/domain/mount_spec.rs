// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Mount Specification
//!
//! Everything the mount primitive needs for one publish call: the source
//! identifier, the filesystem-type tag, the options that may be logged, the
//! options that may not, and the values fed to the mount helper on stdin.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Mount Option Builder

use secrecy::{ExposeSecret, SecretString};
use std::path::{Path, PathBuf};

use crate::domain::backend::NFS_DEFAULT_PORT;
use crate::domain::connection::{
    ConnectionDescriptor, DirectConnection, NfsConnection, WebDavConnection,
};

/// URI scheme of the direct (irodsfs) source
pub const DIRECT_SCHEME: &str = "irods";

/// Generic read-only mount flag
pub const READ_ONLY_OPTION: &str = "ro";

/// Arguments for a single mount invocation
#[derive(Debug)]
pub struct MountSpec {
    pub target: PathBuf,
    pub source: String,
    pub fs_type: &'static str,
    pub options: Vec<String>,
    pub sensitive_options: Vec<SecretString>,
    pub stdin_inputs: Vec<SecretString>,
}

impl MountSpec {
    /// Build the mount arguments for a populated connection.
    pub fn build(
        target: &Path,
        readonly: bool,
        mount_flags: &[String],
        connection: &ConnectionDescriptor,
    ) -> Self {
        let mut spec = Self {
            target: target.to_path_buf(),
            source: String::new(),
            fs_type: connection.kind().profile().fs_type,
            options: merge_mount_options(readonly, mount_flags),
            sensitive_options: Vec::new(),
            stdin_inputs: Vec::new(),
        };

        match connection {
            ConnectionDescriptor::Direct(conn) => spec.apply_direct(conn),
            ConnectionDescriptor::WebDav(conn) => spec.apply_webdav(conn),
            ConnectionDescriptor::Nfs(conn) => spec.apply_nfs(conn),
        }

        spec
    }

    fn apply_direct(&mut self, conn: &DirectConnection) {
        self.source = direct_source(conn);

        if let Some(ticket) = &conn.ticket {
            self.sensitive_options
                .push(SecretString::from(format!("ticket={}", ticket.expose_secret())));
        }
        if let Some(password) = &conn.password {
            self.stdin_inputs
                .push(SecretString::from(password.expose_secret().to_string()));
        }
    }

    fn apply_webdav(&mut self, conn: &WebDavConnection) {
        self.source = conn.url.clone();

        // Both or nothing: a lone user or lone password is not a usable login
        if let (Some(user), Some(password)) = (&conn.user, &conn.password) {
            self.sensitive_options
                .push(SecretString::from(format!("username={}", user)));
            self.stdin_inputs
                .push(SecretString::from(password.expose_secret().to_string()));
        }
    }

    fn apply_nfs(&mut self, conn: &NfsConnection) {
        self.source = format!("{}:{}", conn.host, conn.path);

        if conn.port != NFS_DEFAULT_PORT {
            self.options.push(format!("port={}", conn.port));
        }
    }
}

/// `ro` first when requested, then caller flags; the first occurrence of a
/// flag wins and later duplicates are dropped.
pub fn merge_mount_options(readonly: bool, mount_flags: &[String]) -> Vec<String> {
    let mut options: Vec<String> = Vec::with_capacity(mount_flags.len() + 1);
    if readonly {
        options.push(READ_ONLY_OPTION.to_string());
    }

    for flag in mount_flags {
        if !options.iter().any(|o| o == flag) {
            options.push(flag.clone());
        }
    }

    options
}

/// `irods://user@host:port/zone/path`.
///
/// The path is stripped of surrounding slashes. A path that already starts
/// with the zone (the usual absolute iRODS form `/zone/home/user`) is not
/// prefixed a second time.
fn direct_source(conn: &DirectConnection) -> String {
    let path = conn.path.trim_matches('/');
    let zone = conn.zone.trim_matches('/');

    let in_zone = path == zone || path.starts_with(&format!("{}/", zone));
    let collection = if in_zone || zone.is_empty() {
        path.to_string()
    } else if path.is_empty() {
        zone.to_string()
    } else {
        format!("{}/{}", zone, path)
    };

    format!(
        "{}://{}@{}:{}/{}",
        DIRECT_SCHEME, conn.user, conn.host, conn.port, collection
    )
}
