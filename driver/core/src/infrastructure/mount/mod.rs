// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Mount Infrastructure Module
//!
//! Concrete implementations of the [`Mounter`] port:
//!
//! - [`SystemMounter`] drives the host: `mount -t <fs_type>` dispatches to the
//!   matching helper (`mount.irodsfs`, `mount.davfs`, `mount.nfs`), `umount`
//!   detaches, `/proc/mounts` answers reference-count queries.
//! - [`MockMounter`] keeps everything in memory for tests.

pub mod mock;
pub mod mount_table;

pub use mock::MockMounter;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use crate::domain::mount_spec::MountSpec;
use crate::domain::mounter::{MountError, MountReference, Mounter};

/// Placeholder written instead of sensitive mount options
pub const SENSITIVE_ARGS_REMOVED: &str = "<masked>";

const MOUNT_TABLE_PATH: &str = "/proc/mounts";

/// Mounter backed by the host's mount utilities
pub struct SystemMounter {
    mount_binary: PathBuf,
    umount_binary: PathBuf,
    mount_table: PathBuf,
}

impl SystemMounter {
    pub fn new() -> Self {
        Self {
            mount_binary: PathBuf::from("mount"),
            umount_binary: PathBuf::from("umount"),
            mount_table: PathBuf::from(MOUNT_TABLE_PATH),
        }
    }

    /// Read mount state from a different table (tests, alternate procfs roots)
    pub fn with_mount_table(mut self, path: impl Into<PathBuf>) -> Self {
        self.mount_table = path.into();
        self
    }

    /// Use different mount/umount executables
    pub fn with_binaries(mut self, mount: impl Into<PathBuf>, umount: impl Into<PathBuf>) -> Self {
        self.mount_binary = mount.into();
        self.umount_binary = umount.into();
        self
    }

    async fn run(
        &self,
        mut cmd: Command,
        rendered: String,
        stdin_inputs: &[&str],
    ) -> Result<(), MountError> {
        cmd.stdin(if stdin_inputs.is_empty() {
            Stdio::null()
        } else {
            Stdio::piped()
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

        let mut child = cmd.spawn()?;
        let stdin = child.stdin.take();

        // Feed stdin while stdout and stderr drain
        let feed = async move {
            let Some(mut stdin) = stdin else {
                return Ok(());
            };
            for input in stdin_inputs {
                stdin.write_all(input.as_bytes()).await?;
                stdin.write_all(b"\n").await?;
            }
            stdin.shutdown().await
        };
        let (written, output) = tokio::join!(feed, child.wait_with_output());

        // A helper that exits before reading stdin is judged by its exit status
        if let Err(e) = written {
            if e.kind() != std::io::ErrorKind::BrokenPipe {
                return Err(e.into());
            }
        }

        let output = output?;
        if output.status.success() {
            return Ok(());
        }

        let mut text = String::from_utf8_lossy(&output.stderr).trim().to_string();
        if text.is_empty() {
            text = String::from_utf8_lossy(&output.stdout).trim().to_string();
        }

        Err(MountError::CommandFailed {
            command: rendered,
            status: output.status.to_string(),
            output: text,
        })
    }
}

impl Default for SystemMounter {
    fn default() -> Self {
        Self::new()
    }
}

/// Arguments for `mount`, with the sensitive options either included or masked
fn mount_args(spec: &MountSpec, masked: bool) -> Vec<String> {
    let mut options: Vec<String> = spec.options.clone();
    options.extend(spec.sensitive_options.iter().map(|o| {
        if masked {
            SENSITIVE_ARGS_REMOVED.to_string()
        } else {
            o.expose_secret().to_string()
        }
    }));

    let mut args = vec!["-t".to_string(), spec.fs_type.to_string()];
    if !options.is_empty() {
        args.push("-o".to_string());
        args.push(options.join(","));
    }
    args.push(spec.source.clone());
    args.push(spec.target.to_string_lossy().into_owned());
    args
}

fn render(binary: &Path, args: &[String]) -> String {
    std::iter::once(binary.to_string_lossy().into_owned())
        .chain(args.iter().cloned())
        .collect::<Vec<_>>()
        .join(" ")
}

#[async_trait]
impl Mounter for SystemMounter {
    async fn directory_exists(&self, path: &Path) -> bool {
        match tokio::fs::metadata(path).await {
            Ok(_) => true,
            Err(e) => e.kind() != std::io::ErrorKind::NotFound,
        }
    }

    async fn create_directory(&self, path: &Path, mode: u32) -> Result<(), MountError> {
        let mut builder = tokio::fs::DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        builder.mode(mode);
        #[cfg(not(unix))]
        let _ = mode;

        builder.create(path).await?;
        Ok(())
    }

    async fn remove_directory(&self, path: &Path) -> Result<(), MountError> {
        tokio::fs::remove_dir(path).await?;
        Ok(())
    }

    async fn mount_reference_count(&self, path: &Path) -> Result<MountReference, MountError> {
        let contents = tokio::fs::read_to_string(&self.mount_table)
            .await
            .map_err(|e| MountError::MountTable(format!("{}: {}", self.mount_table.display(), e)))?;

        let entries = mount_table::parse_mount_table(&contents);
        Ok(mount_table::reference_count(&entries, path))
    }

    async fn mount(&self, spec: &MountSpec) -> Result<(), MountError> {
        let rendered = render(&self.mount_binary, &mount_args(spec, true));
        debug!("Running {}", rendered);

        let mut cmd = Command::new(&self.mount_binary);
        cmd.args(mount_args(spec, false));

        let stdin_inputs: Vec<&str> = spec.stdin_inputs.iter().map(|s| s.expose_secret()).collect();
        self.run(cmd, rendered, &stdin_inputs).await
    }

    async fn unmount(&self, path: &Path) -> Result<(), MountError> {
        let args = vec![path.to_string_lossy().into_owned()];
        let rendered = render(&self.umount_binary, &args);
        debug!("Running {}", rendered);

        let mut cmd = Command::new(&self.umount_binary);
        cmd.args(&args);
        self.run(cmd, rendered, &[]).await
    }
}
