// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! In-memory [`Mounter`] for unit and integration testing.
//!
//! Directories and mounts live in maps; every primitive call is recorded so
//! tests can assert on what the node service did. Failures can be injected
//! per primitive.

use async_trait::async_trait;
use parking_lot::Mutex;
use secrecy::ExposeSecret;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::domain::mount_spec::MountSpec;
use crate::domain::mounter::{MountError, MountReference, Mounter};

/// A primitive invocation observed by the mock
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MounterCall {
    CreateDirectory { path: PathBuf, mode: u32 },
    RemoveDirectory(PathBuf),
    ReferenceCount(PathBuf),
    Mount(RecordedMount),
    Unmount(PathBuf),
}

/// Copy of a [`MountSpec`] with secrets exposed, for assertions only
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedMount {
    pub target: PathBuf,
    pub source: String,
    pub fs_type: String,
    pub options: Vec<String>,
    pub sensitive_options: Vec<String>,
    pub stdin_inputs: Vec<String>,
}

impl From<&MountSpec> for RecordedMount {
    fn from(spec: &MountSpec) -> Self {
        Self {
            target: spec.target.clone(),
            source: spec.source.clone(),
            fs_type: spec.fs_type.to_string(),
            options: spec.options.clone(),
            sensitive_options: spec
                .sensitive_options
                .iter()
                .map(|o| o.expose_secret().to_string())
                .collect(),
            stdin_inputs: spec
                .stdin_inputs
                .iter()
                .map(|i| i.expose_secret().to_string())
                .collect(),
        }
    }
}

/// Failure injection switches
#[derive(Debug, Clone, Default)]
pub struct MockFailures {
    pub create_directory: Option<String>,
    pub remove_directory: Option<String>,
    pub mount_table: Option<String>,
    pub mount: Option<String>,
    pub unmount: Option<String>,
}

#[derive(Default)]
pub struct MockMounter {
    pub directories: Arc<Mutex<BTreeSet<PathBuf>>>,
    /// target -> device
    pub mounts: Arc<Mutex<BTreeMap<PathBuf, String>>>,
    pub calls: Arc<Mutex<Vec<MounterCall>>>,
    pub failures: Arc<Mutex<MockFailures>>,
}

impl MockMounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pretend `path` already exists
    pub fn with_directory(self, path: impl Into<PathBuf>) -> Self {
        self.directories.lock().insert(path.into());
        self
    }

    /// Pretend `device` is already mounted at `target`
    pub fn with_mount(self, target: impl Into<PathBuf>, device: impl Into<String>) -> Self {
        let target = target.into();
        self.directories.lock().insert(target.clone());
        self.mounts.lock().insert(target, device.into());
        self
    }

    pub fn fail_with(&self, configure: impl FnOnce(&mut MockFailures)) {
        configure(&mut *self.failures.lock());
    }

    pub fn calls(&self) -> Vec<MounterCall> {
        self.calls.lock().clone()
    }

    pub fn mount_calls(&self) -> Vec<RecordedMount> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                MounterCall::Mount(recorded) => Some(recorded.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn unmount_calls(&self) -> Vec<PathBuf> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                MounterCall::Unmount(path) => Some(path.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn is_mounted(&self, target: &Path) -> bool {
        self.mounts.lock().contains_key(target)
    }

    pub fn has_directory(&self, path: &Path) -> bool {
        self.directories.lock().contains(path)
    }

    fn record(&self, call: MounterCall) {
        self.calls.lock().push(call);
    }

    fn injected(
        &self,
        pick: impl FnOnce(&MockFailures) -> Option<String>,
    ) -> Result<(), MountError> {
        match pick(&*self.failures.lock()) {
            Some(message) => Err(MountError::Other(message)),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl Mounter for MockMounter {
    async fn directory_exists(&self, path: &Path) -> bool {
        self.has_directory(path)
    }

    async fn create_directory(&self, path: &Path, mode: u32) -> Result<(), MountError> {
        self.record(MounterCall::CreateDirectory {
            path: path.to_path_buf(),
            mode,
        });
        self.injected(|f| f.create_directory.clone())?;
        self.directories.lock().insert(path.to_path_buf());
        Ok(())
    }

    async fn remove_directory(&self, path: &Path) -> Result<(), MountError> {
        self.record(MounterCall::RemoveDirectory(path.to_path_buf()));
        self.injected(|f| f.remove_directory.clone())?;
        self.directories.lock().remove(path);
        Ok(())
    }

    async fn mount_reference_count(&self, path: &Path) -> Result<MountReference, MountError> {
        self.record(MounterCall::ReferenceCount(path.to_path_buf()));
        if let Some(message) = self.failures.lock().mount_table.clone() {
            return Err(MountError::MountTable(message));
        }

        let mounts = self.mounts.lock();
        let Some(device) = mounts.get(path).cloned() else {
            return Ok(MountReference::default());
        };
        let count = mounts.values().filter(|d| **d == device).count();
        Ok(MountReference { device, count })
    }

    async fn mount(&self, spec: &MountSpec) -> Result<(), MountError> {
        self.record(MounterCall::Mount(RecordedMount::from(spec)));
        self.injected(|f| f.mount.clone())?;
        self.mounts.lock().insert(spec.target.clone(), spec.source.clone());
        Ok(())
    }

    async fn unmount(&self, path: &Path) -> Result<(), MountError> {
        self.record(MounterCall::Unmount(path.to_path_buf()));
        self.injected(|f| f.unmount.clone())?;
        self.mounts.lock().remove(path);
        Ok(())
    }
}
