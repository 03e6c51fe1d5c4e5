// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! `/proc/mounts` parsing and reference counting.

use std::path::{Path, PathBuf};

use crate::domain::mounter::MountReference;

/// One line of the mount table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountEntry {
    pub device: String,
    pub mount_point: PathBuf,
    pub fs_type: String,
    pub options: Vec<String>,
}

/// Parse the contents of `/proc/mounts` (fstab format).
///
/// Lines with fewer than four fields are skipped.
pub fn parse_mount_table(contents: &str) -> Vec<MountEntry> {
    contents
        .lines()
        .filter_map(|line| {
            let mut fields = line.split_whitespace();
            let device = fields.next()?;
            let mount_point = fields.next()?;
            let fs_type = fields.next()?;
            let options = fields.next()?;

            Some(MountEntry {
                device: unescape(device),
                mount_point: PathBuf::from(unescape(mount_point)),
                fs_type: fs_type.to_string(),
                options: options.split(',').map(str::to_string).collect(),
            })
        })
        .collect()
}

/// Device mounted at `path` and how many entries reference that device.
///
/// A path with no entry is not mounted and yields an empty device with a
/// count of zero.
pub fn reference_count(entries: &[MountEntry], path: &Path) -> MountReference {
    let target = normalize(path);

    let Some(device) = entries
        .iter()
        .rev()
        .find(|entry| normalize(&entry.mount_point) == target)
        .map(|entry| entry.device.clone())
    else {
        return MountReference::default();
    };

    let count = entries.iter().filter(|entry| entry.device == device).count();
    MountReference { device, count }
}

/// Drop `.` components and trailing slashes without touching the filesystem
fn normalize(path: &Path) -> PathBuf {
    path.components().collect()
}

/// Decode the octal escapes the kernel uses for whitespace and backslashes
fn unescape(field: &str) -> String {
    let bytes = field.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'\\' {
            if let Some(digits) = bytes.get(i + 1..i + 4) {
                if digits.iter().all(|b| (b'0'..=b'7').contains(b)) {
                    let value = digits
                        .iter()
                        .fold(0u32, |acc, b| acc * 8 + u32::from(b - b'0'));
                    if let Ok(byte) = u8::try_from(value) {
                        out.push(byte);
                        i += 4;
                        continue;
                    }
                }
            }
        }
        out.push(bytes[i]);
        i += 1;
    }

    String::from_utf8_lossy(&out).into_owned()
}
