// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Volume Context and Secrets
//!
//! Free-form key/value maps delivered with a publish request. Keys are matched
//! case-insensitively; the key as sent by the caller is kept for error
//! messages. Secret values never appear in `Debug` output.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Case-insensitive string map
#[derive(Clone, Default, PartialEq, Eq)]
struct ParameterMap {
    /// lowercase key -> (original key, value)
    entries: BTreeMap<String, (String, String)>,
}

impl ParameterMap {
    fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut sorted: Vec<(String, String)> = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        // Keys differing only in case: the lexicographically first spelling wins
        sorted.sort();

        let mut entries = BTreeMap::new();
        for (key, value) in sorted {
            entries.entry(key.to_lowercase()).or_insert((key, value));
        }
        Self { entries }
    }

    fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .get(&key.to_lowercase())
            .map(|(_, value)| value.as_str())
    }

    fn keys(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(lower, (original, _))| (lower.as_str(), original.as_str()))
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Describes how to reach the backing store (host, port, path, client hints)
#[derive(Clone, Default, PartialEq, Eq)]
pub struct VolumeContext(ParameterMap);

impl VolumeContext {
    pub fn new<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self(ParameterMap::from_pairs(pairs))
    }

    /// Value for `key`, ignoring case
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key)
    }

    /// `(lowercase key, key as sent)` for every entry
    pub fn keys(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.keys()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.len() == 0
    }
}

impl From<HashMap<String, String>> for VolumeContext {
    fn from(map: HashMap<String, String>) -> Self {
        Self::new(map)
    }
}

impl fmt::Debug for VolumeContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.0.entries.values().map(|(k, v)| (k, v)))
            .finish()
    }
}

/// Same shape as [`VolumeContext`], but every value is a credential
#[derive(Clone, Default, PartialEq, Eq)]
pub struct VolumeSecrets(ParameterMap);

impl VolumeSecrets {
    pub fn new<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self(ParameterMap::from_pairs(pairs))
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.len() == 0
    }
}

impl From<HashMap<String, String>> for VolumeSecrets {
    fn from(map: HashMap<String, String>) -> Self {
        Self::new(map)
    }
}

impl fmt::Debug for VolumeSecrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.0.entries.values().map(|(k, _)| (k, "<masked>")))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_ignores_case() {
        let context = VolumeContext::new([("Host", "data.example.org"), ("PORT", "1247")]);

        assert_eq!(context.get("host"), Some("data.example.org"));
        assert_eq!(context.get("HOST"), Some("data.example.org"));
        assert_eq!(context.get("port"), Some("1247"));
        assert_eq!(context.get("zone"), None);
    }

    #[test]
    fn test_keys_keep_original_spelling() {
        let context = VolumeContext::new([("Zone", "tempZone")]);
        let keys: Vec<_> = context.keys().collect();
        assert_eq!(keys, vec![("zone", "Zone")]);
    }

    #[test]
    fn test_case_collision_is_deterministic() {
        let context = VolumeContext::new([("host", "b.example.org"), ("HOST", "a.example.org")]);
        assert_eq!(context.len(), 1);
        // "HOST" sorts before "host"
        assert_eq!(context.get("host"), Some("a.example.org"));
    }

    #[test]
    fn test_secrets_debug_masks_values() {
        let secrets = VolumeSecrets::new([("password", "pw123")]);
        let rendered = format!("{:?}", secrets);

        assert!(rendered.contains("password"));
        assert!(!rendered.contains("pw123"));
    }
}
