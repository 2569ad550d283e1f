// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! File-persistent key-value store
//!
//! The localStorage analog: every mutation is written through to a JSON
//! file, and opening a store reloads whatever the file holds. Writes are
//! synchronous, matching the blocking semantics of the browser API this
//! mirrors.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use super::{KeyValueStore, MemoryStore};
use crate::error::{Error, Result};

/// Key-value store persisted to a JSON file
///
/// The trait's `set` and `append` propagate persist failures; `remove`
/// and `clear` cannot (their signatures carry no error), so those log
/// the failure and keep the in-memory change. Callers that need the
/// write-through guarantee on removal use [`LocalStore::try_remove`]
/// and [`LocalStore::try_clear`].
pub struct LocalStore {
    inner: MemoryStore,
    path: PathBuf,
}

impl LocalStore {
    /// Open (or create) a store backed by the given file
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let inner = MemoryStore::new();

        if path.exists() {
            let raw = fs::read_to_string(&path)?;
            if !raw.trim().is_empty() {
                let records: HashMap<String, Value> = serde_json::from_str(&raw)
                    .map_err(|e| Error::storage(format!("corrupt store file: {}", e)))?;
                inner.load(records);
            }
        } else if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        Ok(Self { inner, path })
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove a key, failing when the removal cannot be persisted
    pub fn try_remove(&self, key: &str) -> Result<Option<Value>> {
        let removed = self.inner.remove(key);
        if removed.is_some() {
            self.persist()?;
        }
        Ok(removed)
    }

    /// Remove every key, failing when the wipe cannot be persisted
    pub fn try_clear(&self) -> Result<()> {
        self.inner.clear();
        self.persist()
    }

    fn persist(&self) -> Result<()> {
        let snapshot = self.inner.snapshot();
        let raw = serde_json::to_string_pretty(&snapshot)?;
        fs::write(&self.path, raw)?;
        Ok(())
    }
}

impl KeyValueStore for LocalStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: Value) -> Result<()> {
        self.inner.set(key, value)?;
        self.persist()
    }

    fn append(&self, key: &str, value: Value) -> Result<bool> {
        let appended = self.inner.append(key, value)?;
        if appended {
            self.persist()?;
        }
        Ok(appended)
    }

    fn remove(&self, key: &str) -> Option<Value> {
        let removed = self.inner.remove(key);
        if removed.is_some() {
            if let Err(e) = self.persist() {
                tracing::warn!(path = %self.path.display(), error = %e, "Failed to persist removal");
            }
        }
        removed
    }

    fn clear(&self) {
        if let Err(e) = self.try_clear() {
            tracing::warn!(path = %self.path.display(), error = %e, "Failed to persist clear");
        }
    }

    fn keys(&self) -> Vec<String> {
        self.inner.keys()
    }

    fn len(&self) -> usize {
        self.inner.len()
    }
}
