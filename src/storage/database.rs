// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Async file-backed key-value database
//!
//! The IndexedDB analog: promise-style API over a single object store.
//! Each database lives in its own directory; the object store serializes
//! to `<dir>/<database>/store.json` through tokio's async filesystem.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tokio::fs;
use tokio::sync::RwLock;

use super::{append_value, DEFAULT_DATABASE, OBJECT_STORE};
use crate::error::{Error, Result};

/// Async key-value database with a single object store
pub struct Database {
    name: String,
    path: PathBuf,
    records: RwLock<HashMap<String, Value>>,
}

impl Database {
    /// Open the default database under the given directory
    pub async fn open_default(dir: impl AsRef<Path>) -> Result<Self> {
        Self::open(dir, DEFAULT_DATABASE).await
    }

    /// Open (or create) a named database under the given directory
    pub async fn open(dir: impl AsRef<Path>, name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(Error::config("database name must not be empty"));
        }

        let db_dir = dir.as_ref().join(&name);
        fs::create_dir_all(&db_dir).await?;
        let path = db_dir.join(format!("{}.json", OBJECT_STORE));

        let records = if path.exists() {
            let raw = fs::read_to_string(&path).await?;
            if raw.trim().is_empty() {
                HashMap::new()
            } else {
                serde_json::from_str(&raw)
                    .map_err(|e| Error::storage(format!("corrupt database file: {}", e)))?
            }
        } else {
            HashMap::new()
        };

        Ok(Self {
            name,
            path,
            records: RwLock::new(records),
        })
    }

    /// Database name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get a stored value
    pub async fn get(&self, key: &str) -> Option<Value> {
        self.records.read().await.get(key).cloned()
    }

    /// Store a value; `Value::Null` removes the key
    pub async fn set(&self, key: &str, value: Value) -> Result<()> {
        {
            let mut records = self.records.write().await;
            if value.is_null() {
                records.remove(key);
            } else {
                records.insert(key.to_string(), value);
            }
        }
        self.persist().await
    }

    /// Extend an existing value; `false` (no write) when the key is absent
    pub async fn append(&self, key: &str, value: Value) -> Result<bool> {
        let appended = {
            let mut records = self.records.write().await;
            match records.get_mut(key) {
                Some(existing) => {
                    append_value(existing, value)?;
                    true
                }
                None => false,
            }
        };
        if appended {
            self.persist().await?;
        }
        Ok(appended)
    }

    /// Remove a key, returning its previous value
    pub async fn remove(&self, key: &str) -> Result<Option<Value>> {
        let removed = self.records.write().await.remove(key);
        if removed.is_some() {
            self.persist().await?;
        }
        Ok(removed)
    }

    /// Remove every key
    pub async fn clear(&self) -> Result<()> {
        self.records.write().await.clear();
        self.persist().await
    }

    /// All stored keys
    pub async fn keys(&self) -> Vec<String> {
        self.records.read().await.keys().cloned().collect()
    }

    /// Number of stored keys
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Whether a key is present
    pub async fn contains(&self, key: &str) -> bool {
        self.records.read().await.contains_key(key)
    }

    async fn persist(&self) -> Result<()> {
        let raw = {
            let records = self.records.read().await;
            serde_json::to_string_pretty(&*records)?
        };
        fs::write(&self.path, raw).await?;
        Ok(())
    }
}
