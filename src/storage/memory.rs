// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! In-memory key-value store
//!
//! Process-lifetime storage, the sessionStorage analog. Cheap to clone;
//! clones share the same backing map.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;

use super::{append_value, KeyValueStore};
use crate::error::Result;

/// Shared in-memory store
#[derive(Clone, Default)]
pub struct MemoryStore {
    records: Arc<RwLock<HashMap<String, Value>>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot the full contents
    pub fn snapshot(&self) -> HashMap<String, Value> {
        self.records.read().clone()
    }

    /// Replace the full contents
    pub(crate) fn load(&self, records: HashMap<String, Value>) {
        *self.records.write() = records;
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.records.read().get(key).cloned()
    }

    fn set(&self, key: &str, value: Value) -> Result<()> {
        if value.is_null() {
            self.records.write().remove(key);
        } else {
            self.records.write().insert(key.to_string(), value);
        }
        Ok(())
    }

    fn append(&self, key: &str, value: Value) -> Result<bool> {
        let mut records = self.records.write();
        match records.get_mut(key) {
            Some(existing) => {
                append_value(existing, value)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn remove(&self, key: &str) -> Option<Value> {
        self.records.write().remove(key)
    }

    fn clear(&self) {
        self.records.write().clear();
    }

    fn keys(&self) -> Vec<String> {
        self.records.read().keys().cloned().collect()
    }

    fn len(&self) -> usize {
        self.records.read().len()
    }
}
