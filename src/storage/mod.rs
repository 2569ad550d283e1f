// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Key-value storage adapters
//!
//! Four adapters share one contract: JSON values keyed by strings, where
//! writing `Value::Null` removes the key instead of storing a null, and
//! `append` only extends keys that already exist.
//!
//! - [`MemoryStore`] - process-lifetime map (sessionStorage analog)
//! - [`LocalStore`] - JSON file persistence (localStorage analog)
//! - [`CookieStore`] - cookie header codec with expiry
//! - [`Database`] - async file-backed store (IndexedDB analog)

mod cookie;
mod database;
mod local;
mod memory;

pub use cookie::CookieStore;
pub use database::Database;
pub use local::LocalStore;
pub use memory::MemoryStore;

use serde_json::Value;

use crate::error::{Error, Result};

/// Default database name for the async store
pub const DEFAULT_DATABASE: &str = "lcsLocalDatabase";

/// Object store name inside a database
pub const OBJECT_STORE: &str = "store";

/// Contract shared by the synchronous storage adapters
pub trait KeyValueStore {
    /// Get a stored value, `None` for absent or removed keys
    fn get(&self, key: &str) -> Option<Value>;

    /// Store a value; `Value::Null` removes the key
    fn set(&self, key: &str, value: Value) -> Result<()>;

    /// Extend an existing value in place
    ///
    /// Returns `false` without creating the key when it is absent.
    /// Arrays push, strings concatenate with strings, objects merge with
    /// objects; any other pairing is a storage error.
    fn append(&self, key: &str, value: Value) -> Result<bool>;

    /// Remove a key, returning its previous value
    fn remove(&self, key: &str) -> Option<Value>;

    /// Remove every key
    fn clear(&self);

    /// All stored keys
    fn keys(&self) -> Vec<String>;

    /// Number of stored keys
    fn len(&self) -> usize;

    /// Whether the store is empty
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether a key is present
    fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}

/// Append semantics shared by every adapter
pub(crate) fn append_value(existing: &mut Value, value: Value) -> Result<()> {
    match (existing, value) {
        (Value::Array(items), value) => {
            items.push(value);
            Ok(())
        }
        (Value::String(s), Value::String(suffix)) => {
            s.push_str(&suffix);
            Ok(())
        }
        (Value::Object(map), Value::Object(additions)) => {
            map.extend(additions);
            Ok(())
        }
        (existing, value) => Err(Error::storage(format!(
            "cannot append {} to stored {}",
            type_name(&value),
            type_name(existing)
        ))),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
