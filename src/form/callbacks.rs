// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Named submit-callback registry
//!
//! Forms reference their submit handler by name. The name resolves
//! against this explicit registry, never against ambient global scope.

use std::sync::Arc;

use dashmap::DashMap;
use serde_json::{Map, Value};

/// Submit callback, handed the built data map
pub type SubmitCallback = Arc<dyn Fn(&Map<String, Value>) + Send + Sync + 'static>;

/// Name-to-callback registry for form submission
#[derive(Clone, Default)]
pub struct CallbackRegistry {
    callbacks: Arc<DashMap<String, SubmitCallback>>,
}

impl CallbackRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback under a name, replacing any previous one
    pub fn register(&self, name: impl Into<String>, callback: SubmitCallback) {
        self.callbacks.insert(name.into(), callback);
    }

    /// Look up a callback by name
    pub fn get(&self, name: &str) -> Option<SubmitCallback> {
        self.callbacks.get(name).map(|entry| entry.value().clone())
    }

    /// Remove a callback by name
    pub fn remove(&self, name: &str) -> bool {
        self.callbacks.remove(name).is_some()
    }

    /// Whether a name is registered
    pub fn contains(&self, name: &str) -> bool {
        self.callbacks.contains_key(name)
    }
}
