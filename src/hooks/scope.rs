// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Hooks-ID scope registry
//!
//! A request instance may carry a hooks ID so subscribers can target its
//! notifications without hearing the global broadcast. IDs are claimed
//! from a shared registry that is passed to request builders explicitly,
//! never hung off a global object. Claiming a taken ID fails fast.

use std::sync::Arc;

use dashmap::DashSet;

use crate::error::{Error, Result};

/// Process-scoped registry of claimed hooks IDs
#[derive(Clone, Default)]
pub struct ScopeRegistry {
    claimed: Arc<DashSet<String>>,
}

impl ScopeRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim a hooks ID for the lifetime of the returned guard
    ///
    /// Fails with [`Error::HooksId`] when the ID is already taken by a
    /// live request instance.
    pub fn claim(&self, id: impl Into<String>) -> Result<ScopeGuard> {
        let id = id.into();
        if id.is_empty() {
            return Err(Error::config("hooks ID must not be empty"));
        }
        if !self.claimed.insert(id.clone()) {
            return Err(Error::HooksId(id));
        }
        Ok(ScopeGuard {
            registry: self.clone(),
            id,
        })
    }

    /// Whether an ID is currently claimed
    pub fn is_claimed(&self, id: &str) -> bool {
        self.claimed.contains(id)
    }

    fn release(&self, id: &str) {
        self.claimed.remove(id);
    }
}

/// Releases the claimed hooks ID on drop
pub struct ScopeGuard {
    registry: ScopeRegistry,
    id: String,
}

impl ScopeGuard {
    /// The claimed hooks ID
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl Drop for ScopeGuard {
    fn drop(&mut self) {
        self.registry.release(&self.id);
    }
}

impl std::fmt::Debug for ScopeGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScopeGuard").field("id", &self.id).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claim_and_release() {
        let registry = ScopeRegistry::new();
        let guard = registry.claim("login-form").unwrap();
        assert_eq!(guard.id(), "login-form");
        assert!(registry.is_claimed("login-form"));

        drop(guard);
        assert!(!registry.is_claimed("login-form"));
    }

    #[test]
    fn test_duplicate_claim_fails_fast() {
        let registry = ScopeRegistry::new();
        let _guard = registry.claim("checkout").unwrap();

        match registry.claim("checkout") {
            Err(Error::HooksId(id)) => assert_eq!(id, "checkout"),
            other => panic!("Expected HooksId error, got {:?}", other.map(|g| g.id().to_string())),
        }
    }

    #[test]
    fn test_empty_id_rejected() {
        let registry = ScopeRegistry::new();
        assert!(registry.claim("").is_err());
    }

    #[test]
    fn test_reclaim_after_drop() {
        let registry = ScopeRegistry::new();
        drop(registry.claim("reuse").unwrap());
        assert!(registry.claim("reuse").is_ok());
    }
}
