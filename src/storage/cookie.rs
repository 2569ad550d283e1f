// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Cookie-backed key-value store
//!
//! Values are JSON-encoded and base64url-wrapped so arbitrary structures
//! survive the cookie grammar. Entries may carry an expiry; expired
//! entries read as absent and are dropped lazily.

use std::collections::HashMap;
use std::sync::Arc;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use serde_json::Value;

use super::{append_value, KeyValueStore};
use crate::error::{Error, Result};

/// One stored cookie entry
#[derive(Debug, Clone)]
struct CookieEntry {
    value: Value,
    /// None = session cookie, never expires here
    expires: Option<DateTime<Utc>>,
}

impl CookieEntry {
    fn is_expired(&self) -> bool {
        self.expires.map_or(false, |exp| exp < Utc::now())
    }
}

/// Key-value store rendered to and parsed from Cookie header strings
#[derive(Clone, Default)]
pub struct CookieStore {
    entries: Arc<RwLock<HashMap<String, CookieEntry>>>,
}

impl CookieStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a value that expires after the given number of days
    pub fn set_with_expiry(&self, key: &str, value: Value, days: i64) -> Result<()> {
        if value.is_null() {
            self.remove(key);
            return Ok(());
        }
        self.entries.write().insert(
            key.to_string(),
            CookieEntry {
                value,
                expires: Some(Utc::now() + Duration::days(days)),
            },
        );
        Ok(())
    }

    /// Render live entries as a Cookie header value
    pub fn to_header(&self) -> String {
        self.entries
            .read()
            .iter()
            .filter(|(_, entry)| !entry.is_expired())
            .filter_map(|(key, entry)| {
                encode_value(&entry.value)
                    .ok()
                    .map(|encoded| format!("{}={}", key, encoded))
            })
            .collect::<Vec<_>>()
            .join("; ")
    }

    /// Ingest a Cookie header value, replacing duplicated keys
    ///
    /// Pairs whose value does not decode are skipped with a warning so a
    /// foreign cookie on the same header cannot poison the store.
    pub fn parse_header(&self, header: &str) {
        let mut entries = self.entries.write();
        for pair in header.split(';') {
            let pair = pair.trim();
            if pair.is_empty() {
                continue;
            }
            let Some((key, raw)) = pair.split_once('=') else {
                continue;
            };
            match decode_value(raw.trim()) {
                Ok(value) => {
                    entries.insert(
                        key.trim().to_string(),
                        CookieEntry {
                            value,
                            expires: None,
                        },
                    );
                }
                Err(e) => {
                    tracing::warn!(key = key.trim(), error = %e, "Skipping undecodable cookie");
                }
            }
        }
    }

    /// Drop every expired entry
    pub fn prune(&self) {
        self.entries.write().retain(|_, entry| !entry.is_expired());
    }
}

impl KeyValueStore for CookieStore {
    fn get(&self, key: &str) -> Option<Value> {
        let entries = self.entries.read();
        let entry = entries.get(key)?;
        if entry.is_expired() {
            return None;
        }
        Some(entry.value.clone())
    }

    fn set(&self, key: &str, value: Value) -> Result<()> {
        if value.is_null() {
            self.entries.write().remove(key);
        } else {
            self.entries.write().insert(
                key.to_string(),
                CookieEntry {
                    value,
                    expires: None,
                },
            );
        }
        Ok(())
    }

    fn append(&self, key: &str, value: Value) -> Result<bool> {
        let mut entries = self.entries.write();
        match entries.get_mut(key) {
            Some(entry) if !entry.is_expired() => {
                append_value(&mut entry.value, value)?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn remove(&self, key: &str) -> Option<Value> {
        self.entries.write().remove(key).map(|e| e.value)
    }

    fn clear(&self) {
        self.entries.write().clear();
    }

    fn keys(&self) -> Vec<String> {
        self.entries
            .read()
            .iter()
            .filter(|(_, entry)| !entry.is_expired())
            .map(|(key, _)| key.clone())
            .collect()
    }

    fn len(&self) -> usize {
        self.entries
            .read()
            .values()
            .filter(|entry| !entry.is_expired())
            .count()
    }
}

fn encode_value(value: &Value) -> Result<String> {
    let json = serde_json::to_vec(value)?;
    Ok(URL_SAFE_NO_PAD.encode(json))
}

fn decode_value(raw: &str) -> Result<Value> {
    let bytes = URL_SAFE_NO_PAD
        .decode(raw)
        .map_err(|e| Error::storage(format!("invalid cookie encoding: {}", e)))?;
    Ok(serde_json::from_slice(&bytes)?)
}
