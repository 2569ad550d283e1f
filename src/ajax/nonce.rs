// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Anti-forgery nonce handshake
//!
//! Secure requests fetch a server-issued nonce first and attach it to the
//! outgoing payload. The handshake is one POST to the nonce endpoint
//! (defaulting to the request's own URL); a failed handshake fails the
//! whole request and is never retried on its own.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::json;
use url::Url;

use super::request::{Method, Payload, RequestDescriptor};
use super::transport::Transport;
use crate::error::{Error, Result};

/// Default payload field name for the nonce
pub const DEFAULT_NONCE_NAME: &str = "nonce";

/// Request body of the nonce handshake
#[derive(Debug, Serialize)]
pub struct NonceRequest<'a> {
    pub nonce_name: &'a str,
    #[serde(rename = "isNonceRetrieval")]
    pub is_nonce_retrieval: bool,
}

/// Response body of the nonce handshake
#[derive(Debug, Deserialize)]
pub struct NonceResponse {
    pub success: bool,
    #[serde(default)]
    pub data: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Nonce endpoint configuration for one request instance
#[derive(Debug, Clone)]
pub struct NonceConfig {
    /// Endpoint override; `None` means the request's own URL
    pub endpoint: Option<Url>,
    /// Field name the nonce travels under
    pub nonce_name: String,
}

impl Default for NonceConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            nonce_name: DEFAULT_NONCE_NAME.to_string(),
        }
    }
}

/// Fetch a nonce from the endpoint via the given transport
///
/// Any failure here - transport, status, or a declined handshake - maps
/// to [`Error::Nonce`] so callers can tell it apart from the main
/// request failing.
pub async fn fetch_nonce(
    transport: &dyn Transport,
    endpoint: &Url,
    nonce_name: &str,
    timeout: Duration,
) -> Result<String> {
    let mut payload = serde_json::Map::new();
    payload.insert("nonce_name".to_string(), json!(nonce_name));
    payload.insert("isNonceRetrieval".to_string(), json!(true));

    let descriptor = RequestDescriptor {
        url: endpoint.clone(),
        method: Method::Post,
        headers: [("content-type".to_string(), "application/json".to_string())]
            .into_iter()
            .collect(),
        payload: Payload::Map(payload),
        timeout,
    };

    let response = transport
        .execute(&descriptor)
        .await
        .map_err(|e| Error::nonce(format!("handshake failed: {}", e)))?;

    let body: NonceResponse = match response.json() {
        Some(value) => serde_json::from_value(value.clone())
            .map_err(|e| Error::nonce(format!("malformed handshake response: {}", e)))?,
        None => return Err(Error::nonce("handshake response was not JSON")),
    };

    if !body.success {
        return Err(Error::nonce(
            body.message
                .unwrap_or_else(|| "server declined the handshake".to_string()),
        ));
    }

    body.data
        .filter(|nonce| !nonce.is_empty())
        .ok_or_else(|| Error::nonce("handshake response carried no nonce"))
}
