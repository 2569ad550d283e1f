// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Response types shared by both transport strategies

use std::collections::HashMap;

use serde_json::Value;

use crate::error::{Error, Result};

/// Parsed response body
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// Content-type indicated JSON and the body parsed
    Json(Value),
    /// Raw text for everything else
    Text(String),
}

/// Response from either transport strategy
#[derive(Debug, Clone)]
pub struct AjaxResponse {
    /// HTTP status code
    pub status: u16,
    /// Response headers
    pub headers: HashMap<String, String>,
    /// Parsed body
    pub body: Body,
}

impl AjaxResponse {
    /// Get the JSON body, if the response was JSON
    pub fn json(&self) -> Option<&Value> {
        match &self.body {
            Body::Json(value) => Some(value),
            Body::Text(_) => None,
        }
    }

    /// Get the body as text (JSON bodies re-serialize)
    pub fn text(&self) -> String {
        match &self.body {
            Body::Json(value) => value.to_string(),
            Body::Text(text) => text.clone(),
        }
    }

    /// Get a header value
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// The body's JSON representation for hook arguments
    pub(crate) fn body_value(&self) -> Value {
        match &self.body {
            Body::Json(value) => value.clone(),
            Body::Text(text) => Value::String(text.clone()),
        }
    }
}

/// Assemble a response from raw parts, converting non-2xx to an error
///
/// JSON is parsed when the content-type says so; a failed parse on a
/// successful response is a serialization error. Error bodies parse
/// leniently so the `message` field can be extracted when present.
pub(crate) fn package(
    status: u16,
    headers: HashMap<String, String>,
    bytes: &[u8],
) -> Result<AjaxResponse> {
    let is_json = headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case("content-type"))
        .map(|(_, v)| v.contains("application/json") || v.contains("+json"))
        .unwrap_or(false);

    if !(200..300).contains(&status) {
        let message = error_message(status, bytes, is_json);
        return Err(Error::status(status, message));
    }

    let body = if is_json {
        Body::Json(serde_json::from_slice(bytes)?)
    } else {
        Body::Text(String::from_utf8_lossy(bytes).into_owned())
    };

    Ok(AjaxResponse {
        status,
        headers,
        body,
    })
}

fn error_message(status: u16, bytes: &[u8], is_json: bool) -> String {
    if is_json {
        if let Ok(value) = serde_json::from_slice::<Value>(bytes) {
            if let Some(message) = value.get("message").and_then(Value::as_str) {
                return message.to_string();
            }
        }
    }
    let text = String::from_utf8_lossy(bytes);
    let trimmed = text.trim();
    if trimmed.is_empty() {
        format!("request failed with status {}", status)
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn json_headers() -> HashMap<String, String> {
        let mut headers = HashMap::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        headers
    }

    #[test]
    fn test_json_body_parsed_by_content_type() {
        let response = package(200, json_headers(), br#"{"ok": true}"#).unwrap();
        assert_eq!(response.json(), Some(&json!({"ok": true})));
    }

    #[test]
    fn test_plain_body_returned_as_text() {
        let response = package(200, HashMap::new(), b"hello").unwrap();
        assert_eq!(response.body, Body::Text("hello".to_string()));
        assert_eq!(response.json(), None);
    }

    #[test]
    fn test_error_status_uses_message_field() {
        let err = package(404, json_headers(), br#"{"message": "not found"}"#).unwrap_err();
        match err {
            Error::Status { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "not found");
            }
            other => panic!("Expected Status error, got {:?}", other),
        }
    }

    #[test]
    fn test_error_status_without_message() {
        let err = package(500, HashMap::new(), b"").unwrap_err();
        assert_eq!(err.to_string(), "HTTP 500: request failed with status 500");
    }

    #[test]
    fn test_invalid_json_on_success_is_an_error() {
        assert!(package(200, json_headers(), b"not json").is_err());
    }

    #[test]
    fn test_header_lookup_case_insensitive() {
        let response = package(200, json_headers(), b"{}").unwrap();
        assert_eq!(response.header("content-type"), Some("application/json"));
    }
}
