// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Request descriptor and payload types

use std::collections::HashMap;
use std::time::Duration;

use bytes::Bytes;
use reqwest::header::{HeaderName, HeaderValue};
use serde_json::{Map, Value};
use url::Url;

use crate::error::{Error, Result};

/// Payload field that opts a request out of nonce protection
pub const SECURE_FIELD: &str = "secure";

/// HTTP methods supported by the request layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Method {
    Get,
    #[default]
    Post,
}

impl Method {
    /// Parse from a method string, GET and POST only
    pub fn parse(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            other => Err(Error::config(format!(
                "unsupported method '{}', expected GET or POST",
                other
            ))),
        }
    }

    /// Method name as a static string
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
        }
    }
}

/// One file in a multipart payload
#[derive(Debug, Clone)]
pub struct FilePart {
    /// Form field name
    pub name: String,
    /// Original file name
    pub filename: String,
    /// MIME type
    pub mime: String,
    /// File contents
    pub bytes: Bytes,
}

impl FilePart {
    /// Create a file part
    pub fn new(
        name: impl Into<String>,
        filename: impl Into<String>,
        mime: impl Into<String>,
        bytes: impl Into<Bytes>,
    ) -> Self {
        Self {
            name: name.into(),
            filename: filename.into(),
            mime: mime.into(),
            bytes: bytes.into(),
        }
    }
}

/// File-upload payload: text fields plus file parts
///
/// The transport hands this to its multipart encoder untouched; the
/// encoder sets the content-type (with boundary) itself.
#[derive(Debug, Clone, Default)]
pub struct MultipartPayload {
    /// Plain text fields
    pub fields: Vec<(String, String)>,
    /// File parts
    pub files: Vec<FilePart>,
    /// Whether the request carries a nonce
    pub secure: bool,
}

impl MultipartPayload {
    /// Create an empty secure multipart payload
    pub fn new() -> Self {
        Self {
            fields: Vec::new(),
            files: Vec::new(),
            secure: true,
        }
    }

    /// Add a text field
    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    /// Add a file part
    pub fn file(mut self, part: FilePart) -> Self {
        self.files.push(part);
        self
    }

    /// Opt out of nonce protection
    pub fn insecure(mut self) -> Self {
        self.secure = false;
        self
    }
}

/// Request payload
#[derive(Debug, Clone, Default)]
pub enum Payload {
    /// No payload
    #[default]
    None,
    /// Structured key-value map, serialized as JSON
    Map(Map<String, Value>),
    /// File-upload payload, passed through to the multipart encoder
    Multipart(MultipartPayload),
}

impl Payload {
    /// Build a map payload from any serializable object
    pub fn map_from<T: serde::Serialize>(data: &T) -> Result<Self> {
        match serde_json::to_value(data)? {
            Value::Object(map) => Ok(Payload::Map(map)),
            other => Err(Error::config(format!(
                "map payload requires a JSON object, got {}",
                other
            ))),
        }
    }

    /// Whether this is a file-upload payload
    pub fn is_multipart(&self) -> bool {
        matches!(self, Payload::Multipart(_))
    }

    /// Whether the request should carry a nonce
    ///
    /// A request is secure unless the payload explicitly opts out:
    /// `"secure": false` in a map, or [`MultipartPayload::insecure`].
    pub fn is_secure(&self) -> bool {
        match self {
            Payload::None => true,
            Payload::Map(map) => map.get(SECURE_FIELD) != Some(&Value::Bool(false)),
            Payload::Multipart(multipart) => multipart.secure,
        }
    }

    /// Insert a key-value pair, upgrading `None` to an empty map
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        match self {
            Payload::None => {
                let mut map = Map::new();
                map.insert(key.into(), value);
                *self = Payload::Map(map);
            }
            Payload::Map(map) => {
                map.insert(key.into(), value);
            }
            Payload::Multipart(multipart) => {
                let text = match value {
                    Value::String(s) => s,
                    other => other.to_string(),
                };
                multipart.fields.push((key.into(), text));
            }
        }
    }
}

/// Mutable state of one AJAX request
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    /// Target URL
    pub url: Url,
    /// HTTP method (GET or POST)
    pub method: Method,
    /// Header map
    pub headers: HashMap<String, String>,
    /// Request payload
    pub payload: Payload,
    /// Transport timeout
    pub timeout: Duration,
}

impl RequestDescriptor {
    /// Create a descriptor with defaults (POST, 30s timeout)
    pub fn new(url: impl AsRef<str>) -> Result<Self> {
        let url = url.as_ref();
        if url.trim().is_empty() {
            return Err(Error::config("request URL must not be empty"));
        }
        Ok(Self {
            url: Url::parse(url)?,
            method: Method::default(),
            headers: HashMap::new(),
            payload: Payload::None,
            timeout: Duration::from_secs(30),
        })
    }

    /// Set the method
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Set a header
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Replace the header map
    pub fn headers(mut self, headers: HashMap<String, String>) -> Self {
        self.headers = headers;
        self
    }

    /// Set the payload
    pub fn payload(mut self, payload: Payload) -> Self {
        self.payload = payload;
        self
    }

    /// Set the timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Validate the descriptor before transport
    pub fn validate(&self) -> Result<()> {
        for (name, value) in &self.headers {
            HeaderName::try_from(name.as_str())
                .map_err(|_| Error::config(format!("invalid header name '{}'", name)))?;
            HeaderValue::try_from(value.as_str())
                .map_err(|_| Error::config(format!("invalid value for header '{}'", name)))?;
        }
        if self.payload.is_multipart() && self.method == Method::Get {
            return Err(Error::config("file-upload payloads require POST"));
        }
        Ok(())
    }

    /// Merge default headers without overwriting caller-supplied ones
    ///
    /// For file-upload payloads any caller content-type is stripped: the
    /// multipart encoder must set its own boundary.
    pub(crate) fn finalize_headers(&mut self) {
        if self.payload.is_multipart() {
            self.headers
                .retain(|name, _| !name.eq_ignore_ascii_case("content-type"));
        }

        self.merge_default("accept", "application/json, text/plain, */*");
        self.merge_default("x-requested-with", "XMLHttpRequest");

        if self.method == Method::Post && matches!(self.payload, Payload::Map(_)) {
            self.merge_default("content-type", "application/json");
        }
    }

    fn merge_default(&mut self, name: &str, value: &str) {
        let present = self.headers.keys().any(|k| k.eq_ignore_ascii_case(name));
        if !present {
            self.headers.insert(name.to_string(), value.to_string());
        }
    }
}
