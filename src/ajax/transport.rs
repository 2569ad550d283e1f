// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Transport strategy contract
//!
//! The concrete HTTP client behind a request is a strategy selected at
//! construction time: [`FetchTransport`](super::FetchTransport) for the
//! promise-style abort-on-timeout flavor, [`XhrTransport`](super::XhrTransport)
//! for the callback flavor with ready states and progress.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;

use super::request::{Method, MultipartPayload, Payload, RequestDescriptor};
use super::response::AjaxResponse;
use crate::error::Result;

/// Concrete HTTP client implementation behind a request
#[async_trait]
pub trait Transport: Send + Sync {
    /// Strategy name for logs
    fn name(&self) -> &'static str;

    /// Execute one request
    ///
    /// Implementations must attach the descriptor's headers, serialize a
    /// map payload as JSON (multipart passes through), never send a body
    /// on GET, honor the timeout, and convert non-2xx statuses into
    /// status errors.
    async fn execute(&self, descriptor: &RequestDescriptor) -> Result<AjaxResponse>;
}

/// Build a reqwest request from a descriptor
///
/// GET never carries a body: a map payload becomes query parameters.
pub(crate) fn build_request(
    client: &reqwest::Client,
    descriptor: &RequestDescriptor,
) -> Result<reqwest::RequestBuilder> {
    let mut builder = client.request(descriptor.method.into(), descriptor.url.clone());

    for (name, value) in &descriptor.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }

    match (descriptor.method, &descriptor.payload) {
        (Method::Get, Payload::Map(map)) => {
            builder = builder.query(&query_pairs(map));
        }
        (Method::Get, _) => {}
        (Method::Post, Payload::Map(map)) => {
            builder = builder.body(serde_json::to_vec(map)?);
        }
        (Method::Post, Payload::Multipart(multipart)) => {
            builder = builder.multipart(multipart_form(multipart)?);
        }
        (Method::Post, Payload::None) => {}
    }

    Ok(builder)
}

/// Flatten a map payload into query parameters
pub(crate) fn query_pairs(map: &serde_json::Map<String, Value>) -> Vec<(String, String)> {
    map.iter()
        .filter(|(_, value)| !value.is_null())
        .map(|(key, value)| {
            let rendered = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (key.clone(), rendered)
        })
        .collect()
}

fn multipart_form(payload: &MultipartPayload) -> Result<reqwest::multipart::Form> {
    let mut form = reqwest::multipart::Form::new();
    for (name, value) in &payload.fields {
        form = form.text(name.clone(), value.clone());
    }
    for file in &payload.files {
        let part = reqwest::multipart::Part::bytes(file.bytes.to_vec())
            .file_name(file.filename.clone())
            .mime_str(&file.mime)?;
        form = form.part(file.name.clone(), part);
    }
    Ok(form)
}

/// Collect response headers into the descriptor-style plain map
pub(crate) fn header_map(headers: &reqwest::header::HeaderMap) -> HashMap<String, String> {
    headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_query_pairs_rendering() {
        let mut map = serde_json::Map::new();
        map.insert("name".to_string(), json!("rapu"));
        map.insert("count".to_string(), json!(3));
        map.insert("skip".to_string(), Value::Null);

        let mut pairs = query_pairs(&map);
        pairs.sort();

        assert_eq!(
            pairs,
            vec![
                ("count".to_string(), "3".to_string()),
                ("name".to_string(), "rapu".to_string()),
            ]
        );
    }
}
