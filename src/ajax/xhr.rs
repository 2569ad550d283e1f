// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Callback-style transport with ready states and progress
//!
//! Mirrors the XHR object model: subscribers observe ready-state
//! transitions, upload progress as the request body goes out, and
//! download progress while the response body streams in. The timeout is
//! the client's own, not an external timer, and a blocking mode covers
//! the synchronous-XHR escape hatch.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures::StreamExt;
use reqwest::Client;

use super::request::{Method, Payload, RequestDescriptor};
use super::response::{package, AjaxResponse};
use super::transport::{build_request, header_map, query_pairs, Transport};
use crate::error::{Error, Result};

/// XHR-style ready states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyState {
    /// Request built, not yet sent
    Opened,
    /// Status line and headers received
    HeadersReceived,
    /// Body is streaming in
    Loading,
    /// Response complete (or failed)
    Done,
}

/// Ready-state transition callback
pub type ReadyStateCallback = Arc<dyn Fn(ReadyState) + Send + Sync>;

/// Progress callback: bytes transferred, total when known
pub type ProgressCallback = Arc<dyn Fn(u64, Option<u64>) + Send + Sync>;

/// Chunk size for the counted upload body
const UPLOAD_CHUNK: usize = 8 * 1024;

/// XHR-flavored transport strategy
pub struct XhrTransport {
    client: Client,
    on_ready_state: Option<ReadyStateCallback>,
    on_upload_progress: Option<ProgressCallback>,
    on_progress: Option<ProgressCallback>,
    blocking: bool,
}

impl XhrTransport {
    /// Create an XHR transport
    pub fn new() -> Result<Self> {
        let client = Client::builder().build()?;
        Ok(Self {
            client,
            on_ready_state: None,
            on_upload_progress: None,
            on_progress: None,
            blocking: false,
        })
    }

    /// Observe ready-state transitions
    pub fn on_ready_state(mut self, callback: ReadyStateCallback) -> Self {
        self.on_ready_state = Some(callback);
        self
    }

    /// Observe upload progress as the request body is handed off
    ///
    /// Only map payloads report upload progress; the multipart encoder
    /// owns its own body stream.
    pub fn on_upload_progress(mut self, callback: ProgressCallback) -> Self {
        self.on_upload_progress = Some(callback);
        self
    }

    /// Observe download progress
    pub fn on_progress(mut self, callback: ProgressCallback) -> Self {
        self.on_progress = Some(callback);
        self
    }

    /// Run on a blocking client instead of streaming
    ///
    /// No progress events in this mode; ready states collapse to
    /// Opened and Done.
    pub fn blocking(mut self, blocking: bool) -> Self {
        self.blocking = blocking;
        self
    }

    fn emit_state(&self, state: ReadyState) {
        if let Some(callback) = &self.on_ready_state {
            callback(state);
        }
    }

    fn emit_progress(&self, received: u64, total: Option<u64>) {
        if let Some(callback) = &self.on_progress {
            callback(received, total);
        }
    }

    async fn execute_streaming(&self, descriptor: &RequestDescriptor) -> Result<AjaxResponse> {
        let builder = match (descriptor.method, &descriptor.payload, &self.on_upload_progress) {
            (Method::Post, Payload::Map(map), Some(callback)) => {
                let mut builder = self
                    .client
                    .request(reqwest::Method::POST, descriptor.url.clone());
                for (name, value) in &descriptor.headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                builder.body(counting_body(serde_json::to_vec(map)?, callback.clone()))
            }
            _ => build_request(&self.client, descriptor)?,
        }
        .timeout(descriptor.timeout);
        self.emit_state(ReadyState::Opened);

        let response = builder.send().await.map_err(|e| self.map_error(e, descriptor))?;
        let status = response.status().as_u16();
        let headers = header_map(response.headers());
        let total = response.content_length();
        self.emit_state(ReadyState::HeadersReceived);

        let mut body = BytesMut::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| self.map_error(e, descriptor))?;
            body.extend_from_slice(&chunk);
            self.emit_state(ReadyState::Loading);
            self.emit_progress(body.len() as u64, total);
        }
        self.emit_state(ReadyState::Done);

        package(status, headers, &body)
    }

    async fn execute_blocking(&self, descriptor: &RequestDescriptor) -> Result<AjaxResponse> {
        let descriptor = descriptor.clone();
        self.emit_state(ReadyState::Opened);

        let result = tokio::task::spawn_blocking(move || blocking_round_trip(&descriptor))
            .await
            .map_err(|e| Error::other(format!("blocking transport task failed: {}", e)))?;

        self.emit_state(ReadyState::Done);
        result
    }

    fn map_error(&self, error: reqwest::Error, descriptor: &RequestDescriptor) -> Error {
        if error.is_timeout() {
            Error::timeout_with_url(
                "transport",
                descriptor.timeout.as_millis() as u64,
                descriptor.url.as_str(),
            )
        } else {
            Error::Http(error)
        }
    }
}

#[async_trait]
impl Transport for XhrTransport {
    fn name(&self) -> &'static str {
        "xhr"
    }

    async fn execute(&self, descriptor: &RequestDescriptor) -> Result<AjaxResponse> {
        descriptor.validate()?;

        tracing::debug!(
            method = descriptor.method.as_str(),
            url = %descriptor.url,
            transport = self.name(),
            blocking = self.blocking,
            "Executing request"
        );

        if self.blocking {
            self.execute_blocking(descriptor).await
        } else {
            self.execute_streaming(descriptor).await
        }
    }
}

/// Chunked request body that reports bytes as the transport consumes them
fn counting_body(bytes: Vec<u8>, callback: ProgressCallback) -> reqwest::Body {
    let total = bytes.len() as u64;
    let sent = Arc::new(AtomicU64::new(0));
    let chunks: Vec<Bytes> = bytes
        .chunks(UPLOAD_CHUNK)
        .map(Bytes::copy_from_slice)
        .collect();

    let stream = futures::stream::iter(chunks.into_iter().map(move |chunk| {
        let count = sent.fetch_add(chunk.len() as u64, Ordering::SeqCst) + chunk.len() as u64;
        callback(count, Some(total));
        Ok::<Bytes, std::io::Error>(chunk)
    }));
    reqwest::Body::wrap_stream(stream)
}

/// One full request on a blocking client, for the synchronous mode
fn blocking_round_trip(descriptor: &RequestDescriptor) -> Result<AjaxResponse> {
    let client = reqwest::blocking::Client::builder()
        .timeout(descriptor.timeout)
        .build()?;

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
            let mut form = reqwest::blocking::multipart::Form::new();
            for (name, value) in &multipart.fields {
                form = form.text(name.clone(), value.clone());
            }
            for file in &multipart.files {
                let part = reqwest::blocking::multipart::Part::bytes(file.bytes.to_vec())
                    .file_name(file.filename.clone())
                    .mime_str(&file.mime)?;
                form = form.part(file.name.clone(), part);
            }
            builder = builder.multipart(form);
        }
        (Method::Post, Payload::None) => {}
    }

    let response = builder.send().map_err(|e| {
        if e.is_timeout() {
            Error::timeout_with_url(
                "transport",
                descriptor.timeout.as_millis() as u64,
                descriptor.url.as_str(),
            )
        } else {
            Error::Http(e)
        }
    })?;

    let status = response.status().as_u16();
    let headers = header_map(response.headers());
    let bytes = response.bytes()?;
    package(status, headers, &bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_ready_states_and_progress() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/data"))
            .respond_with(ResponseTemplate::new(200).set_body_string("0123456789"))
            .mount(&server)
            .await;

        let states = Arc::new(Mutex::new(Vec::new()));
        let progress = Arc::new(Mutex::new(Vec::new()));
        let states2 = states.clone();
        let progress2 = progress.clone();

        let transport = XhrTransport::new()
            .unwrap()
            .on_ready_state(Arc::new(move |s| states2.lock().push(s)))
            .on_progress(Arc::new(move |received, _| progress2.lock().push(received)));

        let d = RequestDescriptor::new(format!("{}/data", server.uri())).unwrap();
        let response = transport.execute(&d).await.unwrap();

        assert_eq!(response.text(), "0123456789");
        let states = states.lock();
        assert_eq!(states.first(), Some(&ReadyState::Opened));
        assert!(states.contains(&ReadyState::HeadersReceived));
        assert!(states.contains(&ReadyState::Loading));
        assert_eq!(states.last(), Some(&ReadyState::Done));
        assert_eq!(progress.lock().last(), Some(&10));
    }

    #[tokio::test]
    async fn test_upload_progress_counts_monotonically() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/upload"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen2 = seen.clone();
        let transport = XhrTransport::new()
            .unwrap()
            .on_upload_progress(Arc::new(move |sent, total| {
                seen2.lock().push((sent, total));
            }));

        let mut map = serde_json::Map::new();
        map.insert("blob".to_string(), json!("x".repeat(64 * 1024)));
        let d = RequestDescriptor::new(format!("{}/upload", server.uri()))
            .unwrap()
            .payload(Payload::Map(map));

        transport.execute(&d).await.unwrap();

        let seen = seen.lock();
        assert!(seen.len() > 1);
        assert!(seen.windows(2).all(|w| w[0].0 < w[1].0));
        let (last_sent, last_total) = *seen.last().unwrap();
        assert_eq!(Some(last_sent), last_total);
    }

    #[tokio::test]
    async fn test_native_timeout_converts() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/slow"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
            .mount(&server)
            .await;

        let transport = XhrTransport::new().unwrap();
        let d = RequestDescriptor::new(format!("{}/slow", server.uri()))
            .unwrap()
            .timeout(Duration::from_millis(50));

        let err = transport.execute(&d).await.unwrap_err();
        assert!(err.is_timeout());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_blocking_mode_round_trip() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/sync"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .mount(&server)
            .await;

        let transport = XhrTransport::new().unwrap().blocking(true);
        let d = RequestDescriptor::new(format!("{}/sync", server.uri())).unwrap();

        let response = transport.execute(&d).await.unwrap();
        assert_eq!(response.json(), Some(&json!({"ok": true})));
    }

    #[tokio::test]
    async fn test_error_status_in_streaming_mode() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/bad"))
            .respond_with(
                ResponseTemplate::new(422).set_body_json(json!({"message": "invalid model"})),
            )
            .mount(&server)
            .await;

        let transport = XhrTransport::new().unwrap();
        let d = RequestDescriptor::new(format!("{}/bad", server.uri())).unwrap();

        let err = transport.execute(&d).await.unwrap_err();
        assert!(err.is_invalid_model());
    }
}
