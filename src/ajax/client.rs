// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Single-flight AJAX request lifecycle
//!
//! One [`AjaxRequest`] owns one logical request: its descriptor, its
//! transport strategy, its nonce cache, and its flight lock. Concurrent
//! `send()` calls on the same instance serialize behind the lock (FIFO
//! wakeup); every lifecycle stage is broadcast on the hook bus, both
//! globally and - when the instance carries a hooks ID - under the
//! instance-scoped name.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde_json::{json, Value};
use url::Url;

use super::connectivity::{wait_for_network, Connectivity, ConnectivityMonitor};
use super::meta::AjaxMeta;
use super::nonce::{fetch_nonce, NonceConfig};
use super::request::{Method, Payload, RequestDescriptor};
use super::response::AjaxResponse;
use super::transport::Transport;
use super::FetchTransport;
use crate::error::{Error, Result};
use crate::hooks::{names, HookRegistry, ScopeGuard, ScopeRegistry};

/// Default polling interval for the offline wait loop
const OFFLINE_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Bounded wait configuration for offline periods
#[derive(Debug, Clone, Copy)]
pub struct OfflineWait {
    /// Maximum time to wait for connectivity to return
    pub max_wait: Duration,
    /// Polling interval backing up the restored event
    pub poll: Duration,
}

/// Per-call overrides for [`AjaxRequest::send_with`]
///
/// Omitted fields keep the instance's prior configuration.
#[derive(Debug, Clone, Default)]
pub struct SendOptions {
    pub url: Option<String>,
    pub method: Option<Method>,
    pub headers: Option<HashMap<String, String>>,
    pub data: Option<Payload>,
}

impl SendOptions {
    /// Empty overrides
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the target URL
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Override the method
    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    /// Override the header map
    pub fn headers(mut self, headers: HashMap<String, String>) -> Self {
        self.headers = Some(headers);
        self
    }

    /// Override the payload
    pub fn data(mut self, payload: Payload) -> Self {
        self.data = Some(payload);
        self
    }
}

/// One logical AJAX request with single-flight execution
pub struct AjaxRequest {
    descriptor: Mutex<RequestDescriptor>,
    transport: Arc<dyn Transport>,
    hooks: Arc<HookRegistry>,
    connectivity: Arc<dyn Connectivity>,
    nonce_config: NonceConfig,
    /// Cached nonce, instance-local
    nonce: Mutex<Option<String>>,
    offline_wait: Option<OfflineWait>,
    scope: Option<ScopeGuard>,
    /// Serializes sends on this instance; holding it is the busy state
    flight: tokio::sync::Mutex<()>,
}

impl AjaxRequest {
    /// Start building a request for the given URL
    pub fn builder(url: impl AsRef<str>) -> Result<AjaxRequestBuilder> {
        Ok(AjaxRequestBuilder {
            descriptor: RequestDescriptor::new(url)?,
            transport: None,
            hooks: None,
            connectivity: None,
            nonce_config: NonceConfig::default(),
            offline_wait: None,
            scope: None,
        })
    }

    /// Start building from the page's AJAX meta object
    pub fn from_meta(meta: &AjaxMeta) -> Result<AjaxRequestBuilder> {
        let mut builder = Self::builder(&meta.ajaxurl)?;
        if let Some(endpoint) = &meta.nonce_endpoint {
            builder.nonce_config.endpoint = Some(Url::parse(endpoint)?);
        }
        if let Some(name) = &meta.nonce_name {
            builder.nonce_config.nonce_name = name.clone();
        }
        Ok(builder)
    }

    /// The hook registry this instance broadcasts on
    pub fn hooks(&self) -> &Arc<HookRegistry> {
        &self.hooks
    }

    /// The instance's hooks ID, if any
    pub fn hooks_id(&self) -> Option<&str> {
        self.scope.as_ref().map(|s| s.id())
    }

    /// Whether a send is currently in flight on this instance
    pub fn is_busy(&self) -> bool {
        self.flight.try_lock().is_err()
    }

    /// Send with the instance's current configuration
    pub async fn send(&self) -> Result<AjaxResponse> {
        self.send_with(SendOptions::default()).await
    }

    /// Send with per-call overrides
    ///
    /// Configuration errors (bad URL, bad method, bad headers) return
    /// before any hook fires. Everything past validation broadcasts its
    /// lifecycle on the hook bus and ends with `ajaxRequestCompleted`.
    pub async fn send_with(&self, options: SendOptions) -> Result<AjaxResponse> {
        let descriptor = self.adopt(options)?;
        let url = descriptor.url.to_string();

        let _flight = match self.flight.try_lock() {
            Ok(guard) => guard,
            Err(_) => {
                self.notify(names::AJAX_REQUEST_IS_BUSY, &[json!({ "url": url })]);
                self.flight.lock().await
            }
        };

        let result = self.run(descriptor).await;

        match &result {
            Ok(response) => {
                tracing::info!(url = %url, status = response.status, "Request succeeded");
                self.notify(
                    names::AJAX_REQUEST_SUCCEEDED,
                    &[json!({"url": url, "status": response.status, "data": response.body_value()})],
                );
            }
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "Request failed");
                let hook = if e.is_timeout() {
                    names::AJAX_REQUEST_FAILED_ON_TIMEOUT
                } else if e.is_offline() {
                    names::AJAX_REQUEST_FAILED_ON_OFFLINE
                } else if e.is_invalid_model() {
                    names::AJAX_REQUEST_FAILED_ON_INVALID_MODEL
                } else {
                    names::AJAX_REQUEST_FAILED_ON_ERROR
                };
                self.notify(hook, &[json!({"url": url, "error": e.to_string()})]);
            }
        }

        self.notify(names::AJAX_REQUEST_COMPLETED, &[json!({ "url": url })]);
        // _flight drops here; the busy state clears on every exit path,
        // unwinds included.
        result
    }

    /// Adopt per-call overrides and validate the resulting descriptor
    fn adopt(&self, options: SendOptions) -> Result<RequestDescriptor> {
        let mut descriptor = self.descriptor.lock();
        if let Some(url) = options.url {
            if url.trim().is_empty() {
                return Err(Error::config("request URL must not be empty"));
            }
            descriptor.url = Url::parse(&url)?;
        }
        if let Some(method) = options.method {
            descriptor.method = method;
        }
        if let Some(headers) = options.headers {
            descriptor.headers = headers;
        }
        if let Some(payload) = options.data {
            descriptor.payload = payload;
        }
        descriptor.validate()?;

        let mut adopted = descriptor.clone();
        adopted.finalize_headers();
        Ok(adopted)
    }

    async fn run(&self, mut descriptor: RequestDescriptor) -> Result<AjaxResponse> {
        let url = descriptor.url.to_string();

        if !self.connectivity.is_online() {
            let Some(wait) = self.offline_wait else {
                return Err(Error::offline("network unavailable"));
            };
            self.notify(names::AJAX_REQUEST_IS_INTERRUPTED, &[json!({ "url": url })]);
            let recovered =
                wait_for_network(self.connectivity.as_ref(), wait.max_wait, wait.poll).await;
            if !recovered {
                return Err(Error::offline_after_wait(
                    "network did not recover",
                    wait.max_wait.as_millis() as u64,
                ));
            }
            self.notify(names::AJAX_REQUEST_RESUMED, &[json!({ "url": url })]);
        }

        if descriptor.payload.is_secure() {
            let nonce = self.nonce_value(&descriptor).await?;
            descriptor
                .payload
                .insert(self.nonce_config.nonce_name.clone(), Value::String(nonce));
        }

        self.transport.execute(&descriptor).await
    }

    /// Cached nonce, fetching on first use
    async fn nonce_value(&self, descriptor: &RequestDescriptor) -> Result<String> {
        if let Some(nonce) = self.nonce.lock().clone() {
            return Ok(nonce);
        }
        let endpoint = self
            .nonce_config
            .endpoint
            .clone()
            .unwrap_or_else(|| descriptor.url.clone());
        let nonce = fetch_nonce(
            self.transport.as_ref(),
            &endpoint,
            &self.nonce_config.nonce_name,
            descriptor.timeout,
        )
        .await?;
        *self.nonce.lock() = Some(nonce.clone());
        Ok(nonce)
    }

    /// Fire a lifecycle hook, instance-scoped first, then globally
    fn notify(&self, name: &str, args: &[Value]) {
        if let Some(scope) = &self.scope {
            self.hooks.fire(&names::scoped(name, scope.id()), args);
        }
        self.hooks.fire(name, args);
    }
}

/// Builder for [`AjaxRequest`]
pub struct AjaxRequestBuilder {
    descriptor: RequestDescriptor,
    transport: Option<Arc<dyn Transport>>,
    hooks: Option<Arc<HookRegistry>>,
    connectivity: Option<Arc<dyn Connectivity>>,
    nonce_config: NonceConfig,
    offline_wait: Option<OfflineWait>,
    scope: Option<ScopeGuard>,
}

impl AjaxRequestBuilder {
    /// Set the method
    pub fn method(mut self, method: Method) -> Self {
        self.descriptor.method = method;
        self
    }

    /// Set a header
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.descriptor.headers.insert(name.into(), value.into());
        self
    }

    /// Set the payload
    pub fn payload(mut self, payload: Payload) -> Self {
        self.descriptor.payload = payload;
        self
    }

    /// Set the transport timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.descriptor.timeout = timeout;
        self
    }

    /// Select the transport strategy
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Broadcast on a shared hook registry
    pub fn hooks(mut self, hooks: Arc<HookRegistry>) -> Self {
        self.hooks = Some(hooks);
        self
    }

    /// Use an injected connectivity source
    pub fn connectivity(mut self, connectivity: Arc<dyn Connectivity>) -> Self {
        self.connectivity = Some(connectivity);
        self
    }

    /// Override the nonce endpoint
    pub fn nonce_endpoint(mut self, endpoint: Url) -> Self {
        self.nonce_config.endpoint = Some(endpoint);
        self
    }

    /// Override the nonce field name
    pub fn nonce_name(mut self, name: impl Into<String>) -> Self {
        self.nonce_config.nonce_name = name.into();
        self
    }

    /// Wait for connectivity to return instead of failing immediately
    pub fn wait_for_network(mut self, max_wait: Duration) -> Self {
        self.offline_wait = Some(OfflineWait {
            max_wait,
            poll: OFFLINE_POLL_INTERVAL,
        });
        self
    }

    /// Adjust the offline polling interval
    pub fn offline_poll(mut self, poll: Duration) -> Self {
        if let Some(wait) = &mut self.offline_wait {
            wait.poll = poll;
        }
        self
    }

    /// Claim a hooks ID scoping this instance's notifications
    ///
    /// Fails fast when the ID is already claimed by a live instance.
    pub fn hooks_id(mut self, id: impl Into<String>, registry: &ScopeRegistry) -> Result<Self> {
        self.scope = Some(registry.claim(id)?);
        Ok(self)
    }

    /// Build the request instance
    pub fn build(self) -> Result<AjaxRequest> {
        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(FetchTransport::new()?),
        };
        Ok(AjaxRequest {
            descriptor: Mutex::new(self.descriptor),
            transport,
            hooks: self.hooks.unwrap_or_default(),
            connectivity: self
                .connectivity
                .unwrap_or_else(|| Arc::new(ConnectivityMonitor::new(true))),
            nonce_config: self.nonce_config,
            nonce: Mutex::new(None),
            offline_wait: self.offline_wait,
            scope: self.scope,
            flight: tokio::sync::Mutex::new(()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::HookCallback;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Instant;
    use wiremock::matchers::{body_json, body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn counter(count: Arc<AtomicUsize>) -> HookCallback {
        Arc::new(move |_| {
            count.fetch_add(1, Ordering::SeqCst);
        })
    }

    fn insecure_map() -> Payload {
        let mut map = serde_json::Map::new();
        map.insert("secure".to_string(), json!(false));
        map.insert("action".to_string(), json!("go"));
        Payload::Map(map)
    }

    #[tokio::test]
    async fn test_insecure_payload_skips_nonce() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/save"))
            .and(body_partial_json(json!({"action": "go"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
            .expect(1)
            .mount(&server)
            .await;

        let request = AjaxRequest::builder(format!("{}/save", server.uri()))
            .unwrap()
            .payload(insecure_map())
            .build()
            .unwrap();

        request.send().await.unwrap();
        // Exactly one request total: no nonce round-trip happened.
        assert_eq!(server.received_requests().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_nonce_fetched_merged_and_cached() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/ajax"))
            .and(body_json(json!({"nonce_name": "nonce", "isNonceRetrieval": true})))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"success": true, "data": "n-1"})),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/save"))
            .and(body_partial_json(json!({"action": "go", "nonce": "n-1"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
            .expect(2)
            .mount(&server)
            .await;

        let mut map = serde_json::Map::new();
        map.insert("action".to_string(), json!("go"));

        let request = AjaxRequest::builder(format!("{}/save", server.uri()))
            .unwrap()
            .nonce_endpoint(Url::parse(&format!("{}/ajax", server.uri())).unwrap())
            .payload(Payload::Map(map))
            .build()
            .unwrap();

        // Second send reuses the cached nonce; the handshake mock only
        // allows one hit.
        request.send().await.unwrap();
        request.send().await.unwrap();
    }

    #[tokio::test]
    async fn test_offline_without_wait_rejects_before_transport() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let hooks = Arc::new(HookRegistry::new());
        let offline_fired = Arc::new(AtomicUsize::new(0));
        hooks.add(
            names::AJAX_REQUEST_FAILED_ON_OFFLINE,
            counter(offline_fired.clone()),
        );

        let request = AjaxRequest::builder(server.uri())
            .unwrap()
            .hooks(hooks)
            .connectivity(Arc::new(ConnectivityMonitor::new(false)))
            .build()
            .unwrap();

        let err = request.send().await.unwrap_err();
        assert!(err.is_offline());
        assert_eq!(offline_fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_offline_wait_resumes_once() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
            .mount(&server)
            .await;

        let hooks = Arc::new(HookRegistry::new());
        let interrupted = Arc::new(AtomicUsize::new(0));
        let resumed = Arc::new(AtomicUsize::new(0));
        hooks.add(
            names::AJAX_REQUEST_IS_INTERRUPTED,
            counter(interrupted.clone()),
        );
        hooks.add(names::AJAX_REQUEST_RESUMED, counter(resumed.clone()));

        let monitor = Arc::new(ConnectivityMonitor::new(false));
        let request = Arc::new(
            AjaxRequest::builder(server.uri())
                .unwrap()
                .hooks(hooks)
                .payload(insecure_map())
                .connectivity(monitor.clone())
                .wait_for_network(Duration::from_secs(5))
                .offline_poll(Duration::from_millis(10))
                .build()
                .unwrap(),
        );

        let sender = request.clone();
        let handle = tokio::spawn(async move { sender.send().await });

        tokio::time::sleep(Duration::from_millis(30)).await;
        monitor.set_online(true);

        handle.await.unwrap().unwrap();
        assert_eq!(interrupted.load(Ordering::SeqCst), 1);
        assert_eq!(resumed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_offline_wait_bound_expires() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let request = AjaxRequest::builder(server.uri())
            .unwrap()
            .connectivity(Arc::new(ConnectivityMonitor::new(false)))
            .wait_for_network(Duration::from_millis(30))
            .offline_poll(Duration::from_millis(5))
            .build()
            .unwrap();

        let err = request.send().await.unwrap_err();
        assert!(err.is_offline());
    }

    #[tokio::test]
    async fn test_concurrent_sends_serialize() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"success": true}))
                    .set_delay(Duration::from_millis(100)),
            )
            .expect(2)
            .mount(&server)
            .await;

        let hooks = Arc::new(HookRegistry::new());
        let busy = Arc::new(AtomicUsize::new(0));
        hooks.add(names::AJAX_REQUEST_IS_BUSY, counter(busy.clone()));

        let request = Arc::new(
            AjaxRequest::builder(server.uri())
                .unwrap()
                .hooks(hooks)
                .payload(insecure_map())
                .build()
                .unwrap(),
        );

        let start = Instant::now();
        let a = {
            let r = request.clone();
            tokio::spawn(async move { r.send().await })
        };
        let b = {
            let r = request.clone();
            tokio::spawn(async move { r.send().await })
        };

        a.await.unwrap().unwrap();
        b.await.unwrap().unwrap();

        // Serialized: two 100ms responses cannot overlap.
        assert!(start.elapsed() >= Duration::from_millis(200));
        assert_eq!(busy.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_scoped_hooks_fire_with_suffix() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
            .mount(&server)
            .await;

        let hooks = Arc::new(HookRegistry::new());
        let scoped = Arc::new(AtomicUsize::new(0));
        hooks.add("ajaxRequestSucceeded_login", counter(scoped.clone()));

        let scopes = ScopeRegistry::new();
        let request = AjaxRequest::builder(server.uri())
            .unwrap()
            .hooks(hooks)
            .payload(insecure_map())
            .hooks_id("login", &scopes)
            .unwrap()
            .build()
            .unwrap();

        request.send().await.unwrap();
        assert_eq!(scoped.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_duplicate_hooks_id_fails_fast() {
        let scopes = ScopeRegistry::new();
        let _first = AjaxRequest::builder("https://example.com")
            .unwrap()
            .hooks_id("dup", &scopes)
            .unwrap()
            .build()
            .unwrap();

        let second = AjaxRequest::builder("https://example.com")
            .unwrap()
            .hooks_id("dup", &scopes);
        assert!(matches!(second, Err(Error::HooksId(_))));
    }

    #[tokio::test]
    async fn test_config_error_fires_no_hooks() {
        let hooks = Arc::new(HookRegistry::new());
        let completed = Arc::new(AtomicUsize::new(0));
        hooks.add(names::AJAX_REQUEST_COMPLETED, counter(completed.clone()));

        let request = AjaxRequest::builder("https://example.com")
            .unwrap()
            .hooks(hooks)
            .build()
            .unwrap();

        let mut bad_headers = HashMap::new();
        bad_headers.insert("bad header".to_string(), "x".to_string());
        let err = request
            .send_with(SendOptions::new().headers(bad_headers))
            .await
            .unwrap_err();

        assert!(err.is_config());
        assert_eq!(completed.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_invalid_model_classification() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(422).set_body_json(json!({"message": "invalid model"})),
            )
            .mount(&server)
            .await;

        let hooks = Arc::new(HookRegistry::new());
        let invalid = Arc::new(AtomicUsize::new(0));
        let completed = Arc::new(AtomicUsize::new(0));
        hooks.add(
            names::AJAX_REQUEST_FAILED_ON_INVALID_MODEL,
            counter(invalid.clone()),
        );
        hooks.add(names::AJAX_REQUEST_COMPLETED, counter(completed.clone()));

        let request = AjaxRequest::builder(server.uri())
            .unwrap()
            .hooks(hooks)
            .payload(insecure_map())
            .build()
            .unwrap();

        let err = request.send().await.unwrap_err();
        assert_eq!(err.status_code(), Some(422));
        assert_eq!(invalid.load(Ordering::SeqCst), 1);
        assert_eq!(completed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_from_meta_builds_with_nonce_overrides() {
        let meta = AjaxMeta {
            ajaxurl: "https://example.com/ajax".to_string(),
            nonce_endpoint: Some("https://example.com/nonce".to_string()),
            nonce_name: Some("form_nonce".to_string()),
        };

        let request = AjaxRequest::from_meta(&meta).unwrap().build().unwrap();
        assert_eq!(request.nonce_config.nonce_name, "form_nonce");
    }
}
