// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! # Rapu - Client-Side Web Toolkit
//!
//! A pure Rust toolkit for client-side web plumbing: a single-flight
//! AJAX request layer with nonce protection, a priority-ordered hook
//! bus, a form submission pipeline, and a family of key-value storage
//! adapters.
//!
//! ## Features
//!
//! - Single-flight requests: concurrent sends on one instance serialize
//! - Nonce handshake: anti-forgery token fetched and cached per instance
//! - Offline tolerance: bounded wait for connectivity with resume hooks
//! - Dual transports: promise-style fetch or callback-style XHR behind
//!   one strategy trait
//! - Hook bus: priority-ordered pub/sub with panic isolation
//! - Form pipeline: validation, structured data maps, named callbacks
//! - Storage adapters: memory, file-persistent, cookie codec, and an
//!   async database
//!
//! ## Example
//!
//! ```rust,no_run
//! use rapu::{AjaxRequest, Payload};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut data = serde_json::Map::new();
//!     data.insert("action".to_string(), "save_profile".into());
//!
//!     let request = AjaxRequest::builder("https://example.com/ajax")?
//!         .payload(Payload::Map(data))
//!         .build()?;
//!
//!     let response = request.send().await?;
//!     println!("{}", response.text());
//!
//!     Ok(())
//! }
//! ```

pub mod ajax;
pub mod error;
pub mod form;
pub mod hooks;
pub mod storage;
pub mod util;

// Re-exports for convenience

// Request layer
pub use ajax::{
    AjaxMeta, AjaxRequest, AjaxRequestBuilder, AjaxResponse, Body, Connectivity,
    ConnectivityMonitor, FetchTransport, FilePart, Method, MultipartPayload, NonceConfig,
    NonceResponse, OfflineWait, Payload, ProgressCallback, ReadyState, ReadyStateCallback,
    RequestDescriptor, SendOptions, Transport, XhrTransport,
};

// Errors
pub use error::{Error, Result};

// Forms
pub use form::{CallbackRegistry, FieldValue, FormField, FormModel, FormPipeline, SubmitCallback};

// Hooks
pub use hooks::{HookCallback, HookRegistry, ScopeGuard, ScopeRegistry};

// Storage
pub use storage::{
    CookieStore, Database, KeyValueStore, LocalStore, MemoryStore, DEFAULT_DATABASE, OBJECT_STORE,
};

/// Rapu version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
