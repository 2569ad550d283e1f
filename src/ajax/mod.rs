// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Single-flight AJAX request layer
//!
//! One request instance serializes its sends, performs the nonce
//! handshake for secure payloads, tolerates transient network loss, and
//! broadcasts its lifecycle on the hook bus. The HTTP client behind it
//! is a pluggable strategy: promise-style fetch or callback-style XHR.

mod client;
mod connectivity;
mod fetch;
mod meta;
mod nonce;
mod request;
mod response;
mod transport;
mod xhr;

pub use client::{AjaxRequest, AjaxRequestBuilder, OfflineWait, SendOptions};
pub use connectivity::{Connectivity, ConnectivityMonitor};
pub use fetch::FetchTransport;
pub use meta::{AjaxMeta, AJAX_META_NAME};
pub use nonce::{fetch_nonce, NonceConfig, NonceRequest, NonceResponse, DEFAULT_NONCE_NAME};
pub use request::{
    FilePart, Method, MultipartPayload, Payload, RequestDescriptor, SECURE_FIELD,
};
pub use response::{AjaxResponse, Body};
pub use transport::Transport;
pub use xhr::{ProgressCallback, ReadyState, ReadyStateCallback, XhrTransport};
