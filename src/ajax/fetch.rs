// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Promise-style transport with abort-on-timeout

use async_trait::async_trait;
use reqwest::Client;

use super::request::RequestDescriptor;
use super::response::{package, AjaxResponse};
use super::transport::{build_request, header_map, Transport};
use crate::error::{Error, Result};

/// Fetch-flavored transport strategy
///
/// Runs the whole request under a timer; when the timer wins the race the
/// in-flight request is dropped (aborted) and the result is a timeout
/// error. The underlying client carries no timeout of its own so the
/// descriptor is the single source of truth.
pub struct FetchTransport {
    client: Client,
}

impl FetchTransport {
    /// Create a fetch transport
    pub fn new() -> Result<Self> {
        let client = Client::builder().build()?;
        Ok(Self { client })
    }

    /// Create from an existing client (shared pools, proxies)
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for FetchTransport {
    fn name(&self) -> &'static str {
        "fetch"
    }

    async fn execute(&self, descriptor: &RequestDescriptor) -> Result<AjaxResponse> {
        descriptor.validate()?;

        tracing::debug!(
            method = descriptor.method.as_str(),
            url = %descriptor.url,
            transport = self.name(),
            "Executing request"
        );

        let builder = build_request(&self.client, descriptor)?;
        let flight = async {
            let response = builder.send().await?;
            let status = response.status().as_u16();
            let headers = header_map(response.headers());
            let bytes = response.bytes().await?;
            package(status, headers, &bytes)
        };

        match tokio::time::timeout(descriptor.timeout, flight).await {
            Ok(result) => result,
            // Dropping the future aborts the in-flight request.
            Err(_) => Err(Error::timeout_with_url(
                "transport",
                descriptor.timeout.as_millis() as u64,
                descriptor.url.as_str(),
            )),
        }
    }
}
