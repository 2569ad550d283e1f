// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Rapu command-line client
//!
//! A thin wrapper over the request layer for poking at AJAX endpoints
//! from a terminal.

use std::env;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{anyhow, Context};
use serde_json::Value;

use rapu::{AjaxRequest, FetchTransport, Method, Payload, Transport};

fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).with_target(false).init();
}

fn usage() {
    eprintln!("Rapu v{} - client-side web toolkit", rapu::VERSION);
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  rapu get <url>             Send a GET request");
    eprintln!("  rapu post <url> <json>     Send a POST request with a JSON body");
    eprintln!("  rapu nonce <url> [name]    Retrieve a nonce from an endpoint");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  RUST_LOG                   Log filter (default: info)");
    eprintln!("  RAPU_TIMEOUT_SECS          Request timeout in seconds (default: 30)");
}

fn timeout_from_env() -> Duration {
    env::var("RAPU_TIMEOUT_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
        .map(Duration::from_secs)
        .unwrap_or(Duration::from_secs(30))
}

async fn run_request(url: &str, method: Method, payload: Payload) -> anyhow::Result<()> {
    let request = AjaxRequest::builder(url)
        .with_context(|| format!("invalid url: {}", url))?
        .method(method)
        .payload(payload)
        .timeout(timeout_from_env())
        .build()?;

    let response = request.send().await?;

    match response.json() {
        Some(value) => println!("{}", serde_json::to_string_pretty(value)?),
        None => println!("{}", response.text()),
    }
    Ok(())
}

async fn run_nonce(url: &str, nonce_name: &str) -> anyhow::Result<()> {
    let endpoint = url::Url::parse(url).with_context(|| format!("invalid url: {}", url))?;
    let transport = FetchTransport::new()?;
    let nonce = rapu::ajax::fetch_nonce(
        &transport as &dyn Transport,
        &endpoint,
        nonce_name,
        timeout_from_env(),
    )
    .await?;
    println!("{}", nonce);
    Ok(())
}

async fn dispatch(args: &[String]) -> anyhow::Result<()> {
    match args[0].as_str() {
        "get" => {
            let url = args.get(1).ok_or_else(|| anyhow!("get requires a url"))?;
            run_request(url, Method::Get, Payload::None).await
        }
        "post" => {
            let url = args.get(1).ok_or_else(|| anyhow!("post requires a url"))?;
            let body = args.get(2).map(String::as_str).unwrap_or("{}");
            let value: Value = serde_json::from_str(body).context("body is not valid JSON")?;
            let map = value
                .as_object()
                .cloned()
                .ok_or_else(|| anyhow!("body must be a JSON object"))?;
            run_request(url, Method::Post, Payload::Map(map)).await
        }
        "nonce" => {
            let url = args.get(1).ok_or_else(|| anyhow!("nonce requires a url"))?;
            let name = args.get(2).map(String::as_str).unwrap_or("nonce");
            run_nonce(url, name).await
        }
        other => Err(anyhow!("unknown command: {}", other)),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();

    let args: Vec<String> = env::args().skip(1).collect();
    if args.is_empty() || args[0] == "--help" || args[0] == "-h" {
        usage();
        return ExitCode::SUCCESS;
    }

    match dispatch(&args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
