//! HTTP adapter for the remote authority.
//!
//! # Responsibility
//! - POST each operation as JSON to `{base_url}/{operation}`.
//! - Fold timeouts, connection failures, non-2xx statuses, non-JSON bodies
//!   and `ok != true` envelopes into `RemoteOutcome::Unavailable`.
//!
//! # Invariants
//! - Every call is bounded by the configured timeout.

use super::capability::{OfflineRemote, RemoteCapability, RemoteOutcome, RemoteRequest};
use crate::config::RemoteConfig;
use log::{debug, warn};
use reqwest::blocking::Client;
use serde_json::Value;
use std::time::{Duration, Instant};

/// Blocking HTTP remote.
#[derive(Debug, Clone)]
pub struct HttpRemote {
    client: Client,
    base_url: String,
}

impl HttpRemote {
    /// Builds a client with a per-request timeout.
    ///
    /// # Errors
    /// - Returns the underlying builder error when the TLS backend cannot be
    ///   initialized.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

impl RemoteCapability for HttpRemote {
    fn call(&self, request: &RemoteRequest) -> RemoteOutcome {
        let started_at = Instant::now();
        let url = format!("{}/{}", self.base_url, request.operation.as_str());

        let response = match self.client.post(url).json(&request.payload).send() {
            Ok(response) => response,
            Err(err) if err.is_timeout() => {
                return unavailable(request, "timeout", started_at);
            }
            Err(_) => return unavailable(request, "transport", started_at),
        };
        if !response.status().is_success() {
            let reason = format!("status_{}", response.status().as_u16());
            return unavailable(request, &reason, started_at);
        }
        let body: Value = match response.json() {
            Ok(body) => body,
            Err(_) => return unavailable(request, "non_json_body", started_at),
        };
        if body.get("ok").and_then(Value::as_bool) != Some(true) {
            return unavailable(request, "not_ok", started_at);
        }

        debug!(
            "event=remote_call module=remote status=ok operation={} duration_ms={}",
            request.operation.as_str(),
            started_at.elapsed().as_millis()
        );
        RemoteOutcome::Ok(body)
    }
}

fn unavailable(request: &RemoteRequest, reason: &str, started_at: Instant) -> RemoteOutcome {
    warn!(
        "event=remote_call module=remote status=unavailable operation={} reason={} duration_ms={}",
        request.operation.as_str(),
        reason,
        started_at.elapsed().as_millis()
    );
    RemoteOutcome::Unavailable
}

/// Builds the remote selected by configuration.
///
/// Without a base URL, or when the HTTP client cannot be built, the offline
/// remote is returned so every operation takes the local path.
pub fn remote_from_config(config: &RemoteConfig) -> Box<dyn RemoteCapability + Send + Sync> {
    let Some(base_url) = config.base_url.as_deref() else {
        return Box::new(OfflineRemote);
    };
    match HttpRemote::new(base_url, config.timeout()) {
        Ok(remote) => Box::new(remote),
        Err(err) => {
            warn!(
                "event=remote_setup module=remote status=error fallback=offline error={}",
                err
            );
            Box::new(OfflineRemote)
        }
    }
}
