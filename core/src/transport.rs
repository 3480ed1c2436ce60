//! Blocking I/O behind the dispatcher.
//!
//! # Design
//! `Transport` is the only place the network is touched. `UreqTransport`
//! turns off ureq's status-code-as-error behavior so every response comes
//! back as data and the dispatcher alone decides what counts as failure.

use std::fmt;
use std::time::Duration;

use ureq::RequestBuilder;

use crate::error::DispatchError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Executes one request and returns the raw response.
///
/// Implementations must not retry and must not interpret the status code.
pub trait Transport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, DispatchError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, DispatchError> {
        (**self).execute(request)
    }
}

/// Synchronous transport backed by a `ureq::Agent`.
#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl fmt::Debug for UreqTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UreqTransport").finish_non_exhaustive()
    }
}

impl UreqTransport {
    /// `timeout` bounds the whole call: connect, send, and receive.
    pub fn new(timeout: Duration) -> Self {
        let agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, DispatchError> {
        let url = request.url.as_str();
        let headers = &request.headers;
        let payload = request.body.as_deref().map(str::as_bytes);

        let result = match (request.method, payload) {
            (HttpMethod::Get, None) => with_headers(self.agent.get(url), headers).call(),
            (HttpMethod::Get, Some(bytes)) => with_headers(self.agent.get(url), headers)
                .force_send_body()
                .send(bytes),
            (HttpMethod::Delete, None) => with_headers(self.agent.delete(url), headers).call(),
            (HttpMethod::Delete, Some(bytes)) => with_headers(self.agent.delete(url), headers)
                .force_send_body()
                .send(bytes),
            (HttpMethod::Post, Some(bytes)) => {
                with_headers(self.agent.post(url), headers).send(bytes)
            }
            (HttpMethod::Post, None) => with_headers(self.agent.post(url), headers).send_empty(),
            (HttpMethod::Put, Some(bytes)) => with_headers(self.agent.put(url), headers).send(bytes),
            (HttpMethod::Put, None) => with_headers(self.agent.put(url), headers).send_empty(),
        };

        let mut response = result.map_err(classify)?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        // No cap on the body; the timeout is the only bound.
        let body = response
            .body_mut()
            .with_config()
            .limit(u64::MAX)
            .read_to_string()
            .map_err(|e| DispatchError::Other {
                detail: e.to_string(),
            })?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

fn with_headers<B>(mut builder: RequestBuilder<B>, headers: &[(String, String)]) -> RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

/// Map a ureq failure onto the dispatcher's error variants.
fn classify(err: ureq::Error) -> DispatchError {
    match err {
        ureq::Error::Http(_) | ureq::Error::BadUri(_) => DispatchError::Other {
            detail: err.to_string(),
        },
        other => DispatchError::Network {
            detail: other.to_string(),
        },
    }
}
