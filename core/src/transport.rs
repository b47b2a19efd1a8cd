//! The I/O seam between the client and the network.
//!
//! # Design
//! `Transport` performs exactly one round trip: send an `HttpRequest`, read
//! the whole response, hand it back as an `HttpResponse`. It never interprets
//! the status code. Implementations must be safe to share between concurrent
//! calls; connection pooling is their business, not the client's.
//!
//! Tests swap in a fake by putting it into a `ClientConfig`: any closure
//! `Fn(&HttpRequest) -> Result<HttpResponse, TransportError>` is a
//! transport, and `StaticTransport` answers every request the same way.

use std::fmt;

use async_trait::async_trait;

use crate::error::TransportError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Sends one request and returns the full response.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn round_trip(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

#[async_trait]
impl<F> Transport for F
where
    F: Fn(&HttpRequest) -> Result<HttpResponse, TransportError> + Send + Sync,
{
    async fn round_trip(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self(&request)
    }
}

/// Transport backed by a pooled `reqwest::Client`.
///
/// Cloning is cheap and clones share the pool.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use an existing client, e.g. one built with custom timeouts or TLS.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn round_trip(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut builder = self
            .client
            .request(to_reqwest_method(request.method), &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
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
        let bytes = response.bytes().await?;

        Ok(HttpResponse {
            status,
            headers,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        })
    }
}

fn to_reqwest_method(method: HttpMethod) -> reqwest::Method {
    match method {
        HttpMethod::Get => reqwest::Method::GET,
        HttpMethod::Post => reqwest::Method::POST,
        HttpMethod::Put => reqwest::Method::PUT,
        HttpMethod::Patch => reqwest::Method::PATCH,
        HttpMethod::Delete => reqwest::Method::DELETE,
        HttpMethod::Head => reqwest::Method::HEAD,
        HttpMethod::Options => reqwest::Method::OPTIONS,
    }
}

/// Answers every request with the same status and body.
#[derive(Clone, PartialEq, Eq)]
pub struct StaticTransport {
    status: u16,
    body: String,
}

impl StaticTransport {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

impl fmt::Debug for StaticTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticTransport")
            .field("status", &self.status)
            .field("body_len", &self.body.len())
            .finish()
    }
}

#[async_trait]
impl Transport for StaticTransport {
    async fn round_trip(&self, _request: HttpRequest) -> Result<HttpResponse, TransportError> {
        Ok(HttpResponse::new(self.status, self.body.clone()))
    }
}
