//! Generic JSON request executor for the event API.
//!
//! # Design
//! `Client` holds only an immutable `ClientConfig` and carries no mutable
//! state between calls. Every call goes through the same three steps:
//! `build_request` encodes the payload into an `HttpRequest`, the configured
//! `Transport` performs the round trip under the call's `Context`, and
//! `parse_response` accepts status 200 only and decodes the body. The first
//! and last steps never touch the network, so they can be tested on their
//! own.

use std::time::Instant;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::context::Context;
use crate::error::{ApiError, Result};
use crate::http::{HttpMethod, HttpRequest, HttpResponse, AUTH_HEADER, CONTENT_TYPE_JSON};

/// Stateless client for a JSON API authenticated with a `u21-key` header.
///
/// Cloning is cheap; clones share the configuration and transport, and may
/// be used from any number of tasks at once.
#[derive(Debug, Clone)]
pub struct Client {
    config: ClientConfig,
}

impl Client {
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Encode one call as an `HttpRequest`.
    ///
    /// `path` is appended to the base URL as is. Both the content type and
    /// the auth header are always set; a body is only attached when one is
    /// given.
    pub fn build_request<Req>(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<&Req>,
    ) -> Result<HttpRequest>
    where
        Req: Serialize + ?Sized,
    {
        let body = body
            .map(serde_json::to_string)
            .transpose()
            .map_err(ApiError::Serialization)?;
        Ok(HttpRequest {
            method,
            url: format!("{}{path}", self.config.base_url()),
            headers: vec![
                ("content-type".to_string(), CONTENT_TYPE_JSON.to_string()),
                (AUTH_HEADER.to_string(), self.config.key().to_string()),
            ],
            body,
        })
    }

    /// Decode a response. Anything but 200 is an error carrying the raw
    /// body.
    pub fn parse_response<Resp>(&self, response: HttpResponse) -> Result<Resp>
    where
        Resp: DeserializeOwned,
    {
        check_status(response.status, 200, &response.body)?;
        serde_json::from_str(&response.body).map_err(|source| ApiError::Deserialization {
            source,
            body: response.body,
        })
    }

    /// Perform one round trip: encode `body`, send it with `method` to
    /// `path`, decode the 200 response as `Resp`.
    ///
    /// Returns `Canceled` or `Timeout` as soon as `ctx` ends; the in-flight
    /// transport future is dropped at that point. A context that has
    /// already ended fails the call before anything is sent.
    pub async fn execute<Req, Resp>(
        &self,
        ctx: &Context,
        method: HttpMethod,
        path: &str,
        body: Option<&Req>,
    ) -> Result<Resp>
    where
        Req: Serialize + ?Sized,
        Resp: DeserializeOwned,
    {
        let request = self.build_request(method, path, body)?;
        let url = request.url.clone();
        debug!(%method, %url, "sending request");

        let started = Instant::now();
        let response = match ctx.run(self.config.transport().round_trip(request)).await {
            Ok(result) => result?,
            Err(reason) => {
                warn!(%method, %url, ?reason, "request abandoned");
                return Err(reason.into());
            }
        };
        debug!(
            %method,
            %url,
            status = response.status,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "response received"
        );

        self.parse_response(response)
    }

    pub async fn get<Resp>(&self, ctx: &Context, path: &str) -> Result<Resp>
    where
        Resp: DeserializeOwned,
    {
        self.execute::<(), Resp>(ctx, HttpMethod::Get, path, None).await
    }

    pub async fn post<Req, Resp>(&self, ctx: &Context, path: &str, body: &Req) -> Result<Resp>
    where
        Req: Serialize + ?Sized,
        Resp: DeserializeOwned,
    {
        self.execute(ctx, HttpMethod::Post, path, Some(body)).await
    }

    pub async fn put<Req, Resp>(&self, ctx: &Context, path: &str, body: &Req) -> Result<Resp>
    where
        Req: Serialize + ?Sized,
        Resp: DeserializeOwned,
    {
        self.execute(ctx, HttpMethod::Put, path, Some(body)).await
    }

    pub async fn patch<Req, Resp>(&self, ctx: &Context, path: &str, body: &Req) -> Result<Resp>
    where
        Req: Serialize + ?Sized,
        Resp: DeserializeOwned,
    {
        self.execute(ctx, HttpMethod::Patch, path, Some(body)).await
    }

    pub async fn delete<Resp>(&self, ctx: &Context, path: &str) -> Result<Resp>
    where
        Resp: DeserializeOwned,
    {
        self.execute::<(), Resp>(ctx, HttpMethod::Delete, path, None).await
    }
}

/// Map a status other than `expected` to `UnexpectedStatus`.
fn check_status(status: u16, expected: u16, body: &str) -> Result<()> {
    if status == expected {
        return Ok(());
    }
    warn!(status, "unexpected response status");
    Err(ApiError::UnexpectedStatus {
        status,
        body: body.to_string(),
    })
}
