//! Immutable client configuration.

use std::fmt;
use std::sync::Arc;

use reqwest::header::HeaderValue;
use url::Url;

use crate::error::{ApiError, Result};
use crate::transport::{ReqwestTransport, Transport};

/// Base URL, API key and transport shared by every call made through a
/// `Client`.
///
/// Nothing here changes after `build`. Cloning shares the transport.
#[derive(Clone)]
pub struct ClientConfig {
    base_url: String,
    key: String,
    transport: Arc<dyn Transport>,
}

impl ClientConfig {
    /// Configuration using the default `ReqwestTransport`.
    pub fn new(base_url: &str, key: &str) -> Result<Self> {
        Self::builder().base_url(base_url).key(key).build()
    }

    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("key", &"<redacted>")
            .finish_non_exhaustive()
    }
}

#[derive(Default)]
pub struct ClientConfigBuilder {
    base_url: Option<String>,
    key: Option<String>,
    transport: Option<Arc<dyn Transport>>,
}

impl ClientConfigBuilder {
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn transport(self, transport: impl Transport + 'static) -> Self {
        self.shared_transport(Arc::new(transport))
    }

    /// Reuse a transport (and its connection pool) that other
    /// configurations already hold.
    pub fn shared_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Validate and freeze the configuration.
    ///
    /// The base URL must be an absolute `http` or `https` URL; a trailing
    /// `/` is dropped. The key must be non-empty and usable as a header
    /// value.
    pub fn build(self) -> Result<ClientConfig> {
        let raw = self
            .base_url
            .ok_or_else(|| ApiError::InvalidConfig("base URL is required".to_string()))?;
        let parsed = Url::parse(&raw)
            .map_err(|e| ApiError::InvalidConfig(format!("invalid base URL {raw:?}: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ApiError::InvalidConfig(format!(
                "unsupported URL scheme {:?}",
                parsed.scheme()
            )));
        }

        let key = self
            .key
            .ok_or_else(|| ApiError::InvalidConfig("API key is required".to_string()))?;
        if key.is_empty() {
            return Err(ApiError::InvalidConfig("API key is empty".to_string()));
        }
        if HeaderValue::from_str(&key).is_err() {
            return Err(ApiError::InvalidConfig(
                "API key is not a valid header value".to_string(),
            ));
        }

        let transport = self
            .transport
            .unwrap_or_else(|| Arc::new(ReqwestTransport::default()));

        Ok(ClientConfig {
            base_url: raw.trim_end_matches('/').to_string(),
            key,
            transport,
        })
    }
}
