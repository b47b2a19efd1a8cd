//! Client core for the event API.
//!
//! # Overview
//! One generic request executor, `Client::execute`, performs every call:
//! serialize an optional payload to JSON, send it with
//! `Content-Type: application/json` and the `u21-key` auth header, accept
//! status 200 only, and decode a typed JSON response. `get_event` and
//! `create_event` are thin typed wrappers over it.
//!
//! # Design
//! - `ClientConfig` is immutable: base URL, key and a shared `Transport`.
//! - Request building and response parsing are pure; only the `Transport`
//!   does I/O, so tests inject a fake transport instead of a network.
//! - Each call is bound to a `Context`. Cancellation or an elapsed deadline
//!   ends the call promptly and drops the in-flight round trip.
//! - No retries. Every failure is returned as an `ApiError` value.

pub mod client;
pub mod config;
pub mod context;
pub mod error;
pub mod events;
pub mod http;
pub mod transport;
pub mod types;

pub use client::Client;
pub use config::{ClientConfig, ClientConfigBuilder};
pub use context::{CancelHandle, Context, ContextError};
pub use error::{ApiError, Result, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use transport::{ReqwestTransport, StaticTransport, Transport};
pub use types::Event;
