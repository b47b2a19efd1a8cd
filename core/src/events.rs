//! Typed operations for the event resource.

use crate::client::Client;
use crate::context::Context;
use crate::error::Result;
use crate::types::Event;

/// Path that events are created under.
pub const EVENTS_PATH: &str = "/events";

impl Client {
    /// `GET {base}/{id}`.
    pub async fn get_event(&self, ctx: &Context, id: u64) -> Result<Event> {
        self.get(ctx, &format!("/{id}")).await
    }

    /// `POST {base}/events` with `event` as the body. Returns the event as
    /// stored by the server.
    pub async fn create_event(&self, ctx: &Context, event: &Event) -> Result<Event> {
        self.post(ctx, EVENTS_PATH, event).await
    }
}
