//! Domain DTOs for the event API.
//!
//! # Design
//! These types mirror the mock-server's schema but are defined independently,
//! so the client never depends on server internals. Integration tests catch
//! any schema drift between the two crates.

use serde::{Deserialize, Serialize};

/// An event as sent on create and returned on read and create.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Event {
    pub event_id: String,
    pub event_type: String,
}

impl Event {
    pub fn new(event_id: impl Into<String>, event_type: impl Into<String>) -> Self {
        Self {
            event_id: event_id.into(),
            event_type: event_type.into(),
        }
    }
}
