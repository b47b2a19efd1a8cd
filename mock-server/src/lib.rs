use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{info, warn};

/// Header every request must carry with the server's key.
pub const AUTH_HEADER: &str = "u21-key";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub event_id: String,
    pub event_type: String,
}

pub type Db = Arc<RwLock<HashMap<String, Event>>>;

#[derive(Clone)]
pub struct AppState {
    key: Arc<str>,
    db: Db,
}

pub fn app(key: &str) -> Router {
    let state = AppState {
        key: Arc::from(key),
        db: Arc::new(RwLock::new(HashMap::new())),
    };
    Router::new()
        .route("/events", post(create_event))
        .route("/{id}", get(get_event))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_key))
        .with_state(state)
}

pub async fn run(listener: TcpListener, key: &str) -> Result<(), std::io::Error> {
    axum::serve(listener, app(key)).await
}

async fn require_key(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let presented = request
        .headers()
        .get(AUTH_HEADER)
        .and_then(|v| v.to_str().ok());
    if presented != Some(&*state.key) {
        warn!(path = %request.uri().path(), "rejected request with missing or wrong key");
        return (StatusCode::UNAUTHORIZED, "invalid or missing u21-key").into_response();
    }
    next.run(request).await
}

async fn create_event(State(state): State<AppState>, Json(event): Json<Event>) -> Json<Event> {
    info!(event_id = %event.event_id, event_type = %event.event_type, "storing event");
    state
        .db
        .write()
        .await
        .insert(event.event_id.clone(), event.clone());
    Json(event)
}

async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Event>, (StatusCode, String)> {
    let events = state.db.read().await;
    events
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| (StatusCode::NOT_FOUND, format!("event {id} not found")))
}
