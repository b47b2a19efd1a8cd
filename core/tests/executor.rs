//! Executor behavior against fake transports.
//!
//! # Design
//! Every test injects its transport straight into a `ClientConfig`; nothing
//! here opens a socket. Slow transports are async sleeps so the tests can
//! observe cancellation and deadlines without real network latency.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use event_core::{
    ApiError, Client, ClientConfig, Context, Event, HttpMethod, HttpRequest, HttpResponse,
    StaticTransport, Transport, TransportError,
};

const GOOD_BODY: &str = r#"{"event_id":"abc","event_type":"BOOM"}"#;

fn client_with(transport: impl Transport + 'static) -> Client {
    let config = ClientConfig::builder()
        .base_url("http://events.test")
        .key("bench-key")
        .transport(transport)
        .build()
        .unwrap();
    Client::new(config)
}

fn boom() -> Event {
    Event::new("abc", "BOOM")
}

/// Sleeps before answering, and records whether the round trip ran to the
/// end or was dropped part way.
struct SlowTransport {
    delay: Duration,
    started: Arc<AtomicBool>,
    finished: Arc<AtomicBool>,
}

impl SlowTransport {
    fn new(delay: Duration) -> Self {
        Self {
            delay,
            started: Arc::new(AtomicBool::new(false)),
            finished: Arc::new(AtomicBool::new(false)),
        }
    }
}

#[async_trait]
impl Transport for SlowTransport {
    async fn round_trip(&self, _request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.started.store(true, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.finished.store(true, Ordering::SeqCst);
        Ok(HttpResponse::new(200, GOOD_BODY))
    }
}

#[tokio::test]
async fn get_event_with_canned_200() {
    let client = client_with(StaticTransport::new(200, GOOD_BODY));
    let event = client.get_event(&Context::background(), 1000).await.unwrap();
    assert_eq!(event, boom());
}

#[tokio::test]
async fn create_event_against_404_is_unexpected_status() {
    let client = client_with(StaticTransport::new(404, "page not found"));
    let err = client
        .create_event(&Context::background(), &boom())
        .await
        .unwrap_err();
    match err {
        ApiError::UnexpectedStatus { status, body } => {
            assert_eq!(status, 404);
            assert_eq!(body, "page not found");
        }
        other => panic!("expected UnexpectedStatus, got {other:?}"),
    }
}

#[tokio::test]
async fn any_non_200_is_rejected_whatever_the_body() {
    for status in [100, 201, 204, 301, 400, 401, 429, 500, 503] {
        let client = client_with(StaticTransport::new(status, GOOD_BODY));
        let err = client
            .get_event(&Context::background(), 1)
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(status), "status {status}");
        assert!(
            matches!(&err, ApiError::UnexpectedStatus { body, .. } if body == GOOD_BODY),
            "status {status}: {err:?}"
        );
    }
}

#[tokio::test]
async fn malformed_200_body_is_deserialization_error() {
    for body in ["", "{", "[]", r#"{"event_id":"abc"}"#, r#"{"event_id":1,"event_type":"x"}"#] {
        let client = client_with(StaticTransport::new(200, body));
        let err = client
            .get_event(&Context::background(), 1)
            .await
            .unwrap_err();
        assert!(
            matches!(err, ApiError::Deserialization { .. }),
            "body {body:?}: {err:?}"
        );
    }
}

#[tokio::test]
async fn transport_failure_is_returned_as_is() {
    let client = client_with(|_: &HttpRequest| -> Result<HttpResponse, TransportError> {
        Err(TransportError::new("connection refused"))
    });
    let err = client
        .get_event(&Context::background(), 1)
        .await
        .unwrap_err();
    match err {
        ApiError::Transport(inner) => assert_eq!(inner.message(), "connection refused"),
        other => panic!("expected Transport, got {other:?}"),
    }
}

#[tokio::test]
async fn serialization_failure_never_reaches_transport() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let client = client_with(move |_: &HttpRequest| -> Result<HttpResponse, TransportError> {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(HttpResponse::new(200, "{}"))
    });

    let mut payload = std::collections::BTreeMap::new();
    payload.insert((1, 2), "non-string key");
    let err = client
        .post::<_, serde_json::Value>(&Context::background(), "/events", &payload)
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Serialization(_)));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn generic_execute_decodes_any_shape() {
    let client = client_with(StaticTransport::new(200, r#"{"ok":true,"count":3}"#));
    let value: serde_json::Value = client
        .execute(
            &Context::background(),
            HttpMethod::Put,
            "/events/abc",
            Some(&boom()),
        )
        .await
        .unwrap();
    assert_eq!(value, serde_json::json!({"ok": true, "count": 3}));
}

#[tokio::test]
async fn cancel_before_response_returns_canceled_promptly() {
    let transport = SlowTransport::new(Duration::from_secs(30));
    let started = Arc::clone(&transport.started);
    let finished = Arc::clone(&transport.finished);
    let client = client_with(transport);

    let (ctx, handle) = Context::with_cancel();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        handle.cancel();
    });

    let begun = Instant::now();
    let err = client.get_event(&ctx, 1000).await.unwrap_err();
    assert!(matches!(err, ApiError::Canceled), "{err:?}");
    assert!(begun.elapsed() < Duration::from_secs(5));
    assert!(started.load(Ordering::SeqCst));
    assert!(!finished.load(Ordering::SeqCst));
}

#[tokio::test]
async fn deadline_before_response_returns_timeout() {
    let transport = SlowTransport::new(Duration::from_secs(30));
    let finished = Arc::clone(&transport.finished);
    let client = client_with(transport);

    let ctx = Context::with_timeout(Duration::from_millis(20));
    let begun = Instant::now();
    let err = client.get_event(&ctx, 1000).await.unwrap_err();
    assert!(matches!(err, ApiError::Timeout), "{err:?}");
    assert!(begun.elapsed() < Duration::from_secs(5));
    assert!(!finished.load(Ordering::SeqCst));
}

#[tokio::test]
async fn ended_context_skips_the_transport() {
    let transport = SlowTransport::new(Duration::from_millis(1));
    let started = Arc::clone(&transport.started);
    let client = client_with(transport);

    let (ctx, handle) = Context::with_cancel();
    handle.cancel();
    let err = client.get_event(&ctx, 1).await.unwrap_err();
    assert!(matches!(err, ApiError::Canceled));

    let expired = Context::with_deadline(Instant::now());
    let err = client.get_event(&expired, 1).await.unwrap_err();
    assert!(matches!(err, ApiError::Timeout));

    assert!(!started.load(Ordering::SeqCst));
}

#[tokio::test]
async fn fast_transport_beats_generous_deadline() {
    let client = client_with(SlowTransport::new(Duration::from_millis(5)));
    let ctx = Context::with_timeout(Duration::from_secs(10));
    let event = client.get_event(&ctx, 1000).await.unwrap();
    assert_eq!(event, boom());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_calls_share_one_client() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let client = client_with(move |req: &HttpRequest| -> Result<HttpResponse, TransportError> {
        counter.fetch_add(1, Ordering::SeqCst);
        // Echo the id from the path back as the event id.
        let id = req.url.rsplit('/').next().unwrap_or_default();
        Ok(HttpResponse::new(
            200,
            format!(r#"{{"event_id":"{id}","event_type":"BOOM"}}"#),
        ))
    });

    let mut tasks = Vec::new();
    for id in 0..64u64 {
        let client = client.clone();
        tasks.push(tokio::spawn(async move {
            client.get_event(&Context::background(), id).await
        }));
    }
    for (id, task) in tasks.into_iter().enumerate() {
        let event = task.await.unwrap().unwrap();
        assert_eq!(event.event_id, id.to_string());
    }
    assert_eq!(calls.load(Ordering::SeqCst), 64);
}
