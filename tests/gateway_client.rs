//! Gateway client behavior against a mock backend: credentials, busy
//! tracking, forced logout, timeouts.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::mock_backend::{MockBackend, MockResponse};
use parking_lot::Mutex;
use savemedha_gateway::gateway::{
    ApiMethod, GatewayClient, GatewayError, GatewayEvent, Interceptor, Outcome, OutgoingRequest,
    RequestBody, RequestOptions, Settlement,
};
use savemedha_gateway::session::SessionStore;
use savemedha_gateway::storage::{MemoryStorage, TOKEN_KEY, USER_KEY};
use serde_json::json;
use tokio::sync::broadcast::error::TryRecvError;

#[tokio::test]
async fn test_attaches_bearer_token() {
    let mock = MockBackend::start().await;
    let (gateway, _session) = common::wired(&mock, common::logged_in_storage("abc"));

    gateway.get("/blogs").await.unwrap();

    let requests = mock.captured_requests().await;
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].path, "/blogs");
    assert_eq!(requests[0].header("authorization"), Some("Bearer abc"));
}

#[tokio::test]
async fn test_no_token_no_authorization_header() {
    let mock = MockBackend::start().await;
    let (gateway, _session) = common::wired(&mock, Arc::new(MemoryStorage::new()));

    gateway.get("/services").await.unwrap();

    let requests = mock.captured_requests().await;
    assert_eq!(requests[0].header("authorization"), None);
}

#[tokio::test]
async fn test_unconfigured_client_degrades_silently() {
    let mock = MockBackend::start().await;
    mock.enqueue_response(MockResponse::error(401, "Unauthorized")).await;
    let gateway = common::bare_gateway(&mock);
    let mut events = gateway.subscribe();

    let err = gateway.get("/blogs").await.unwrap_err();

    assert!(err.is_auth_failure());
    assert!(!gateway.is_configured());
    assert_eq!(mock.captured_requests().await[0].header("authorization"), None);
    assert!(matches!(events.try_recv(), Err(TryRecvError::Empty)));
    assert_eq!(gateway.busy().pending(), 0);
}

#[tokio::test]
async fn test_configure_twice_is_rejected() {
    let mock = MockBackend::start().await;
    let (gateway, _session) = common::wired(&mock, common::logged_in_storage("first"));

    let other = SessionStore::open(common::logged_in_storage("second"));
    assert!(matches!(
        gateway.configure(Arc::new(other)),
        Err(GatewayError::AlreadyConfigured)
    ));

    gateway.get("/blogs").await.unwrap();
    let requests = mock.captured_requests().await;
    assert_eq!(requests[0].header("authorization"), Some("Bearer first"));
}

#[tokio::test]
async fn test_success_returns_parsed_body() {
    let mock = MockBackend::start().await;
    mock.enqueue_response(MockResponse::json(r#"[{"id": 1, "title": "Sleep hygiene"}]"#))
        .await;
    let gateway = common::bare_gateway(&mock);

    let body = gateway.get("/blogs").await.unwrap();
    assert_eq!(body, json!([{"id": 1, "title": "Sleep hygiene"}]));
}

#[tokio::test]
async fn test_empty_success_body_is_null() {
    let mock = MockBackend::start().await;
    mock.enqueue_response(MockResponse::empty(204)).await;
    let gateway = common::bare_gateway(&mock);

    let body = gateway.delete("/jobs/7").await.unwrap();
    assert!(body.is_null());
    let requests = mock.captured_requests().await;
    assert_eq!(requests[0].method, "DELETE");
    assert_eq!(requests[0].path, "/jobs/7");
}

#[tokio::test]
async fn test_json_body_and_extra_headers() {
    let mock = MockBackend::start().await;
    let gateway = common::bare_gateway(&mock);

    gateway
        .request(
            ApiMethod::Patch,
            "/callbacks/3",
            Some(RequestBody::Json(json!({"status": "called"}))),
            RequestOptions::default().with_header("x-client", "admin"),
        )
        .await
        .unwrap();

    let request = &mock.captured_requests().await[0];
    assert_eq!(request.method, "PATCH");
    assert_eq!(request.header("content-type"), Some("application/json"));
    assert_eq!(request.header("x-client"), Some("admin"));
    assert_eq!(request.json(), json!({"status": "called"}));
}

#[tokio::test]
async fn test_multipart_body() {
    let mock = MockBackend::start().await;
    let gateway = common::bare_gateway(&mock);

    let form = reqwest::multipart::Form::new()
        .text("title", "Mindfulness 101")
        .part(
            "file",
            reqwest::multipart::Part::bytes(b"%PDF-1.4".to_vec()).file_name("guide.pdf"),
        );
    gateway
        .post("/ebooks", RequestBody::Multipart(form))
        .await
        .unwrap();

    let request = &mock.captured_requests().await[0];
    let content_type = request.header("content-type").unwrap();
    assert!(content_type.starts_with("multipart/form-data; boundary="));
    assert!(String::from_utf8_lossy(&request.body).contains("Mindfulness 101"));
}

#[tokio::test]
async fn test_api_error_carries_status_and_message() {
    let mock = MockBackend::start().await;
    mock.enqueue_response(MockResponse::error(422, "Title is required"))
        .await;
    let storage = common::logged_in_storage("abc");
    let (gateway, session) = common::wired(&mock, storage.clone());

    let err = gateway
        .post("/blogs", RequestBody::Json(json!({})))
        .await
        .unwrap_err();

    assert!(matches!(err, GatewayError::Api { status: 422, .. }));
    assert_eq!(err.server_message(), Some("Title is required"));
    // other 4xx leave the session alone
    assert!(session.is_authenticated());
    assert!(storage.contains(TOKEN_KEY));
}

#[tokio::test]
async fn test_unauthorized_forces_logout() {
    let mock = MockBackend::start().await;
    mock.enqueue_response(MockResponse::error(401, "jwt expired")).await;
    let storage = common::logged_in_storage("stale");
    let (gateway, session) = common::wired(&mock, storage.clone());
    let mut events = gateway.subscribe();

    let err = gateway.get("/users").await.unwrap_err();

    assert!(matches!(err, GatewayError::Auth { status: 401, .. }));
    assert_eq!(err.server_message(), Some("jwt expired"));
    // session effect is visible as soon as the caller sees the error
    assert!(!session.is_authenticated());
    assert!(!storage.contains(TOKEN_KEY));
    assert!(!storage.contains(USER_KEY));
    assert_eq!(
        events.try_recv().unwrap(),
        GatewayEvent::SessionInvalidated {
            status: 401,
            path: "/users".to_string(),
        }
    );

    // the next request goes out without credentials
    gateway.get("/users").await.unwrap();
    let requests = mock.captured_requests().await;
    assert_eq!(requests[1].header("authorization"), None);
}

#[tokio::test]
async fn test_forbidden_forces_logout() {
    let mock = MockBackend::start().await;
    mock.enqueue_response(MockResponse::error(403, "Forbidden")).await;
    let (gateway, session) = common::wired(&mock, common::logged_in_storage("abc"));

    let err = gateway.get("/users").await.unwrap_err();

    assert!(err.is_auth_failure());
    assert!(!session.is_authenticated());
}

#[tokio::test]
async fn test_concurrent_unauthorized_invalidate_once() {
    let mock = MockBackend::start().await;
    mock.enqueue_response(MockResponse::error(401, "expired").with_delay(30))
        .await;
    mock.enqueue_response(MockResponse::error(401, "expired").with_delay(30))
        .await;
    let (gateway, session) = common::wired(&mock, common::logged_in_storage("abc"));
    let mut events = gateway.subscribe();

    let a = tokio::spawn({
        let gateway = gateway.clone();
        async move { gateway.get("/blogs").await }
    });
    let b = tokio::spawn({
        let gateway = gateway.clone();
        async move { gateway.get("/services").await }
    });

    assert!(a.await.unwrap().unwrap_err().is_auth_failure());
    assert!(b.await.unwrap().unwrap_err().is_auth_failure());

    assert!(!session.is_authenticated());
    assert!(matches!(
        events.try_recv(),
        Ok(GatewayEvent::SessionInvalidated { status: 401, .. })
    ));
    assert!(matches!(events.try_recv(), Err(TryRecvError::Empty)));
    assert_eq!(gateway.busy().pending(), 0);
}

#[tokio::test]
async fn test_counter_balances_across_mixed_outcomes() {
    let mock = MockBackend::start().await;
    let statuses = [200, 500, 404, 200, 422, 200, 503, 200, 400, 200];
    for (i, status) in statuses.iter().enumerate() {
        let delay = ((i * 7) % 5) as u64 * 10;
        mock.enqueue_response(MockResponse::json_status(*status, "{}").with_delay(delay))
            .await;
    }
    let gateway = common::bare_gateway(&mock);
    let busy = gateway.busy();

    let handles: Vec<_> = (0..statuses.len())
        .map(|i| {
            let gateway = gateway.clone();
            tokio::spawn(async move { gateway.get(&format!("/blogs/{}", i)).await })
        })
        .collect();

    let mut failures = 0;
    for handle in handles {
        if handle.await.unwrap().is_err() {
            failures += 1;
        }
    }

    assert_eq!(failures, 5);
    assert_eq!(busy.pending(), 0);
    assert!(!busy.is_busy());
    assert!(busy.transitions() >= 2);
    assert_eq!(busy.transitions() % 2, 0);
}

#[tokio::test]
async fn test_busy_flag_is_edge_triggered() {
    let mock = MockBackend::start().await;
    mock.enqueue_response(MockResponse::default().with_delay(400)).await;
    mock.enqueue_response(MockResponse::default().with_delay(20)).await;
    let gateway = common::bare_gateway(&mock);
    let busy = gateway.busy();
    assert!(!busy.is_busy());
    let backend = &mock;

    let slow = tokio::spawn({
        let gateway = gateway.clone();
        async move { gateway.get("/slow").await }
    });
    assert!(common::wait_until(Duration::from_secs(2), move || async move {
        backend.captured_requests().await.len() == 1
    })
    .await);
    assert!(busy.is_busy());
    assert_eq!(busy.transitions(), 1);

    let fast = tokio::spawn({
        let gateway = gateway.clone();
        async move { gateway.get("/fast").await }
    });
    assert!(common::wait_until(Duration::from_secs(2), move || async move {
        backend.captured_requests().await.len() == 2
    })
    .await);
    assert_eq!(busy.pending(), 2);

    fast.await.unwrap().unwrap();
    // B finished while A is still out: no flicker
    assert!(busy.is_busy());
    assert_eq!(busy.pending(), 1);
    assert_eq!(busy.transitions(), 1);

    slow.await.unwrap().unwrap();
    assert!(!busy.is_busy());
    assert_eq!(busy.pending(), 0);
    assert_eq!(busy.transitions(), 2);
}

#[tokio::test]
async fn test_timeout_decrements_counter() {
    let mock = MockBackend::start().await;
    mock.enqueue_response(MockResponse::default().with_delay(5_000)).await;
    let gateway = common::bare_gateway(&mock);
    let busy = gateway.busy();

    let err = gateway
        .request(
            ApiMethod::Get,
            "/never",
            None,
            RequestOptions::default().with_timeout_ms(1),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, GatewayError::Timeout { timeout_ms: 1 }));
    assert_eq!(busy.pending(), 0);
    assert!(!busy.is_busy());
}

#[tokio::test]
async fn test_dropped_request_decrements_counter() {
    let mock = MockBackend::start().await;
    mock.enqueue_response(MockResponse::default().with_delay(5_000)).await;
    let gateway = common::bare_gateway(&mock);
    let busy = gateway.busy();

    let outer = tokio::time::timeout(Duration::from_millis(100), gateway.get("/hang")).await;

    assert!(outer.is_err());
    assert_eq!(busy.pending(), 0);
    assert!(!busy.is_busy());
}

#[tokio::test]
async fn test_connection_refused() {
    let port = common::free_port();
    let gateway =
        GatewayClient::new(common::api_config(&format!("http://127.0.0.1:{}", port))).unwrap();

    let err = gateway.get("/blogs").await.unwrap_err();

    assert!(matches!(err, GatewayError::Connection { .. }));
    assert_eq!(err.user_message("Failed to load blogs"), "Failed to load blogs");
    assert_eq!(gateway.busy().pending(), 0);
}

struct Recorder {
    seen: Mutex<Vec<String>>,
}

impl Interceptor for Recorder {
    fn name(&self) -> &'static str {
        "recorder"
    }

    fn before_send(&self, request: &mut OutgoingRequest) {
        let auth = request
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("-")
            .to_string();
        self.seen.lock().push(format!("send {} {}", request.path, auth));
    }

    fn after_settle(&self, settlement: &Settlement) {
        self.seen
            .lock()
            .push(format!("settle {:?}", settlement.outcome));
    }
}

#[tokio::test]
async fn test_extra_interceptor_runs_inside_session_stage() {
    let mock = MockBackend::start().await;
    mock.enqueue_response(MockResponse::error(500, "boom")).await;
    let recorder = Arc::new(Recorder {
        seen: Mutex::new(Vec::new()),
    });
    let gateway = GatewayClient::builder(common::api_config(&mock.base_url()))
        .interceptor(recorder.clone())
        .build()
        .unwrap();
    let session = SessionStore::open(common::logged_in_storage("abc"));
    gateway.configure(Arc::new(session)).unwrap();

    assert_eq!(gateway.interceptor_names(), vec!["session", "busy", "recorder"]);
    let _ = gateway.get("/blogs").await;

    assert_eq!(
        *recorder.seen.lock(),
        vec![
            "send /blogs Bearer abc".to_string(),
            format!("settle {:?}", Outcome::Response { status: 500 }),
        ]
    );
}
