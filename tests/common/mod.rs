//! Shared test utilities and mock infrastructure.

#![allow(dead_code, unused_imports)]

pub mod mock_backend;

use savemedha_gateway::config::ApiConfig;
use savemedha_gateway::gateway::GatewayClient;
use savemedha_gateway::session::SessionStore;
use savemedha_gateway::storage::{MemoryStorage, TOKEN_KEY, USER_KEY};
use std::future::Future;
use std::net::TcpListener;
use std::sync::Arc;
use std::time::Duration;

use mock_backend::MockBackend;

/// Find an available port for testing.
pub fn free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind to free port");
    listener.local_addr().unwrap().port()
}

pub fn api_config(base_url: &str) -> ApiConfig {
    ApiConfig {
        base_url: base_url.to_string(),
        timeout_ms: 5_000,
        connect_timeout_ms: 1_000,
        ..ApiConfig::default()
    }
}

/// Gateway pointed at the mock, with no session accessor registered.
pub fn bare_gateway(mock: &MockBackend) -> GatewayClient {
    GatewayClient::new(api_config(&mock.base_url())).expect("Failed to build gateway")
}

/// Gateway + session store sharing `storage`, wired the way the app does at startup.
pub fn wired(mock: &MockBackend, storage: Arc<MemoryStorage>) -> (GatewayClient, SessionStore) {
    let gateway = bare_gateway(mock);
    let session = SessionStore::open(storage);
    gateway
        .configure(Arc::new(session.clone()))
        .expect("Failed to configure gateway");
    (gateway, session)
}

/// Storage left behind by an earlier successful login.
pub fn logged_in_storage(token: &str) -> Arc<MemoryStorage> {
    Arc::new(MemoryStorage::with_entries([
        (TOKEN_KEY, token),
        (USER_KEY, r#"{"id":1,"name":"Admin User","role":"admin"}"#),
    ]))
}

/// Poll `check` until it holds or `timeout` elapses.
pub async fn wait_until<F, Fut>(timeout: Duration, mut check: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let start = std::time::Instant::now();
    while start.elapsed() < timeout {
        if check().await {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    false
}
