use std::sync::{Arc, OnceLock};
use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::broadcast;
use tokio::time::timeout;

use crate::config::ApiConfig;
use crate::gateway::busy::{BusyInterceptor, BusyTracker};
use crate::gateway::error::{extract_message, GatewayError};
use crate::gateway::events::{EventBus, GatewayEvent};
use crate::gateway::pipeline::{Interceptor, Outcome, Pipeline};
use crate::gateway::request::{ApiMethod, OutgoingRequest, RequestBody, RequestOptions};
use crate::gateway::session::{AccessorSlot, SessionAccessor, SessionInterceptor};

/// Single chokepoint for backend calls.
///
/// Cheap to clone; clones share the HTTP pool, busy tracker, event bus
/// and session accessor.
#[derive(Clone)]
pub struct GatewayClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http: Client,
    config: ApiConfig,
    accessor: AccessorSlot,
    pipeline: Pipeline,
    busy: BusyTracker,
    events: EventBus,
}

pub struct GatewayClientBuilder {
    config: ApiConfig,
    extra: Vec<Arc<dyn Interceptor>>,
}

impl GatewayClientBuilder {
    /// Append an interceptor. Extra interceptors sit inside the built-in
    /// session and busy stages.
    pub fn interceptor(mut self, interceptor: Arc<dyn Interceptor>) -> Self {
        self.extra.push(interceptor);
        self
    }

    pub fn build(self) -> Result<GatewayClient, GatewayError> {
        let http = Client::builder()
            .connect_timeout(Duration::from_millis(self.config.connect_timeout_ms))
            .build()
            .map_err(|e| GatewayError::InvalidRequest(format!("Failed to build HTTP client: {}", e)))?;

        let accessor: AccessorSlot = Arc::new(OnceLock::new());
        let busy = BusyTracker::new();
        let events = EventBus::new();

        // credentials before the counter on the way out,
        // counter before auth handling on the way back
        let mut pipeline = Pipeline::new();
        pipeline.push(Arc::new(SessionInterceptor::new(
            accessor.clone(),
            events.clone(),
        )));
        pipeline.push(Arc::new(BusyInterceptor::new(busy.clone())));
        for interceptor in self.extra {
            pipeline.push(interceptor);
        }

        Ok(GatewayClient {
            inner: Arc::new(ClientInner {
                http,
                config: self.config,
                accessor,
                pipeline,
                busy,
                events,
            }),
        })
    }
}

impl GatewayClient {
    pub fn builder(config: ApiConfig) -> GatewayClientBuilder {
        GatewayClientBuilder {
            config,
            extra: Vec::new(),
        }
    }

    pub fn new(config: ApiConfig) -> Result<Self, GatewayError> {
        Self::builder(config).build()
    }

    /// Register the session accessor. Only the first call takes effect.
    pub fn configure(&self, accessor: Arc<dyn SessionAccessor>) -> Result<(), GatewayError> {
        self.inner.accessor.set(accessor).map_err(|_| {
            tracing::warn!("Gateway client configured twice, keeping the first session accessor");
            GatewayError::AlreadyConfigured
        })
    }

    pub fn is_configured(&self) -> bool {
        self.inner.accessor.get().is_some()
    }

    pub fn config(&self) -> &ApiConfig {
        &self.inner.config
    }

    pub fn busy(&self) -> BusyTracker {
        self.inner.busy.clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<GatewayEvent> {
        self.inner.events.subscribe()
    }

    pub fn interceptor_names(&self) -> Vec<&'static str> {
        self.inner.pipeline.names()
    }

    fn url_for(&self, path: &str) -> Result<reqwest::Url, GatewayError> {
        let base = self.inner.config.base_url.trim_end_matches('/');
        let url = if path.is_empty() || path.starts_with('/') {
            format!("{}{}", base, path)
        } else {
            format!("{}/{}", base, path)
        };
        reqwest::Url::parse(&url)
            .map_err(|e| GatewayError::InvalidRequest(format!("Invalid URL '{}': {}", url, e)))
    }

    /// Issue `method` against `base_url + path`.
    ///
    /// Returns the parsed JSON body on 2xx (`Null` for an empty body, a
    /// string for non-JSON text). 401/403 responses invalidate the session
    /// before the error is returned.
    pub async fn request(
        &self,
        method: ApiMethod,
        path: &str,
        body: Option<RequestBody>,
        options: RequestOptions,
    ) -> Result<Value, GatewayError> {
        let mut url = self.url_for(path)?;
        options.apply_query(&mut url);
        let extra_headers = options.header_map()?;
        let timeout_ms = options.timeout_ms.unwrap_or(self.inner.config.timeout_ms);

        let mut outgoing = OutgoingRequest::new(method, path);
        let exchange = self.inner.pipeline.begin(&mut outgoing);
        tracing::debug!(
            request_id = %exchange.request_id(),
            method = %method,
            path = %path,
            "Dispatching request"
        );

        let mut builder = self
            .inner
            .http
            .request(method.to_reqwest(), url)
            .headers(outgoing.headers)
            .headers(extra_headers);
        if let Some(body) = body {
            builder = body.apply(builder);
        }

        let exchanged = timeout(Duration::from_millis(timeout_ms), async move {
            let response = builder.send().await?;
            let status = response.status();
            let bytes = response.bytes().await;
            Ok::<_, reqwest::Error>((status, bytes))
        })
        .await;

        match exchanged {
            Err(_) => {
                exchange.settle(Outcome::TimedOut);
                tracing::warn!(method = %method, path = %path, timeout_ms, "Request timed out");
                Err(GatewayError::Timeout { timeout_ms })
            }
            Ok(Err(source)) => {
                exchange.settle(Outcome::Transport);
                tracing::warn!(method = %method, path = %path, error = %source, "Request failed");
                Err(GatewayError::Connection { source })
            }
            Ok(Ok((status, bytes))) => {
                exchange.settle(Outcome::Response {
                    status: status.as_u16(),
                });
                match bytes {
                    Ok(bytes) => into_result(status, &bytes),
                    Err(source) if status.is_success() => Err(GatewayError::Connection { source }),
                    Err(_) => Err(GatewayError::from_status(status.as_u16(), None)),
                }
            }
        }
    }

    /// `request` followed by deserialization into `T`.
    pub async fn request_json<T: DeserializeOwned>(
        &self,
        method: ApiMethod,
        path: &str,
        body: Option<RequestBody>,
        options: RequestOptions,
    ) -> Result<T, GatewayError> {
        let value = self.request(method, path, body, options).await?;
        serde_json::from_value(value).map_err(|e| GatewayError::Decode(e.to_string()))
    }

    pub async fn get(&self, path: &str) -> Result<Value, GatewayError> {
        self.request(ApiMethod::Get, path, None, RequestOptions::default())
            .await
    }

    pub async fn post(&self, path: &str, body: RequestBody) -> Result<Value, GatewayError> {
        self.request(ApiMethod::Post, path, Some(body), RequestOptions::default())
            .await
    }

    pub async fn put(&self, path: &str, body: RequestBody) -> Result<Value, GatewayError> {
        self.request(ApiMethod::Put, path, Some(body), RequestOptions::default())
            .await
    }

    pub async fn patch(&self, path: &str, body: RequestBody) -> Result<Value, GatewayError> {
        self.request(ApiMethod::Patch, path, Some(body), RequestOptions::default())
            .await
    }

    pub async fn delete(&self, path: &str) -> Result<Value, GatewayError> {
        self.request(ApiMethod::Delete, path, None, RequestOptions::default())
            .await
    }
}

fn into_result(status: StatusCode, body: &[u8]) -> Result<Value, GatewayError> {
    if !status.is_success() {
        return Err(GatewayError::from_status(
            status.as_u16(),
            extract_message(body),
        ));
    }
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_slice(body)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(body).into_owned())))
}
