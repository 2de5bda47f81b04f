use std::fmt;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::RequestBuilder;
use serde::Serialize;

use crate::gateway::error::GatewayError;

/// HTTP methods the backend API uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl ApiMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApiMethod::Get => "GET",
            ApiMethod::Post => "POST",
            ApiMethod::Put => "PUT",
            ApiMethod::Patch => "PATCH",
            ApiMethod::Delete => "DELETE",
        }
    }

    pub(crate) fn to_reqwest(self) -> reqwest::Method {
        match self {
            ApiMethod::Get => reqwest::Method::GET,
            ApiMethod::Post => reqwest::Method::POST,
            ApiMethod::Put => reqwest::Method::PUT,
            ApiMethod::Patch => reqwest::Method::PATCH,
            ApiMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

impl fmt::Display for ApiMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request payload.
///
/// JSON bodies get `application/json`; multipart forms carry their own
/// boundary; raw bytes use the caller's content type.
pub enum RequestBody {
    Json(serde_json::Value),
    Multipart(reqwest::multipart::Form),
    Bytes {
        content_type: String,
        bytes: Vec<u8>,
    },
}

impl RequestBody {
    /// Serialize any value into a JSON body.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self, GatewayError> {
        serde_json::to_value(value)
            .map(RequestBody::Json)
            .map_err(|e| GatewayError::InvalidRequest(format!("Failed to serialize body: {}", e)))
    }

    pub(crate) fn apply(self, builder: RequestBuilder) -> RequestBuilder {
        match self {
            RequestBody::Json(value) => builder.json(&value),
            RequestBody::Multipart(form) => builder.multipart(form),
            RequestBody::Bytes {
                content_type,
                bytes,
            } => builder.header(CONTENT_TYPE, content_type).body(bytes),
        }
    }
}

impl From<serde_json::Value> for RequestBody {
    fn from(value: serde_json::Value) -> Self {
        RequestBody::Json(value)
    }
}

/// Per-call overrides.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Overrides the configured timeout (default 15000ms).
    pub timeout_ms: Option<u64>,
    /// Extra headers sent after interceptors have run.
    pub headers: Vec<(String, String)>,
    /// Query parameters, percent-encoded onto the URL in order.
    pub query: Vec<(String, String)>,
}

impl RequestOptions {
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    pub(crate) fn apply_query(&self, url: &mut reqwest::Url) {
        if !self.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&self.query);
        }
    }

    pub(crate) fn header_map(&self) -> Result<HeaderMap, GatewayError> {
        let mut map = HeaderMap::new();
        for (name, value) in &self.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| GatewayError::InvalidRequest(format!("Bad header name '{}': {}", name, e)))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| GatewayError::InvalidRequest(format!("Bad header value: {}", e)))?;
            map.insert(name, value);
        }
        Ok(map)
    }
}

/// The request as seen by interceptors before dispatch.
#[derive(Debug, Clone)]
pub struct OutgoingRequest {
    pub request_id: String,
    pub method: ApiMethod,
    pub path: String,
    pub headers: HeaderMap,
}

impl OutgoingRequest {
    pub fn new(method: ApiMethod, path: impl Into<String>) -> Self {
        Self {
            request_id: uuid::Uuid::new_v4().to_string(),
            method,
            path: path.into(),
            headers: HeaderMap::new(),
        }
    }
}
