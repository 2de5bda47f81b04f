//! Error taxonomy for gateway calls.
//!
//! Every failure is returned to the caller; the only cross-cutting recovery
//! (forced logout on 401/403) has already run by the time an `Auth` error
//! is observed.

use thiserror::Error;

/// Errors that can occur while issuing a backend request.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Backend rejected the credentials (401/403). The session has been
    /// invalidated before this error is returned.
    #[error("Authentication failed ({status}){}", fmt_message(.message))]
    Auth {
        status: u16,
        message: Option<String>,
    },

    /// Any other non-2xx response.
    #[error("API error ({status}){}", fmt_message(.message))]
    Api {
        status: u16,
        message: Option<String>,
    },

    /// No response within the request timeout.
    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// Transport failure before a response arrived.
    #[error("Connection failed: {source}")]
    Connection {
        #[source]
        source: reqwest::Error,
    },

    /// 2xx response whose body did not have the expected shape.
    #[error("Unexpected response body: {0}")]
    Decode(String),

    /// Path, header or body could not be turned into a request.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// `configure` was called after a session accessor was already registered.
    #[error("Gateway client is already configured with a session accessor")]
    AlreadyConfigured,
}

fn fmt_message(message: &Option<String>) -> String {
    match message {
        Some(m) => format!(": {}", m),
        None => String::new(),
    }
}

impl GatewayError {
    /// Build the error for a non-2xx status.
    pub fn from_status(status: u16, message: Option<String>) -> Self {
        if is_auth_status(status) {
            GatewayError::Auth { status, message }
        } else {
            GatewayError::Api { status, message }
        }
    }

    /// HTTP status, when the backend answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            GatewayError::Auth { status, .. } | GatewayError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The `message` field from the backend error body, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            GatewayError::Auth { message, .. } | GatewayError::Api { message, .. } => {
                message.as_deref()
            }
            _ => None,
        }
    }

    /// Message for the user: the server's own message, else `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        self.server_message()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or(fallback)
            .to_string()
    }

    pub fn is_auth_failure(&self) -> bool {
        matches!(self, GatewayError::Auth { .. })
    }

    /// Get error type string for logs and CLI output
    pub fn error_type(&self) -> &'static str {
        match self {
            GatewayError::Auth { .. } => "auth_error",
            GatewayError::Api { .. } => "api_error",
            GatewayError::Timeout { .. } => "timeout",
            GatewayError::Connection { .. } => "connection_error",
            GatewayError::Decode(_) => "decode_error",
            GatewayError::InvalidRequest(_) => "invalid_request",
            GatewayError::AlreadyConfigured => "already_configured",
        }
    }
}

/// 401 and 403 both mean the session is no longer usable.
pub fn is_auth_status(status: u16) -> bool {
    status == 401 || status == 403
}

/// Pull a human-readable message out of an error body.
///
/// Looks at `message`, then `error`, when either is a string.
pub fn extract_message(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    ["message", "error"]
        .iter()
        .find_map(|key| value.get(*key).and_then(|v| v.as_str()))
        .map(str::to_string)
}
