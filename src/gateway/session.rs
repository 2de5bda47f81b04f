//! Session-facing interceptor: credential attachment and forced logout.

use std::sync::{Arc, OnceLock};

use reqwest::header::AUTHORIZATION;

use crate::gateway::error::is_auth_status;
use crate::gateway::events::{EventBus, GatewayEvent};
use crate::gateway::pipeline::{Interceptor, Settlement};
use crate::gateway::request::OutgoingRequest;
use crate::session::BearerToken;

/// How the gateway reads and clears session state it does not own.
pub trait SessionAccessor: Send + Sync {
    /// Current bearer token, from memory or the persisted copy.
    fn token(&self) -> Option<BearerToken>;

    /// Clear the session and its persisted copy.
    ///
    /// Returns `true` only if there was something to clear, so repeated
    /// calls after the first are no-ops.
    fn invalidate(&self) -> bool;
}

/// Accessor slot shared between the client and its interceptor.
pub(crate) type AccessorSlot = Arc<OnceLock<Arc<dyn SessionAccessor>>>;

/// Stamps `Authorization: Bearer <token>` on the way out and forces a
/// logout when the backend answers 401/403.
///
/// With no accessor registered both directions are no-ops.
pub struct SessionInterceptor {
    accessor: AccessorSlot,
    events: EventBus,
}

impl SessionInterceptor {
    pub(crate) fn new(accessor: AccessorSlot, events: EventBus) -> Self {
        Self { accessor, events }
    }
}

impl Interceptor for SessionInterceptor {
    fn name(&self) -> &'static str {
        "session"
    }

    fn before_send(&self, request: &mut OutgoingRequest) {
        let Some(accessor) = self.accessor.get() else {
            return;
        };
        let Some(token) = accessor.token() else {
            return;
        };
        match token.header_value() {
            Ok(value) => {
                request.headers.insert(AUTHORIZATION, value);
            }
            Err(e) => {
                tracing::warn!(
                    request_id = %request.request_id,
                    error = %e,
                    "Stored token is not a valid header value, sending without credentials"
                );
            }
        }
    }

    fn after_settle(&self, settlement: &Settlement) {
        let Some(status) = settlement.status().filter(|s| is_auth_status(*s)) else {
            return;
        };
        let Some(accessor) = self.accessor.get() else {
            return;
        };

        if accessor.invalidate() {
            tracing::warn!(
                request_id = %settlement.request_id,
                status,
                path = %settlement.path,
                "Session rejected by backend, logged out"
            );
            self.events.publish(GatewayEvent::SessionInvalidated {
                status,
                path: settlement.path.clone(),
            });
        } else {
            tracing::debug!(
                request_id = %settlement.request_id,
                status,
                "Auth failure with no active session"
            );
        }
    }
}
