//! Session-aware API gateway client.
//!
//! Every backend call goes through [`GatewayClient`], which attaches the
//! bearer token, tracks in-flight requests for the busy flag, and forces a
//! logout when the backend rejects the session.

mod busy;
mod client;
mod error;
mod events;
mod pipeline;
mod request;
mod session;

pub use busy::{BusyInterceptor, BusyTracker};
pub use client::{GatewayClient, GatewayClientBuilder};
pub use error::{extract_message, is_auth_status, GatewayError};
pub use events::{EventBus, GatewayEvent};
pub use pipeline::{Exchange, Interceptor, Outcome, Pipeline, Settlement};
pub use request::{ApiMethod, OutgoingRequest, RequestBody, RequestOptions};
pub use session::{SessionAccessor, SessionInterceptor};
