//! Ordered request/response hooks.
//!
//! `before_send` runs in registration order, `after_settle` in reverse, so
//! the first interceptor wraps everything after it. Every request that ran
//! `before_send` gets exactly one `after_settle`, including requests whose
//! future is dropped mid-flight.

use std::sync::Arc;

use crate::gateway::request::{ApiMethod, OutgoingRequest};

/// How a request ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The backend answered with this status (any class).
    Response { status: u16 },
    /// The request timeout elapsed first.
    TimedOut,
    /// Transport error before a status was received.
    Transport,
    /// The caller dropped the request future.
    Cancelled,
}

/// What `after_settle` hooks see.
#[derive(Debug, Clone)]
pub struct Settlement {
    pub request_id: String,
    pub method: ApiMethod,
    pub path: String,
    pub outcome: Outcome,
}

impl Settlement {
    pub fn status(&self) -> Option<u16> {
        match self.outcome {
            Outcome::Response { status } => Some(status),
            _ => None,
        }
    }
}

pub trait Interceptor: Send + Sync {
    fn name(&self) -> &'static str;

    fn before_send(&self, _request: &mut OutgoingRequest) {}

    fn after_settle(&self, _settlement: &Settlement) {}
}

#[derive(Clone, Default)]
pub struct Pipeline {
    interceptors: Vec<Arc<dyn Interceptor>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, interceptor: Arc<dyn Interceptor>) {
        self.interceptors.push(interceptor);
    }

    /// Interceptor names in `before_send` order.
    pub fn names(&self) -> Vec<&'static str> {
        self.interceptors.iter().map(|i| i.name()).collect()
    }

    /// Run the pre-dispatch hooks and return the guard that settles the request.
    pub fn begin(&self, request: &mut OutgoingRequest) -> Exchange<'_> {
        for interceptor in &self.interceptors {
            interceptor.before_send(request);
        }
        Exchange {
            pipeline: self,
            request_id: request.request_id.clone(),
            method: request.method,
            path: request.path.clone(),
            settled: false,
        }
    }

    fn settle(&self, settlement: &Settlement) {
        for interceptor in self.interceptors.iter().rev() {
            interceptor.after_settle(settlement);
        }
    }
}

/// One in-flight request. Settles as `Cancelled` if dropped unsettled.
pub struct Exchange<'a> {
    pipeline: &'a Pipeline,
    request_id: String,
    method: ApiMethod,
    path: String,
    settled: bool,
}

impl Exchange<'_> {
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    pub fn settle(mut self, outcome: Outcome) {
        self.finish(outcome);
    }

    fn finish(&mut self, outcome: Outcome) {
        if self.settled {
            return;
        }
        self.settled = true;
        let settlement = Settlement {
            request_id: std::mem::take(&mut self.request_id),
            method: self.method,
            path: std::mem::take(&mut self.path),
            outcome,
        };
        self.pipeline.settle(&settlement);
    }
}

impl Drop for Exchange<'_> {
    fn drop(&mut self) {
        if !self.settled {
            tracing::debug!(request_id = %self.request_id, "Request dropped before settling");
        }
        self.finish(Outcome::Cancelled);
    }
}
