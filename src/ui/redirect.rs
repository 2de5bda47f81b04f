use std::sync::Arc;

use tokio::sync::broadcast;

use crate::gateway::GatewayEvent;

/// Location of the login view.
pub const LOGIN_LOCATION: &str = "/login";

/// Whatever owns the current view (router, terminal UI, ...).
pub trait Navigator: Send + Sync {
    fn current_location(&self) -> String;

    fn navigate(&self, location: &str);
}

/// Sends the user to the login view when the gateway invalidates the session.
pub struct LoginRedirect {
    navigator: Arc<dyn Navigator>,
    login_location: String,
}

impl LoginRedirect {
    pub fn new(navigator: Arc<dyn Navigator>) -> Self {
        Self {
            navigator,
            login_location: LOGIN_LOCATION.to_string(),
        }
    }

    pub fn with_login_location(mut self, location: impl Into<String>) -> Self {
        self.login_location = location.into();
        self
    }

    /// React to one event. Returns whether a navigation happened.
    pub fn handle(&self, event: &GatewayEvent) -> bool {
        match event {
            GatewayEvent::SessionInvalidated { status, path } => {
                if self.navigator.current_location() == self.login_location {
                    return false;
                }
                tracing::info!(status, path = %path, "Redirecting to login");
                self.navigator.navigate(&self.login_location);
                true
            }
        }
    }

    /// Consume events until the gateway is dropped.
    pub async fn run(self, mut events: broadcast::Receiver<GatewayEvent>) {
        loop {
            match events.recv().await {
                Ok(event) => {
                    self.handle(&event);
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Login redirect lagged behind gateway events");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    }
}
