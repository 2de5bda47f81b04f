use tokio::sync::broadcast;

const EVENT_CHANNEL_SIZE: usize = 32;

/// Signals the gateway raises for the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayEvent {
    /// A 401/403 response cleared a live session. Raised once per clearing,
    /// not once per failing response.
    SessionInvalidated { status: u16, path: String },
}

#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<GatewayEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(EVENT_CHANNEL_SIZE);
        Self { sender }
    }

    pub fn publish(&self, event: GatewayEvent) {
        // no subscribers is fine
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<GatewayEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_without_subscribers() {
        let bus = EventBus::new();
        bus.publish(GatewayEvent::SessionInvalidated {
            status: 401,
            path: "/blogs".to_string(),
        });
    }

    #[test]
    fn test_subscriber_receives_event() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();
        let event = GatewayEvent::SessionInvalidated {
            status: 403,
            path: "/users".to_string(),
        };
        bus.publish(event.clone());
        assert_eq!(rx.try_recv().unwrap(), event);
    }
}
