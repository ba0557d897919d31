use tokio::sync::broadcast;

use crate::models::events::DomainEvent;

/// Outbound event fan-out. Workflows commit their own state first and then
/// publish here fire-and-forget; delivery to consumers is at-least-once and
/// consumers are expected to be idempotent on (entity id, event type).
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<DomainEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publish an event. A send error only means there is no subscriber
    /// right now, which is not a workflow failure.
    pub fn publish(&self, event: DomainEvent) {
        let event_type = event.event_type();
        match self.tx.send(event) {
            Ok(receivers) => {
                tracing::debug!(event_type, receivers, "published domain event");
            }
            Err(_) => {
                tracing::debug!(event_type, "no subscribers for domain event");
            }
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DomainEvent> {
        self.tx.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
