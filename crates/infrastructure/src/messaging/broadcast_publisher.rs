use async_trait::async_trait;
use tokio::sync::broadcast;

use domain::event::EventPublisher;
use domain::MachineEvent;

/// In-process event fan-out over a lossy broadcast channel.
///
/// Producers (mutation notifiers, session operations) never block: a
/// subscriber that falls behind drops events instead of stalling the
/// machine that produced them.
pub struct BroadcastEventPublisher {
    tx: broadcast::Sender<MachineEvent>,
}

impl BroadcastEventPublisher {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe to the event stream.
    pub fn subscribe(&self) -> broadcast::Receiver<MachineEvent> {
        self.tx.subscribe()
    }

    /// Handle for wiring the stream into other components (e.g. SSE).
    pub fn sender(&self) -> broadcast::Sender<MachineEvent> {
        self.tx.clone()
    }
}

#[async_trait]
impl EventPublisher for BroadcastEventPublisher {
    async fn publish(
        &self,
        event: MachineEvent,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        // A send with no live subscribers is not an error
        let _ = self.tx.send(event);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::machine::Position;

    #[tokio::test]
    async fn test_subscriber_receives_published_event() {
        let publisher = BroadcastEventPublisher::new(16);
        let mut rx = publisher.subscribe();

        let position = Position::new("CM01_1").unwrap();
        publisher
            .publish(MachineEvent::machine_connected(position))
            .await
            .unwrap();

        let event = rx.recv().await.unwrap();
        assert_eq!(event.event_type(), "MachineConnected");
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_succeeds() {
        let publisher = BroadcastEventPublisher::new(16);
        let position = Position::new("CM01_1").unwrap();
        assert!(publisher
            .publish(MachineEvent::machine_connected(position))
            .await
            .is_ok());
    }
}
