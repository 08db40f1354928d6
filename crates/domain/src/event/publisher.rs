use crate::MachineEvent;
use async_trait::async_trait;

#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(
        &self,
        event: MachineEvent,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    async fn publish_batch(
        &self,
        events: Vec<MachineEvent>,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        for event in events {
            self.publish(event).await?;
        }
        Ok(())
    }
}
