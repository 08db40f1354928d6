use std::sync::Arc;

use async_trait::async_trait;

use super::{MachineConfig, MachineEndpoint, MachineSnapshot, MachineState, Position};
use crate::error::Result;
use crate::tag::TagValue;

/// One virtual session against a counting machine endpoint.
///
/// Implementations own the machine's tag store and its background tasks;
/// all methods take `&self` so a session can be shared behind an `Arc`
/// between request handlers and the monitoring loop.
#[async_trait]
pub trait CountingMachine: Send + Sync {
    /// Identity of the machine this session talks to
    fn endpoint(&self) -> &MachineEndpoint;

    /// Current connection state
    fn state(&self) -> MachineState;

    /// Establish the (simulated) link.
    ///
    /// Rejected unless the session is `Disconnected`; a rejected call
    /// reports whether the session is currently connected, so concurrent
    /// connect attempts are serialized by state rather than stacked.
    async fn connect(&self) -> Result<bool>;

    /// Tear down the link and stop all background activity.
    /// Safe to call from any state; idempotent.
    async fn disconnect(&self) -> Result<()>;

    /// Read the full tag set as a timestamped snapshot.
    async fn read_data(&self) -> Result<MachineSnapshot>;

    /// Apply a changeover configuration and roll the machine back into
    /// production.
    async fn write_configuration(&self, config: &MachineConfig) -> Result<()>;

    /// Read a single tag.
    async fn read_tag(&self, name: &str) -> Result<TagValue>;

    /// Write a single tag.
    async fn write_tag(&self, name: &str, value: TagValue) -> Result<()>;
}

/// Constructs sessions for the registry.
pub trait MachineFactory: Send + Sync {
    fn create(&self, position: &Position) -> Arc<dyn CountingMachine>;
}

/// Static line topology: which positions exist and where each one lives.
pub trait PositionConfiguration: Send + Sync {
    fn all_positions(&self) -> Vec<Position>;

    /// Resolve the endpoint address for a position. Unknown positions
    /// resolve to a defined fallback endpoint, never an error.
    fn endpoint_for(&self, position: &Position) -> String;
}
