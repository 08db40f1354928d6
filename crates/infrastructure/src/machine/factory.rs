use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use domain::event::EventPublisher;
use domain::machine::{
    CountingMachine, MachineEndpoint, MachineFactory, Position, PositionConfiguration,
};

use super::SimulatedCountingMachine;
use crate::config::SimulationSettings;

/// Builds simulated machine sessions for the registry.
///
/// Each session gets its own child of the process lifecycle token so it can
/// be cancelled individually or swept away by a process-wide shutdown.
pub struct SimulatorFactory {
    positions: Arc<dyn PositionConfiguration>,
    publisher: Arc<dyn EventPublisher>,
    settings: SimulationSettings,
    shutdown: CancellationToken,
}

impl SimulatorFactory {
    pub fn new(
        positions: Arc<dyn PositionConfiguration>,
        publisher: Arc<dyn EventPublisher>,
        settings: SimulationSettings,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            positions,
            publisher,
            settings,
            shutdown,
        }
    }
}

impl MachineFactory for SimulatorFactory {
    fn create(&self, position: &Position) -> Arc<dyn CountingMachine> {
        let endpoint = MachineEndpoint::new(
            position.clone(),
            self.positions.endpoint_for(position),
        );
        debug!(position = %position, endpoint = %endpoint.endpoint, "Creating machine session");

        Arc::new(SimulatedCountingMachine::new(
            endpoint,
            self.publisher.clone(),
            self.settings.clone(),
            self.shutdown.child_token(),
        ))
    }
}
