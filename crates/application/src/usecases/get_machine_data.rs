use std::sync::Arc;

use tracing::error;

use domain::machine::{MachineSnapshot, Position};

use crate::data::{MachineDataProcessor, MachineDataResponse};
use crate::machine::MachineManager;

/// Read the full data projection of one machine.
pub struct GetMachineDataUseCase {
    manager: Arc<MachineManager>,
    processor: MachineDataProcessor,
}

impl GetMachineDataUseCase {
    pub fn new(manager: Arc<MachineManager>) -> Self {
        Self {
            manager,
            processor: MachineDataProcessor::new(),
        }
    }

    /// None means the machine is unresolvable or unreachable; the API layer
    /// translates that into its not-found signal.
    pub async fn execute(&self, position: &Position) -> Option<MachineDataResponse> {
        match self.read(position).await {
            Ok(snapshot) => Some(self.processor.process(&snapshot)),
            Err(e) => {
                error!(position = %position, error = %e, "Error reading machine data");
                None
            }
        }
    }

    async fn read(&self, position: &Position) -> domain::error::Result<MachineSnapshot> {
        let machine = self.manager.get_connected(position).await?;
        machine.read_data().await
    }
}
