use std::sync::Arc;

use tracing::warn;

use domain::machine::{MachineSnapshot, Position, PositionConfiguration};

use crate::data::{MachineDataProcessor, MachineStatusSummary};
use crate::machine::MachineManager;

/// Summarize every configured machine on the line.
pub struct GetAllMachinesUseCase {
    manager: Arc<MachineManager>,
    positions: Arc<dyn PositionConfiguration>,
    processor: MachineDataProcessor,
}

impl GetAllMachinesUseCase {
    pub fn new(manager: Arc<MachineManager>, positions: Arc<dyn PositionConfiguration>) -> Self {
        Self {
            manager,
            positions,
            processor: MachineDataProcessor::new(),
        }
    }

    /// A machine that cannot be read degrades to an "Unreachable" entry
    /// instead of failing the whole listing.
    pub async fn execute(&self) -> Vec<MachineStatusSummary> {
        let mut summaries = Vec::new();
        for position in self.positions.all_positions() {
            match self.read(&position).await {
                Ok(snapshot) => summaries.push(self.processor.summarize(&snapshot)),
                Err(e) => {
                    warn!(position = %position, error = %e, "Could not read machine data");
                    summaries.push(self.processor.unreachable(&position));
                }
            }
        }
        summaries
    }

    async fn read(&self, position: &Position) -> domain::error::Result<MachineSnapshot> {
        let machine = self.manager.get_connected(position).await?;
        machine.read_data().await
    }
}
