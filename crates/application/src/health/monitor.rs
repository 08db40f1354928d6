use std::collections::HashMap;
use std::sync::Arc;

use tracing::error;

use domain::machine::{Position, PositionConfiguration};

use crate::machine::MachineManager;

/// Per-position health checks over the machine registry.
pub struct MachineHealthMonitor {
    manager: Arc<MachineManager>,
    positions: Arc<dyn PositionConfiguration>,
}

impl MachineHealthMonitor {
    pub fn new(manager: Arc<MachineManager>, positions: Arc<dyn PositionConfiguration>) -> Self {
        Self { manager, positions }
    }

    /// A machine is healthy when it is reachable and reports no error flag.
    /// Any failure along the way counts as unhealthy.
    pub async fn is_healthy(&self, position: &Position) -> bool {
        match self.check(position).await {
            Ok(healthy) => healthy,
            Err(e) => {
                error!(position = %position, error = %e, "Health check failed");
                false
            }
        }
    }

    /// Compute health for every configured position. A failure on one
    /// position never aborts the scan.
    pub async fn scan_all(&self) -> HashMap<Position, bool> {
        let mut health = HashMap::new();
        for position in self.positions.all_positions() {
            let healthy = self.is_healthy(&position).await;
            health.insert(position, healthy);
        }
        health
    }

    async fn check(&self, position: &Position) -> domain::error::Result<bool> {
        let machine = self.manager.get_connected(position).await?;
        let snapshot = machine.read_data().await?;
        Ok(!snapshot.has_error())
    }
}
