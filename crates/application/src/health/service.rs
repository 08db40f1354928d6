use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use domain::machine::MachineState;
use infrastructure::config::MonitorSettings;

use super::MachineHealthMonitor;
use crate::machine::MachineManager;

/// Background loop that scans machine health and repairs errored sessions.
pub struct MachineMonitoringService {
    monitor: Arc<MachineHealthMonitor>,
    manager: Arc<MachineManager>,
    settings: MonitorSettings,
}

impl MachineMonitoringService {
    pub fn new(
        monitor: Arc<MachineHealthMonitor>,
        manager: Arc<MachineManager>,
        settings: MonitorSettings,
    ) -> Self {
        Self {
            monitor,
            manager,
            settings,
        }
    }

    /// Run until the token is cancelled. A failed cycle is logged and
    /// followed by the longer backoff sleep instead of the scan interval.
    pub async fn run(&self, cancel: CancellationToken) {
        info!("Starting machine monitoring service");

        loop {
            let sleep_for = match self.cycle().await {
                Ok(()) => self.settings.scan_interval(),
                Err(e) => {
                    error!(error = %e, "Error in machine monitoring cycle");
                    self.settings.backoff()
                }
            };

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(sleep_for) => {}
            }
        }

        info!("Machine monitoring service stopped");
    }

    async fn cycle(&self) -> anyhow::Result<()> {
        let health = self.monitor.scan_all().await;
        for (position, healthy) in &health {
            if !healthy {
                warn!(position = %position, "Machine is not healthy");
            }
        }

        self.reconnect_errored().await;
        Ok(())
    }

    /// Repair pass: any session stuck in Error is disconnected, allowed to
    /// settle, and reconnected. A failed reconnect is left for the next
    /// cycle rather than retried here.
    async fn reconnect_errored(&self) {
        for (position, machine) in self.manager.sessions() {
            if machine.state() != MachineState::Error {
                continue;
            }

            warn!(position = %position, "Machine is in error state, attempting reconnection");

            if let Err(e) = machine.disconnect().await {
                error!(position = %position, error = %e, "Failed to disconnect errored machine");
                continue;
            }

            tokio::time::sleep(self.settings.reconnect_delay()).await;

            match machine.connect().await {
                Ok(true) => info!(position = %position, "Machine reconnected"),
                Ok(false) => warn!(position = %position, "Machine reconnect was rejected"),
                Err(e) => error!(position = %position, error = %e, "Failed to reconnect machine"),
            }
        }
    }
}
