use std::sync::Arc;

use tracing::{error, info};

use domain::machine::{MachineConfig, Position};

use crate::data::{ConfigurationRequest, ConfigurationRequestValidator};
use crate::machine::MachineManager;

/// Validate and apply a changeover configuration to one machine.
pub struct ConfigureMachineUseCase {
    manager: Arc<MachineManager>,
    validator: ConfigurationRequestValidator,
}

impl ConfigureMachineUseCase {
    pub fn new(manager: Arc<MachineManager>) -> Self {
        Self {
            manager,
            validator: ConfigurationRequestValidator::new(),
        }
    }

    /// Invalid requests are rejected before any session is touched.
    pub async fn execute(
        &self,
        position: &Position,
        request: &ConfigurationRequest,
    ) -> domain::error::Result<()> {
        self.validator.validate(request)?;

        let machine = self.manager.get_connected(position).await?;
        let config = MachineConfig::new(
            position.clone(),
            request.recipe_id.clone(),
            request.elements_per_bag,
            request.counting_speed,
            request.feeder_speed,
            request.vibration_strength,
        );

        match machine.write_configuration(&config).await {
            Ok(()) => {
                info!(position = %position, "Configuration applied to machine");
                Ok(())
            }
            Err(e) => {
                error!(position = %position, error = %e, "Failed to apply configuration");
                Err(e)
            }
        }
    }
}
