use std::sync::Arc;

use tokio::sync::broadcast;

use application::health::MachineHealthMonitor;
use application::machine::MachineManager;
use application::usecases::{
    ConfigureMachineUseCase, GetAllMachinesUseCase, GetMachineDataUseCase,
};
use domain::machine::PositionConfiguration;
use domain::MachineEvent;

pub struct AppState {
    pub get_machine_data: GetMachineDataUseCase,
    pub get_all_machines: GetAllMachinesUseCase,
    pub configure_machine: ConfigureMachineUseCase,
    pub health_monitor: Arc<MachineHealthMonitor>,
    pub events: broadcast::Sender<MachineEvent>,
}

impl AppState {
    pub fn new(
        manager: Arc<MachineManager>,
        health_monitor: Arc<MachineHealthMonitor>,
        positions: Arc<dyn PositionConfiguration>,
        events: broadcast::Sender<MachineEvent>,
    ) -> Self {
        Self {
            get_machine_data: GetMachineDataUseCase::new(manager.clone()),
            get_all_machines: GetAllMachinesUseCase::new(manager.clone(), positions),
            configure_machine: ConfigureMachineUseCase::new(manager),
            health_monitor,
            events,
        }
    }
}
