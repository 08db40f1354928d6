//! Application layer - Use cases and business workflows

pub mod data;
pub mod health;
pub mod machine;
pub mod usecases;

pub use data::{ConfigurationRequest, ConfigurationRequestValidator, MachineDataProcessor};
pub use health::{MachineHealthMonitor, MachineMonitoringService};
pub use machine::MachineManager;
pub use usecases::{ConfigureMachineUseCase, GetAllMachinesUseCase, GetMachineDataUseCase};
