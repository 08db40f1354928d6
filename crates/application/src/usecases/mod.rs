mod configure_machine;
mod get_all_machines;
mod get_machine_data;

pub use configure_machine::ConfigureMachineUseCase;
pub use get_all_machines::GetAllMachinesUseCase;
pub use get_machine_data::GetMachineDataUseCase;
