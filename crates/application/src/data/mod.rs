mod contracts;
mod processor;
mod validator;

pub use contracts::{ConfigurationRequest, MachineDataResponse, MachineStatusSummary};
pub use processor::MachineDataProcessor;
pub use validator::ConfigurationRequestValidator;
