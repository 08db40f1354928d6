mod monitor;
mod service;

pub use monitor::MachineHealthMonitor;
pub use service::MachineMonitoringService;
