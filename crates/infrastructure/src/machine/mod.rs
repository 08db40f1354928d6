mod factory;
mod simulated;

pub use factory::SimulatorFactory;
pub use simulated::SimulatedCountingMachine;
