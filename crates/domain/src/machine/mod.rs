mod config;
mod endpoint;
mod interfaces;
mod position;
mod snapshot;
mod state;

pub use config::MachineConfig;
pub use endpoint::MachineEndpoint;
pub use interfaces::{CountingMachine, MachineFactory, PositionConfiguration};
pub use position::Position;
pub use snapshot::MachineSnapshot;
pub use state::MachineState;
