mod rng;
mod tag_simulator;

pub use rng::{SimulationRng, ThreadSimulationRng};
pub use tag_simulator::TagSimulator;
