use serde::{Deserialize, Serialize};

use super::Position;

/// Identity of one counting machine: its line position and the address
/// of the device endpoint serving it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineEndpoint {
    pub position: Position,
    pub endpoint: String,
}

impl MachineEndpoint {
    pub fn new(position: Position, endpoint: impl Into<String>) -> Self {
        Self {
            position,
            endpoint: endpoint.into(),
        }
    }
}
