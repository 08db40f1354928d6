use chrono::Utc;

use domain::machine::{MachineSnapshot, Position};

use super::{MachineDataResponse, MachineStatusSummary};

/// Maps machine snapshots into the external response shapes.
#[derive(Debug, Default, Clone, Copy)]
pub struct MachineDataProcessor;

impl MachineDataProcessor {
    pub fn new() -> Self {
        Self
    }

    pub fn process(&self, snapshot: &MachineSnapshot) -> MachineDataResponse {
        MachineDataResponse {
            position: snapshot.position.to_string(),
            timestamp: snapshot.timestamp,
            recipe_id: snapshot.recipe_id(),
            current_count: snapshot.current_count(),
            status: snapshot.status(),
            elements_per_bag: snapshot.elements_per_bag(),
            counting_speed: snapshot.counting_speed(),
            feeder_speed: snapshot.feeder_speed(),
            vibration_strength: snapshot.vibration_strength(),
            is_used_in_order: snapshot.is_used_in_order(),
            has_error: snapshot.has_error(),
        }
    }

    pub fn summarize(&self, snapshot: &MachineSnapshot) -> MachineStatusSummary {
        MachineStatusSummary {
            position: snapshot.position.to_string(),
            status: snapshot.status(),
            current_count: snapshot.current_count(),
            recipe_id: snapshot.recipe_id(),
            has_error: snapshot.has_error(),
            last_update: snapshot.timestamp,
        }
    }

    /// Degraded entry for a machine whose data could not be read.
    pub fn unreachable(&self, position: &Position) -> MachineStatusSummary {
        MachineStatusSummary {
            position: position.to_string(),
            status: "Unreachable".to_string(),
            current_count: 0,
            recipe_id: "Unknown".to_string(),
            has_error: true,
            last_update: Utc::now(),
        }
    }
}
