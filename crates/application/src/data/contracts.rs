use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Changeover parameters submitted by a caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigurationRequest {
    pub recipe_id: String,
    pub elements_per_bag: i64,
    pub counting_speed: i64,
    pub feeder_speed: i64,
    pub vibration_strength: i64,
}

/// Full machine data projection returned by the read endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MachineDataResponse {
    pub position: String,
    pub timestamp: DateTime<Utc>,
    pub recipe_id: String,
    pub current_count: i64,
    pub status: String,
    pub elements_per_bag: i64,
    pub counting_speed: i64,
    pub feeder_speed: i64,
    pub vibration_strength: i64,
    pub is_used_in_order: bool,
    pub has_error: bool,
}

/// Compact per-machine entry returned by the list endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MachineStatusSummary {
    pub position: String,
    pub status: String,
    pub current_count: i64,
    pub recipe_id: String,
    pub has_error: bool,
    pub last_update: DateTime<Utc>,
}
