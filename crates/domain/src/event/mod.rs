use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

mod publisher;
pub use publisher::EventPublisher;

use crate::machine::{MachineSnapshot, Position};

/// Domain events that can occur in the system
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum MachineEvent {
    /// Session successfully connected to its endpoint
    MachineConnected {
        position: Position,
        timestamp: DateTime<Utc>,
    },

    /// Session disconnected from its endpoint
    MachineDisconnected {
        position: Position,
        reason: String,
        timestamp: DateTime<Utc>,
    },

    /// A fresh snapshot of the machine's tag set is available
    DataChanged {
        snapshot: MachineSnapshot,
        timestamp: DateTime<Utc>,
    },

    /// A session operation failed
    MachineError {
        position: Position,
        error: String,
        timestamp: DateTime<Utc>,
    },
}

impl MachineEvent {
    /// Create a MachineConnected event
    pub fn machine_connected(position: Position) -> Self {
        Self::MachineConnected {
            position,
            timestamp: Utc::now(),
        }
    }

    /// Create a MachineDisconnected event
    pub fn machine_disconnected(position: Position, reason: impl Into<String>) -> Self {
        Self::MachineDisconnected {
            position,
            reason: reason.into(),
            timestamp: Utc::now(),
        }
    }

    /// Create a DataChanged event
    pub fn data_changed(snapshot: MachineSnapshot) -> Self {
        Self::DataChanged {
            snapshot,
            timestamp: Utc::now(),
        }
    }

    /// Create a MachineError event
    pub fn machine_error(position: Position, error: impl Into<String>) -> Self {
        Self::MachineError {
            position,
            error: error.into(),
            timestamp: Utc::now(),
        }
    }

    /// Get the timestamp of this event
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::MachineConnected { timestamp, .. } => *timestamp,
            Self::MachineDisconnected { timestamp, .. } => *timestamp,
            Self::DataChanged { timestamp, .. } => *timestamp,
            Self::MachineError { timestamp, .. } => *timestamp,
        }
    }

    /// Get the event type as string
    pub fn event_type(&self) -> &str {
        match self {
            Self::MachineConnected { .. } => "MachineConnected",
            Self::MachineDisconnected { .. } => "MachineDisconnected",
            Self::DataChanged { .. } => "DataChanged",
            Self::MachineError { .. } => "MachineError",
        }
    }
}
