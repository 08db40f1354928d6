use serde::{Deserialize, Serialize};

/// Connection state of a counting machine session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MachineState {
    /// Not connected, no active connection attempt
    Disconnected,
    /// Currently attempting to establish connection
    Connecting,
    /// Successfully connected and operational
    Connected,
    /// Connection or configuration failed (monitoring loop will repair)
    Error,
}

impl MachineState {
    /// Check if state allows a connection attempt
    pub fn can_connect(&self) -> bool {
        matches!(self, Self::Disconnected)
    }

    /// Check if currently connected
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }

    /// Check if in a transitional state
    pub fn is_transitioning(&self) -> bool {
        matches!(self, Self::Connecting)
    }

    /// Transition to connecting state
    pub fn to_connecting(&self) -> Result<Self, &'static str> {
        match self {
            Self::Disconnected => Ok(Self::Connecting),
            _ => Err("Can only connect from Disconnected state"),
        }
    }

    /// Transition to connected state
    pub fn to_connected(&self) -> Result<Self, &'static str> {
        match self {
            Self::Connecting => Ok(Self::Connected),
            _ => Err("Can only complete connection from Connecting state"),
        }
    }

    /// Transition to disconnected state
    pub fn to_disconnected(&self) -> Self {
        Self::Disconnected
    }

    /// Transition to error state
    pub fn to_error(&self) -> Self {
        Self::Error
    }
}

impl Default for MachineState {
    fn default() -> Self {
        Self::Disconnected
    }
}

impl std::fmt::Display for MachineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Disconnected => "Disconnected",
            Self::Connecting => "Connecting",
            Self::Connected => "Connected",
            Self::Error => "Error",
        };
        write!(f, "{s}")
    }
}
