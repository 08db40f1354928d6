use crate::error::{DomainError, Result};
use serde::{Deserialize, Serialize};

/// Value object identifying one physical machine slot on the line
///
/// Rules:
/// - Must be non-empty
/// - Must contain only alphanumeric, underscore, and hyphen
/// - Max length 64 characters
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position(String);

impl Position {
    /// Create a new Position with validation
    pub fn new(position: impl Into<String>) -> Result<Self> {
        let position = position.into();

        // Validate non-empty
        if position.is_empty() {
            return Err(DomainError::InvalidPosition(
                "Position cannot be empty".to_string(),
            ));
        }

        // Validate length
        if position.len() > 64 {
            return Err(DomainError::InvalidPosition(format!(
                "Position too long: {} chars (max 64)",
                position.len()
            )));
        }

        // Validate characters
        if !position
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '-')
        {
            return Err(DomainError::InvalidPosition(format!(
                "Position {position} must contain only alphanumeric, underscore, and hyphen"
            )));
        }

        Ok(Self(position))
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
