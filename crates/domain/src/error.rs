use thiserror::Error;

use crate::tag::TagKind;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("Machine is not connected")]
    NotConnected,

    #[error("Tag not found: {0}")]
    TagNotFound(String),

    #[error("Tag '{tag}' is of kind {actual}, not {expected}")]
    TypeMismatch {
        tag: String,
        expected: TagKind,
        actual: TagKind,
    },

    #[error("Tag '{0}' cannot be written with a null value")]
    NullValue(String),

    #[error("Unsupported tag kind: {0}")]
    UnsupportedKind(String),

    #[error("Configuration position {config} does not match machine position {machine}")]
    PositionMismatch { config: String, machine: String },

    #[error("Validation failed: {}", .0.join("; "))]
    ValidationFailed(Vec<String>),

    #[error("Connection failed: {0}")]
    ConnectFailed(String),

    #[error("Invalid position: {0}")]
    InvalidPosition(String),
}

pub type Result<T> = std::result::Result<T, DomainError>;
