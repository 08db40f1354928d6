use serde::{Deserialize, Serialize};

/// Declared kind of a tag value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TagKind {
    /// 64-bit signed integer
    Integer,
    /// 64-bit floating point
    Double,
    /// UTF-8 text
    String,
    /// Boolean flag
    Boolean,
    /// UTC timestamp
    Timestamp,
}

impl TagKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Integer => "Integer",
            Self::Double => "Double",
            Self::String => "String",
            Self::Boolean => "Boolean",
            Self::Timestamp => "Timestamp",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Integer | Self::Double)
    }
}

impl std::fmt::Display for TagKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_as_str() {
        assert_eq!(TagKind::Integer.as_str(), "Integer");
        assert_eq!(TagKind::Double.as_str(), "Double");
        assert_eq!(TagKind::String.as_str(), "String");
        assert_eq!(TagKind::Boolean.as_str(), "Boolean");
        assert_eq!(TagKind::Timestamp.as_str(), "Timestamp");
    }

    #[test]
    fn test_is_numeric() {
        assert!(TagKind::Integer.is_numeric());
        assert!(TagKind::Double.is_numeric());
        assert!(!TagKind::String.is_numeric());
        assert!(!TagKind::Boolean.is_numeric());
        assert!(!TagKind::Timestamp.is_numeric());
    }
}
