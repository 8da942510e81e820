//! Error types for the conversation crate.
//!
//! Errors are designed for layered context using rootcause. Callers in the
//! integration and dispatch crates wrap these with their own context.

use std::fmt;

/// Errors from capturing or storing conversation references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversationError {
    /// The activity lacks a field needed to address the conversation later.
    MissingField { field: &'static str },
    /// A reference was captured with an empty user id.
    EmptyUserId,
}

impl fmt::Display for ConversationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingField { field } => {
                write!(f, "activity is missing required field '{field}'")
            }
            Self::EmptyUserId => write!(f, "activity sender has an empty id"),
        }
    }
}

impl std::error::Error for ConversationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_field_display() {
        let err = ConversationError::MissingField { field: "serviceUrl" };
        assert!(err.to_string().contains("serviceUrl"));
    }
}
