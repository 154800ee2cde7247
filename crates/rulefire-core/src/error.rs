//! Error types for rulefire core

use thiserror::Error;

/// Core error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("Invalid release id: {0}")]
    InvalidReleaseId(String),

    #[error("Invalid session type: {0}")]
    InvalidSessionType(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
