//! SDK error types

use rulefire_runtime::RuntimeError;
use thiserror::Error;

/// SDK error type
#[derive(Error, Debug)]
pub enum RulesError {
    /// Container could not be built or verified
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Malformed request input
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// No execution context for the requested base, session or mode
    #[error("Session resolution error: {0}")]
    SessionResolution(String),

    /// Engine failure while injecting globals or facts, or while firing
    #[error("Execution error: {0}")]
    Execution(#[from] RuntimeError),
}

impl RulesError {
    /// Short label used in metric names (`errors_<kind>`)
    pub fn kind(&self) -> &'static str {
        match self {
            RulesError::Configuration(_) => "configuration",
            RulesError::InvalidArgument(_) => "invalid_argument",
            RulesError::SessionResolution(_) => "session_resolution",
            RulesError::Execution(_) => "execution",
        }
    }
}

/// Result type for SDK operations
pub type Result<T> = std::result::Result<T, RulesError>;
