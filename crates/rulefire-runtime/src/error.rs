//! Runtime error types

use rulefire_core::{CoreError, ReleaseId, SessionType};
use thiserror::Error;

/// Runtime error
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    /// No knowledge base with this name
    #[error("Unknown knowledge base: {0}")]
    UnknownBase(String),

    /// No session declared with this name
    #[error("Unknown session: {0}")]
    UnknownSession(String),

    /// Session exists but is declared for the other mode
    #[error("Session {name} is declared as {declared}, not {requested}")]
    WrongSessionType {
        name: String,
        declared: SessionType,
        requested: SessionType,
    },

    /// Container declares no default for the requested mode
    #[error("No default {0} session is declared")]
    NoDefaultSession(SessionType),

    /// No module installed for this release
    #[error("Release not found: {0}")]
    ReleaseNotFound(ReleaseId),

    /// Session was used after dispose
    #[error("Session {0} has been disposed")]
    SessionDisposed(String),

    /// No rule in the base declares this global
    #[error("Unexpected global [{0}]")]
    UndeclaredGlobal(String),

    /// Rule read a global that was never set
    #[error("Global not set: {0}")]
    MissingGlobal(String),

    /// Rule sent to a channel that is not registered
    #[error("Unknown channel: {0}")]
    UnknownChannel(String),

    /// Fact handle does not exist in working memory
    #[error("Unknown fact handle: {0}")]
    UnknownFactHandle(u64),

    /// Consequence of a rule failed
    #[error("Consequence of rule '{rule}' failed: {message}")]
    Consequence { rule: String, message: String },

    /// Value had an unexpected type
    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Result type for runtime operations
pub type Result<T> = std::result::Result<T, RuntimeError>;
