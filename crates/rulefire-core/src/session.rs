//! Session execution mode

use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How a session keeps working memory between operations.
///
/// A stateful session accepts incremental inserts and must be disposed; a
/// stateless session runs one batch and is then discarded. Stateful is the
/// default when a caller does not choose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionType {
    #[default]
    Stateful,
    Stateless,
}

impl SessionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionType::Stateful => "stateful",
            SessionType::Stateless => "stateless",
        }
    }
}

impl fmt::Display for SessionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stateful" => Ok(SessionType::Stateful),
            "stateless" => Ok(SessionType::Stateless),
            _ => Err(CoreError::InvalidSessionType(s.to_string())),
        }
    }
}
