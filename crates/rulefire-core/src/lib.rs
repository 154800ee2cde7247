//! rulefire core - value types shared by the rule engine and its facade
//!
//! This crate provides:
//! - `Fact`: an opaque value that lives in working memory
//! - `FactType` / `FactTypes`: exact runtime type identity and type filters
//! - `SessionType`: stateful or stateless execution
//! - `ReleaseId`: coordinates of a knowledge release
//! - Verification messages produced when a knowledge container is built

pub mod error;
pub mod fact;
pub mod message;
pub mod release;
pub mod session;

// Re-export commonly used types
pub use error::{CoreError, Result};
pub use fact::{Fact, FactType, FactTypes, FactValue};
pub use message::{Level, Message, Results};
pub use release::ReleaseId;
pub use session::SessionType;
