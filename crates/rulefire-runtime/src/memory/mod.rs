//! In-memory rule engine
//!
//! A small forward-chaining engine over Rust-defined rules. It keeps no
//! indexes: every working-memory change re-evaluates each rule against each
//! fact, which is enough for the rule counts a facade test or an embedded
//! decision table needs.
//!
//! - `agenda`: working memory, activation keys and ordering
//! - `session`: stateful and stateless sessions
//! - `container`: module compilation, verification and session lookup
//! - `repository`: releases installed in-process

mod agenda;
mod container;
mod repository;
mod session;

pub use container::{MemoryContainer, MemoryKnowledgeBase};
pub use repository::ModuleRepository;
pub use session::{MemorySession, MemoryStatelessSession};
