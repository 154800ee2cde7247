//! rulefire runtime - the rule engine collaborator
//!
//! This crate defines the seams the facade talks to (containers, knowledge
//! bases, stateful and stateless sessions, channels, event listeners, batch
//! commands) and ships an in-memory engine implementing them.

pub mod channel;
pub mod command;
pub mod container;
pub mod error;
pub mod event;
pub mod memory;
pub mod module;
pub mod rule;
pub mod session;

// Re-export main types
pub use channel::Channel;
pub use command::{BatchExecution, Command, ExecutionResults};
pub use container::{KnowledgeBase, KnowledgeContainer};
pub use error::{Result, RuntimeError};
pub use event::{AgendaEventListener, Match, ObjectEvent, RuleRuntimeEventListener};
pub use memory::{MemoryContainer, ModuleRepository};
pub use module::{BaseModel, KnowledgeModule, SessionModel};
pub use rule::{Globals, Rule, RuleBuilder, RuleContext, SourceLocation};
pub use session::{FactHandle, StatefulSession, StatelessSession, MAIN_AGENDA_GROUP};
