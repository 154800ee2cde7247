//! Execution contexts produced by a knowledge container

use crate::channel::Channel;
use crate::command::{BatchExecution, ExecutionResults};
use crate::error::Result;
use crate::event::{AgendaEventListener, RuleRuntimeEventListener};
use rulefire_core::Fact;
use std::fmt;
use std::sync::Arc;

/// Agenda group every activation belongs to
pub const MAIN_AGENDA_GROUP: &str = "MAIN";

/// Handle to a fact inside one session's working memory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FactHandle(pub u64);

impl fmt::Display for FactHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Session with working memory that lives until `dispose`.
///
/// Not shareable between threads; one owner drives it at a time.
pub trait StatefulSession: Send {
    /// Identifier used in logs
    fn id(&self) -> &str;

    fn register_channel(&mut self, name: &str, channel: Arc<dyn Channel>);

    fn add_agenda_listener(&mut self, listener: Arc<dyn AgendaEventListener>);

    fn add_runtime_listener(&mut self, listener: Arc<dyn RuleRuntimeEventListener>);

    fn set_global(&mut self, name: &str, value: Fact) -> Result<()>;

    fn insert(&mut self, fact: Fact) -> Result<FactHandle>;

    /// Replace the fact behind `handle`; its activations may fire again
    fn update(&mut self, handle: FactHandle, fact: Fact) -> Result<()>;

    fn delete(&mut self, handle: FactHandle) -> Result<()>;

    /// Fire activations until the agenda is empty; returns how many fired
    fn fire_all_rules(&mut self) -> Result<usize>;

    /// Snapshot of working memory in insertion order
    fn objects(&self) -> Vec<Fact>;

    /// Release working memory, agenda and listeners. Idempotent.
    fn dispose(&mut self);

    fn is_disposed(&self) -> bool;
}

/// One-shot session driven by a command batch
pub trait StatelessSession: Send {
    fn register_channel(&mut self, name: &str, channel: Arc<dyn Channel>);

    fn add_agenda_listener(&mut self, listener: Arc<dyn AgendaEventListener>);

    fn add_runtime_listener(&mut self, listener: Arc<dyn RuleRuntimeEventListener>);

    fn set_global(&mut self, name: &str, value: Fact) -> Result<()>;

    /// Run every command on a fresh working memory
    fn execute(&mut self, batch: BatchExecution) -> Result<ExecutionResults>;
}
