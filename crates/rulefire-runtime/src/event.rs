//! Agenda and working-memory events
//!
//! Listeners are passive: every callback has a no-op default, so an
//! implementation only overrides the events it cares about. Nothing a
//! listener does changes which rules fire.

use crate::session::FactHandle;
use rulefire_core::Fact;

/// A rule activation on the agenda
#[derive(Debug, Clone)]
pub struct Match {
    /// Name of the rule that matched
    pub rule: String,

    /// Salience of the rule
    pub salience: i32,

    /// Matched fact; `None` for rules that only test globals
    pub fact: Option<Fact>,

    /// Handle of the matched fact
    pub handle: Option<FactHandle>,
}

/// Observer of agenda activity
pub trait AgendaEventListener: Send + Sync {
    fn match_created(&self, _activation: &Match) {}

    fn match_cancelled(&self, _activation: &Match) {}

    fn before_match_fired(&self, _activation: &Match) {}

    fn after_match_fired(&self, _activation: &Match) {}

    fn agenda_group_pushed(&self, _group: &str) {}

    fn agenda_group_popped(&self, _group: &str) {}
}

/// A working-memory change
#[derive(Debug, Clone)]
pub struct ObjectEvent {
    pub handle: FactHandle,
    pub fact: Fact,

    /// Rule whose consequence caused the change, if any
    pub rule: Option<String>,
}

/// Observer of working-memory changes
pub trait RuleRuntimeEventListener: Send + Sync {
    fn object_inserted(&self, _event: &ObjectEvent) {}

    fn object_updated(&self, _event: &ObjectEvent) {}

    fn object_deleted(&self, _event: &ObjectEvent) {}
}
