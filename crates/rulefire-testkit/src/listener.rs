//! Working-memory recorder

use rulefire_core::Fact;
use rulefire_runtime::{ObjectEvent, RuleRuntimeEventListener};
use std::any::Any;
use std::sync::{Mutex, PoisonError};

/// Collects every fact inserted into the session it listens to, whether by
/// the caller or by a rule consequence
#[derive(Debug, Default)]
pub struct RuleRuntimeListener {
    inserted: Mutex<Vec<Fact>>,
}

impl RuleRuntimeListener {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserted facts in insertion order
    pub fn inserted(&self) -> Vec<Fact> {
        self.inserted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Inserted facts of exactly type `T`
    pub fn inserted_of<T: Any + Clone>(&self) -> Vec<T> {
        self.inserted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter_map(|fact| fact.downcast_ref::<T>().cloned())
            .collect()
    }
}

impl RuleRuntimeEventListener for RuleRuntimeListener {
    fn object_inserted(&self, event: &ObjectEvent) {
        tracing::debug!("Inserted new fact {:?}", event.fact);
        self.inserted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.fact.clone());
    }
}
