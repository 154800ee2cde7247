//! Working memory and agenda bookkeeping

use crate::rule::{Globals, Rule};
use crate::session::FactHandle;
use rulefire_core::Fact;
use std::cmp::Reverse;
use std::collections::{BTreeMap, HashSet};

/// Facts keyed by handle; handles grow monotonically so key order is
/// insertion order
#[derive(Debug, Default)]
pub(crate) struct WorkingMemory {
    next_handle: u64,
    facts: BTreeMap<FactHandle, Fact>,
}

impl WorkingMemory {
    pub(crate) fn insert(&mut self, fact: Fact) -> FactHandle {
        self.next_handle += 1;
        let handle = FactHandle(self.next_handle);
        self.facts.insert(handle, fact);
        handle
    }

    /// Returns the previous fact, or `None` if the handle is unknown
    pub(crate) fn replace(&mut self, handle: FactHandle, fact: Fact) -> Option<Fact> {
        match self.facts.get_mut(&handle) {
            Some(slot) => Some(std::mem::replace(slot, fact)),
            None => None,
        }
    }

    pub(crate) fn remove(&mut self, handle: FactHandle) -> Option<Fact> {
        self.facts.remove(&handle)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (FactHandle, &Fact)> {
        self.facts.iter().map(|(h, f)| (*h, f))
    }

    pub(crate) fn objects(&self) -> Vec<Fact> {
        self.facts.values().cloned().collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.facts.len()
    }
}

/// One rule matched against one fact (or against globals only)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct ActivationKey {
    pub(crate) rule: usize,
    pub(crate) handle: Option<FactHandle>,
}

#[derive(Debug, Clone)]
pub(crate) struct Activation {
    pub(crate) key: ActivationKey,
    pub(crate) fact: Option<Fact>,
}

/// Pending activations plus the refraction set of already-fired ones
#[derive(Debug, Default)]
pub(crate) struct Agenda {
    pending: Vec<Activation>,
    fired: HashSet<ActivationKey>,
}

/// Result of re-evaluating the agenda
pub(crate) struct AgendaDelta {
    pub(crate) created: Vec<Activation>,
    pub(crate) cancelled: Vec<Activation>,
}

impl Agenda {
    /// Recompute pending activations.
    ///
    /// Order: salience descending, then rule declaration order, then fact
    /// insertion order.
    pub(crate) fn refresh(
        &mut self,
        rules: &[Rule],
        memory: &WorkingMemory,
        globals: &Globals,
    ) -> AgendaDelta {
        let mut current = Vec::new();
        for (index, rule) in rules.iter().enumerate() {
            if rule.fact_type().is_some() {
                for (handle, fact) in memory.iter() {
                    let key = ActivationKey {
                        rule: index,
                        handle: Some(handle),
                    };
                    if !self.fired.contains(&key) && rule.matches_fact(fact, globals) {
                        current.push(Activation {
                            key,
                            fact: Some(fact.clone()),
                        });
                    }
                }
            } else {
                let key = ActivationKey {
                    rule: index,
                    handle: None,
                };
                if !self.fired.contains(&key) && rule.matches_globals(globals) {
                    current.push(Activation { key, fact: None });
                }
            }
        }
        current.sort_by_key(|a| Reverse(rules[a.key.rule].salience()));

        let created = current
            .iter()
            .filter(|a| !self.pending.iter().any(|p| p.key == a.key))
            .cloned()
            .collect();
        let cancelled = self
            .pending
            .iter()
            .filter(|p| !current.iter().any(|a| a.key == p.key))
            .cloned()
            .collect();
        self.pending = current;

        AgendaDelta { created, cancelled }
    }

    /// Take the highest-priority activation and mark it fired
    pub(crate) fn next(&mut self) -> Option<Activation> {
        if self.pending.is_empty() {
            return None;
        }
        let activation = self.pending.remove(0);
        self.fired.insert(activation.key);
        Some(activation)
    }

    /// Allow activations on `handle` to fire again
    pub(crate) fn reset_handle(&mut self, handle: FactHandle) {
        self.fired.retain(|key| key.handle != Some(handle));
    }

    pub(crate) fn pending_len(&self) -> usize {
        self.pending.len()
    }
}
