//! Agenda listener that logs fired rules

use rulefire_runtime::{AgendaEventListener, Match};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Logs the name of every rule after it fires and counts the firings
#[derive(Debug, Default)]
pub struct RuleAgendaListener {
    fired: AtomicUsize,
}

impl RuleAgendaListener {
    pub fn new() -> Self {
        Self::default()
    }

    /// Firings observed so far
    pub fn fired_count(&self) -> usize {
        self.fired.load(Ordering::Relaxed)
    }
}

impl AgendaEventListener for RuleAgendaListener {
    fn after_match_fired(&self, activation: &Match) {
        tracing::info!("Rules fired : {}", activation.rule);
        self.fired.fetch_add(1, Ordering::Relaxed);
    }
}
