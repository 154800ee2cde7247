//! Session helpers for rule tests

use rulefire_core::Fact;
use rulefire_runtime::{
    AgendaEventListener, BatchExecution, Command, KnowledgeBase, KnowledgeContainer,
    KnowledgeModule, Match, MemoryContainer, StatefulSession, StatelessSession,
};
use rulefire_sdk::{verify_container, Result, RulesError, OUT_FIRED};
use std::any::Any;
use std::sync::Arc;

/// Logs every fired rule at debug level
#[derive(Debug, Default)]
pub struct DebugAgendaListener;

impl AgendaEventListener for DebugAgendaListener {
    fn after_match_fired(&self, activation: &Match) {
        tracing::debug!("Rules getting fired {}", activation.rule);
    }
}

/// Verified container plus helpers to open sessions and fire rules.
///
/// Every session the harness opens carries a `DebugAgendaListener`.
///
/// ```rust,ignore
/// let harness = RulesTestHarness::from_module(module)?;
/// let mut session = harness.create_default_session()?;
/// let fired = RulesTestHarness::fire_rule(session.as_mut(), facts, &[])?;
/// let discounts = RulesTestHarness::facts_of::<Discount>(session.as_ref());
/// RulesTestHarness::destroy(session);
/// ```
pub struct RulesTestHarness {
    container: Arc<dyn KnowledgeContainer>,
}

impl RulesTestHarness {
    /// Compile and verify `module`
    pub fn from_module(module: KnowledgeModule) -> Result<Self> {
        Self::from_container(Arc::new(MemoryContainer::from_module(module)))
    }

    /// Verify and wrap an existing container
    pub fn from_container(container: Arc<dyn KnowledgeContainer>) -> Result<Self> {
        verify_container(container.as_ref())?;
        Ok(Self { container })
    }

    pub fn container(&self) -> &Arc<dyn KnowledgeContainer> {
        &self.container
    }

    pub fn create_default_session(&self) -> Result<Box<dyn StatefulSession>> {
        let session = self.container.new_session(None).map_err(resolution)?;
        Ok(with_debug_listener(session))
    }

    pub fn create_default_stateless_session(&self) -> Result<Box<dyn StatelessSession>> {
        let mut session = self
            .container
            .new_stateless_session(None)
            .map_err(resolution)?;
        session.add_agenda_listener(Arc::new(DebugAgendaListener));
        Ok(session)
    }

    pub fn create_session(&self, name: &str) -> Result<Box<dyn StatefulSession>> {
        let session = self.container.new_session(Some(name)).map_err(resolution)?;
        Ok(with_debug_listener(session))
    }

    pub fn create_stateless_session(&self, name: &str) -> Result<Box<dyn StatelessSession>> {
        let mut session = self
            .container
            .new_stateless_session(Some(name))
            .map_err(resolution)?;
        session.add_agenda_listener(Arc::new(DebugAgendaListener));
        Ok(session)
    }

    pub fn create_knowledge_base(&self, name: &str) -> Result<Arc<dyn KnowledgeBase>> {
        self.container.base(name).ok_or_else(|| {
            RulesError::SessionResolution(format!("Unknown knowledge base with name '{}'", name))
        })
    }

    /// Default stateful session of a module compiled on the spot
    pub fn session_from_module(module: KnowledgeModule) -> Result<Box<dyn StatefulSession>> {
        Self::from_module(module)?.create_default_session()
    }

    /// Set `globals`, insert `facts` and fire; returns the fired count
    pub fn fire_rule(
        session: &mut dyn StatefulSession,
        facts: Vec<Fact>,
        globals: &[(&str, Fact)],
    ) -> Result<usize> {
        for (name, value) in globals {
            session.set_global(name, value.clone())?;
        }
        for fact in facts {
            session.insert(fact)?;
        }
        Ok(session.fire_all_rules()?)
    }

    /// Set `globals`, then run one insert-and-fire batch
    pub fn fire_stateless_rule(
        session: &mut dyn StatelessSession,
        facts: Vec<Fact>,
        globals: &[(&str, Fact)],
    ) -> Result<usize> {
        for (name, value) in globals {
            session.set_global(name, value.clone())?;
        }
        let batch = BatchExecution::new(vec![
            Command::insert_elements(facts),
            Command::fire_all_rules(OUT_FIRED),
        ]);
        let results = session.execute(batch)?;
        Ok(results.get::<usize>(OUT_FIRED).copied().unwrap_or_default())
    }

    /// Working-memory facts of exactly type `T`
    pub fn facts_of<T: Any + Clone>(session: &dyn StatefulSession) -> Vec<T> {
        session
            .objects()
            .iter()
            .filter_map(|fact| fact.downcast_ref::<T>().cloned())
            .collect()
    }

    /// Dispose the session and release its working memory
    pub fn destroy(mut session: Box<dyn StatefulSession>) {
        session.dispose();
    }
}

fn with_debug_listener(mut session: Box<dyn StatefulSession>) -> Box<dyn StatefulSession> {
    session.add_agenda_listener(Arc::new(DebugAgendaListener));
    session
}

fn resolution(error: rulefire_runtime::RuntimeError) -> RulesError {
    RulesError::SessionResolution(error.to_string())
}
