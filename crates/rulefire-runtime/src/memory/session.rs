//! Stateful and stateless sessions of the in-memory engine

use super::agenda::{Activation, Agenda, WorkingMemory};
use super::container::CompiledBase;
use crate::channel::Channel;
use crate::command::{BatchExecution, Command, ExecutionResults};
use crate::error::{Result, RuntimeError};
use crate::event::{AgendaEventListener, Match, ObjectEvent, RuleRuntimeEventListener};
use crate::rule::{Globals, RuleContext};
use crate::session::{FactHandle, StatefulSession, StatelessSession, MAIN_AGENDA_GROUP};
use rulefire_core::Fact;
use std::collections::HashMap;
use std::sync::Arc;

/// Working memory, agenda and attachments of one live session
struct RuleRuntime {
    base: Arc<CompiledBase>,
    memory: WorkingMemory,
    agenda: Agenda,
    globals: Globals,
    channels: HashMap<String, Arc<dyn Channel>>,
    agenda_listeners: Vec<Arc<dyn AgendaEventListener>>,
    runtime_listeners: Vec<Arc<dyn RuleRuntimeEventListener>>,
}

impl RuleRuntime {
    fn new(base: Arc<CompiledBase>) -> Self {
        Self {
            base,
            memory: WorkingMemory::default(),
            agenda: Agenda::default(),
            globals: Globals::new(),
            channels: HashMap::new(),
            agenda_listeners: Vec::new(),
            runtime_listeners: Vec::new(),
        }
    }

    fn set_global(&mut self, name: &str, value: Fact) -> Result<()> {
        if !self.base.declares_global(name) {
            return Err(RuntimeError::UndeclaredGlobal(name.to_string()));
        }
        self.globals.set(name, value);
        self.refresh_agenda();
        Ok(())
    }

    fn insert(&mut self, fact: Fact, rule: Option<&str>) -> FactHandle {
        let handle = self.memory.insert(fact.clone());
        tracing::trace!("Inserted {} as {}", fact.type_name(), handle);
        let event = ObjectEvent {
            handle,
            fact,
            rule: rule.map(str::to_string),
        };
        for listener in &self.runtime_listeners {
            listener.object_inserted(&event);
        }
        self.refresh_agenda();
        handle
    }

    fn update(&mut self, handle: FactHandle, fact: Fact) -> Result<()> {
        self.memory
            .replace(handle, fact.clone())
            .ok_or(RuntimeError::UnknownFactHandle(handle.0))?;
        self.agenda.reset_handle(handle);
        let event = ObjectEvent {
            handle,
            fact,
            rule: None,
        };
        for listener in &self.runtime_listeners {
            listener.object_updated(&event);
        }
        self.refresh_agenda();
        Ok(())
    }

    fn delete(&mut self, handle: FactHandle) -> Result<()> {
        let fact = self
            .memory
            .remove(handle)
            .ok_or(RuntimeError::UnknownFactHandle(handle.0))?;
        self.agenda.reset_handle(handle);
        let event = ObjectEvent {
            handle,
            fact,
            rule: None,
        };
        for listener in &self.runtime_listeners {
            listener.object_deleted(&event);
        }
        self.refresh_agenda();
        Ok(())
    }

    fn refresh_agenda(&mut self) {
        let delta = self
            .agenda
            .refresh(&self.base.rules, &self.memory, &self.globals);
        for activation in &delta.cancelled {
            let event = self.to_match(activation);
            for listener in &self.agenda_listeners {
                listener.match_cancelled(&event);
            }
        }
        for activation in &delta.created {
            let event = self.to_match(activation);
            for listener in &self.agenda_listeners {
                listener.match_created(&event);
            }
        }
    }

    fn to_match(&self, activation: &Activation) -> Match {
        let rule = &self.base.rules[activation.key.rule];
        Match {
            rule: rule.name().to_string(),
            salience: rule.salience(),
            fact: activation.fact.clone(),
            handle: activation.key.handle,
        }
    }

    fn fire_all_rules(&mut self) -> Result<usize> {
        for listener in &self.agenda_listeners {
            listener.agenda_group_pushed(MAIN_AGENDA_GROUP);
        }
        let result = self.fire_pending();
        for listener in &self.agenda_listeners {
            listener.agenda_group_popped(MAIN_AGENDA_GROUP);
        }
        result
    }

    fn fire_pending(&mut self) -> Result<usize> {
        let base = Arc::clone(&self.base);
        let mut fired = 0;

        while let Some(activation) = self.agenda.next() {
            let rule = &base.rules[activation.key.rule];
            let event = self.to_match(&activation);
            for listener in &self.agenda_listeners {
                listener.before_match_fired(&event);
            }

            tracing::debug!("Firing rule '{}' in base '{}'", rule.name(), base.name);
            let mut ctx = RuleContext::new(
                rule.name(),
                activation.fact.as_ref(),
                &self.globals,
                &self.channels,
            );
            rule.fire(&mut ctx)?;
            let inserted = ctx.into_inserted();
            fired += 1;

            for listener in &self.agenda_listeners {
                listener.after_match_fired(&event);
            }
            for fact in inserted {
                self.insert(fact, Some(rule.name()));
            }
        }

        tracing::debug!(
            "Fired {} rules in base '{}' ({} facts in working memory)",
            fired,
            base.name,
            self.memory.len()
        );
        Ok(fired)
    }
}

/// Stateful session over a compiled base
pub struct MemorySession {
    id: String,
    runtime: Option<RuleRuntime>,
}

impl MemorySession {
    pub(crate) fn new(base: Arc<CompiledBase>) -> Self {
        let id = uuid::Uuid::new_v4().to_string();
        tracing::debug!("Created session {} from base '{}'", id, base.name);
        Self {
            id,
            runtime: Some(RuleRuntime::new(base)),
        }
    }

    fn runtime(&mut self) -> Result<&mut RuleRuntime> {
        self.runtime
            .as_mut()
            .ok_or_else(|| RuntimeError::SessionDisposed(self.id.clone()))
    }
}

impl StatefulSession for MemorySession {
    fn id(&self) -> &str {
        &self.id
    }

    fn register_channel(&mut self, name: &str, channel: Arc<dyn Channel>) {
        if let Some(runtime) = self.runtime.as_mut() {
            runtime.channels.insert(name.to_string(), channel);
        }
    }

    fn add_agenda_listener(&mut self, listener: Arc<dyn AgendaEventListener>) {
        if let Some(runtime) = self.runtime.as_mut() {
            runtime.agenda_listeners.push(listener);
        }
    }

    fn add_runtime_listener(&mut self, listener: Arc<dyn RuleRuntimeEventListener>) {
        if let Some(runtime) = self.runtime.as_mut() {
            runtime.runtime_listeners.push(listener);
        }
    }

    fn set_global(&mut self, name: &str, value: Fact) -> Result<()> {
        self.runtime()?.set_global(name, value)
    }

    fn insert(&mut self, fact: Fact) -> Result<FactHandle> {
        Ok(self.runtime()?.insert(fact, None))
    }

    fn update(&mut self, handle: FactHandle, fact: Fact) -> Result<()> {
        self.runtime()?.update(handle, fact)
    }

    fn delete(&mut self, handle: FactHandle) -> Result<()> {
        self.runtime()?.delete(handle)
    }

    fn fire_all_rules(&mut self) -> Result<usize> {
        self.runtime()?.fire_all_rules()
    }

    fn objects(&self) -> Vec<Fact> {
        self.runtime
            .as_ref()
            .map(|runtime| runtime.memory.objects())
            .unwrap_or_default()
    }

    fn dispose(&mut self) {
        if self.runtime.take().is_some() {
            tracing::debug!("Disposed session {}", self.id);
        }
    }

    fn is_disposed(&self) -> bool {
        self.runtime.is_none()
    }
}

/// Stateless session: each `execute` runs on a fresh working memory that
/// inherits this session's globals, channels and listeners
pub struct MemoryStatelessSession {
    base: Arc<CompiledBase>,
    globals: Globals,
    channels: HashMap<String, Arc<dyn Channel>>,
    agenda_listeners: Vec<Arc<dyn AgendaEventListener>>,
    runtime_listeners: Vec<Arc<dyn RuleRuntimeEventListener>>,
}

impl MemoryStatelessSession {
    pub(crate) fn new(base: Arc<CompiledBase>) -> Self {
        Self {
            base,
            globals: Globals::new(),
            channels: HashMap::new(),
            agenda_listeners: Vec::new(),
            runtime_listeners: Vec::new(),
        }
    }

    fn runtime(&self) -> RuleRuntime {
        let mut runtime = RuleRuntime::new(Arc::clone(&self.base));
        runtime.globals = self.globals.clone();
        runtime.channels = self.channels.clone();
        runtime.agenda_listeners = self.agenda_listeners.clone();
        runtime.runtime_listeners = self.runtime_listeners.clone();
        runtime
    }
}

impl StatelessSession for MemoryStatelessSession {
    fn register_channel(&mut self, name: &str, channel: Arc<dyn Channel>) {
        self.channels.insert(name.to_string(), channel);
    }

    fn add_agenda_listener(&mut self, listener: Arc<dyn AgendaEventListener>) {
        self.agenda_listeners.push(listener);
    }

    fn add_runtime_listener(&mut self, listener: Arc<dyn RuleRuntimeEventListener>) {
        self.runtime_listeners.push(listener);
    }

    fn set_global(&mut self, name: &str, value: Fact) -> Result<()> {
        if !self.base.declares_global(name) {
            return Err(RuntimeError::UndeclaredGlobal(name.to_string()));
        }
        self.globals.set(name, value);
        Ok(())
    }

    fn execute(&mut self, batch: BatchExecution) -> Result<ExecutionResults> {
        let mut runtime = self.runtime();
        let mut results = ExecutionResults::new();

        for command in batch.into_commands() {
            match command {
                Command::InsertElements(facts) => {
                    for fact in facts {
                        runtime.insert(fact, None);
                    }
                }
                Command::SetGlobal { name, value } => {
                    runtime.set_global(&name, value)?;
                }
                Command::FireAllRules { out_identifier } => {
                    let fired = runtime.fire_all_rules()?;
                    if let Some(identifier) = out_identifier {
                        results.insert(identifier, Fact::new(fired));
                    }
                }
                Command::GetObjects { out_identifier } => {
                    results.insert(out_identifier, Fact::new(runtime.memory.objects()));
                }
            }
        }

        Ok(results)
    }
}
