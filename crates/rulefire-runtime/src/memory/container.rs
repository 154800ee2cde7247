//! Module compilation and the in-memory container

use super::session::{MemorySession, MemoryStatelessSession};
use crate::container::{KnowledgeBase, KnowledgeContainer};
use crate::error::{Result, RuntimeError};
use crate::module::KnowledgeModule;
use crate::rule::Rule;
use crate::session::{StatefulSession, StatelessSession};
use rulefire_core::{Level, Message, ReleaseId, Results, SessionType};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Rules of one base after verification
#[derive(Debug)]
pub(crate) struct CompiledBase {
    pub(crate) name: String,
    pub(crate) rules: Vec<Rule>,
    globals: HashSet<String>,
}

impl CompiledBase {
    pub(crate) fn declares_global(&self, name: &str) -> bool {
        self.globals.contains(name)
    }
}

/// Knowledge base handle handed out by `MemoryContainer::base`
#[derive(Debug, Clone)]
pub struct MemoryKnowledgeBase {
    inner: Arc<CompiledBase>,
}

impl KnowledgeBase for MemoryKnowledgeBase {
    fn name(&self) -> &str {
        &self.inner.name
    }

    fn rule_names(&self) -> Vec<String> {
        self.inner
            .rules
            .iter()
            .map(|r| r.name().to_string())
            .collect()
    }

    fn new_session(&self) -> Box<dyn StatefulSession> {
        Box::new(MemorySession::new(Arc::clone(&self.inner)))
    }

    fn new_stateless_session(&self) -> Box<dyn StatelessSession> {
        Box::new(MemoryStatelessSession::new(Arc::clone(&self.inner)))
    }
}

#[derive(Debug, Clone, Copy)]
struct SessionEntry {
    base: usize,
    session_type: SessionType,
}

/// Container built from a `KnowledgeModule`.
///
/// Building never fails; problems are collected as messages and reported by
/// `verify`. Broken declarations (duplicate names, extra defaults) are
/// skipped so the rest of the module stays usable.
#[derive(Debug)]
pub struct MemoryContainer {
    release_id: Option<ReleaseId>,
    bases: Vec<Arc<CompiledBase>>,
    sessions: HashMap<String, SessionEntry>,
    default_base: Option<usize>,
    default_sessions: HashMap<SessionType, usize>,
    results: Results,
}

impl MemoryContainer {
    /// Build from a module that belongs to no release
    pub fn from_module(module: KnowledgeModule) -> Self {
        Self::build(None, module)
    }

    pub fn for_release(release_id: ReleaseId, module: KnowledgeModule) -> Self {
        Self::build(Some(release_id), module)
    }

    fn build(release_id: Option<ReleaseId>, module: KnowledgeModule) -> Self {
        let mut container = Self {
            release_id,
            bases: Vec::new(),
            sessions: HashMap::new(),
            default_base: None,
            default_sessions: HashMap::new(),
            results: Results::new(),
        };

        for base in module.bases {
            if container.bases.iter().any(|b| b.name == base.name) {
                container.report(Message::new(
                    Level::Error,
                    &base.name,
                    format!("Duplicate knowledge base name: {}", base.name),
                ));
                continue;
            }

            let index = container.bases.len();
            if base.default {
                match container.default_base {
                    Some(existing) => container.report(Message::new(
                        Level::Error,
                        &base.name,
                        format!(
                            "Only one default knowledge base is allowed; '{}' is already the default",
                            container.bases[existing].name
                        ),
                    )),
                    None => container.default_base = Some(index),
                }
            }

            let compiled = container.compile_base(&base.name, base.rules);
            container.bases.push(Arc::new(compiled));

            for session in base.sessions {
                let path = format!("{}/{}", base.name, session.name);
                if container.sessions.contains_key(&session.name) {
                    container.report(Message::new(
                        Level::Error,
                        path,
                        format!("Duplicate session name: {}", session.name),
                    ));
                    continue;
                }
                if session.default {
                    if container.default_sessions.contains_key(&session.session_type) {
                        container.report(Message::new(
                            Level::Error,
                            path.clone(),
                            format!(
                                "Only one default {} session is allowed; ignoring '{}' as default",
                                session.session_type, session.name
                            ),
                        ));
                    } else {
                        container
                            .default_sessions
                            .insert(session.session_type, index);
                    }
                }
                container.sessions.insert(
                    session.name,
                    SessionEntry {
                        base: index,
                        session_type: session.session_type,
                    },
                );
            }
        }

        container
    }

    fn compile_base(&mut self, base_name: &str, rules: Vec<Rule>) -> CompiledBase {
        if rules.is_empty() {
            self.report(Message::new(
                Level::Warning,
                base_name,
                format!("Knowledge base '{}' contains no rules", base_name),
            ));
        }

        let mut names = HashSet::new();
        let mut globals = HashSet::new();
        let mut compiled = Vec::with_capacity(rules.len());
        for rule in rules {
            let location = rule.location();
            if rule.name().trim().is_empty() {
                self.report(
                    Message::new(Level::Error, location.file, "Rule name must not be blank")
                        .at(location.line, location.column),
                );
                continue;
            }
            if !names.insert(rule.name().to_string()) {
                self.report(
                    Message::new(
                        Level::Error,
                        location.file,
                        format!(
                            "Duplicate rule name '{}' in knowledge base '{}'",
                            rule.name(),
                            base_name
                        ),
                    )
                    .at(location.line, location.column),
                );
                continue;
            }
            globals.extend(rule.declared_globals().iter().cloned());
            compiled.push(rule);
        }

        self.report(Message::new(
            Level::Info,
            base_name,
            format!(
                "Knowledge base '{}' compiled with {} rules",
                base_name,
                compiled.len()
            ),
        ));

        CompiledBase {
            name: base_name.to_string(),
            rules: compiled,
            globals,
        }
    }

    fn report(&mut self, message: Message) {
        tracing::debug!("Verification message: {}", message);
        self.results.push(message);
    }

    fn session_base(
        &self,
        name: Option<&str>,
        requested: SessionType,
    ) -> Result<Arc<CompiledBase>> {
        let index = match name {
            Some(name) => {
                let entry = self
                    .sessions
                    .get(name)
                    .ok_or_else(|| RuntimeError::UnknownSession(name.to_string()))?;
                if entry.session_type != requested {
                    return Err(RuntimeError::WrongSessionType {
                        name: name.to_string(),
                        declared: entry.session_type,
                        requested,
                    });
                }
                entry.base
            }
            None => self
                .default_sessions
                .get(&requested)
                .copied()
                .or(self.default_base)
                .ok_or(RuntimeError::NoDefaultSession(requested))?,
        };
        Ok(Arc::clone(&self.bases[index]))
    }
}

impl KnowledgeContainer for MemoryContainer {
    fn release_id(&self) -> Option<ReleaseId> {
        self.release_id.clone()
    }

    fn verify(&self) -> Results {
        self.results.clone()
    }

    fn base_names(&self) -> Vec<String> {
        self.bases.iter().map(|b| b.name.clone()).collect()
    }

    fn base(&self, name: &str) -> Option<Arc<dyn KnowledgeBase>> {
        self.bases.iter().find(|b| b.name == name).map(|b| {
            Arc::new(MemoryKnowledgeBase {
                inner: Arc::clone(b),
            }) as Arc<dyn KnowledgeBase>
        })
    }

    fn new_session(&self, name: Option<&str>) -> Result<Box<dyn StatefulSession>> {
        let base = self.session_base(name, SessionType::Stateful)?;
        Ok(Box::new(MemorySession::new(base)))
    }

    fn new_stateless_session(&self, name: Option<&str>) -> Result<Box<dyn StatelessSession>> {
        let base = self.session_base(name, SessionType::Stateless)?;
        Ok(Box::new(MemoryStatelessSession::new(base)))
    }
}
