//! Knowledge module declarations
//!
//! A module lists the knowledge bases to compile and the sessions the
//! container offers by name. It is the input of `MemoryContainer::from_module`
//! and what a `ModuleRepository` stores per release.

use crate::rule::Rule;
use rulefire_core::SessionType;
use serde::{Deserialize, Serialize};

/// A named session declaration inside a base
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionModel {
    pub name: String,

    #[serde(default)]
    pub session_type: SessionType,

    /// Used when a request names no session
    #[serde(default)]
    pub default: bool,
}

impl SessionModel {
    pub fn stateful(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            session_type: SessionType::Stateful,
            default: false,
        }
    }

    pub fn stateless(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            session_type: SessionType::Stateless,
            default: false,
        }
    }

    pub fn as_default(mut self) -> Self {
        self.default = true;
        self
    }
}

/// A knowledge base: its rules and the sessions built from it
#[derive(Debug, Clone)]
pub struct BaseModel {
    pub name: String,
    pub default: bool,
    pub rules: Vec<Rule>,
    pub sessions: Vec<SessionModel>,
}

impl BaseModel {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default: false,
            rules: Vec::new(),
            sessions: Vec::new(),
        }
    }

    /// Mark as the base used for default sessions
    pub fn as_default(mut self) -> Self {
        self.default = true;
        self
    }

    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn with_rules(mut self, rules: impl IntoIterator<Item = Rule>) -> Self {
        self.rules.extend(rules);
        self
    }

    pub fn with_session(mut self, session: SessionModel) -> Self {
        self.sessions.push(session);
        self
    }
}

/// The full set of bases a container is built from
#[derive(Debug, Clone, Default)]
pub struct KnowledgeModule {
    pub bases: Vec<BaseModel>,
}

impl KnowledgeModule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base(mut self, base: BaseModel) -> Self {
        self.bases.push(base);
        self
    }

    /// Module with one default base holding `rules`, plus a default stateful
    /// and a default stateless session
    pub fn single(base_name: impl Into<String>, rules: impl IntoIterator<Item = Rule>) -> Self {
        let base_name = base_name.into();
        let base = BaseModel::new(base_name.clone())
            .as_default()
            .with_rules(rules)
            .with_session(SessionModel::stateful(format!("{}.session", base_name)).as_default())
            .with_session(
                SessionModel::stateless(format!("{}.stateless", base_name)).as_default(),
            );
        Self::new().with_base(base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_module_declares_defaults() {
        let module = KnowledgeModule::single("pricing", vec![Rule::builder("r").then(|_| Ok(()))]);

        let base = &module.bases[0];
        assert!(base.default);
        assert_eq!(base.rules.len(), 1);
        assert_eq!(base.sessions.len(), 2);
        assert!(base.sessions.iter().all(|s| s.default));
        assert_eq!(base.sessions[0].name, "pricing.session");
        assert_eq!(base.sessions[1].session_type, SessionType::Stateless);
    }
}
