//! Rule execution request

use crate::error::{Result, RulesError};
use rulefire_core::{Fact, FactValue, SessionType};
use std::fmt;

/// Input of one `RulesEngine` call.
///
/// Built with [`RulesRequest::builder`] and consumed by the engine.
#[derive(Debug, Clone)]
pub struct RulesRequest {
    session_name: Option<String>,
    base_name: Option<String>,
    session_type: SessionType,
    facts: Vec<Fact>,
    globals: Vec<(String, Fact)>,
    build_session_by_base: bool,
}

impl RulesRequest {
    pub fn builder() -> RulesRequestBuilder {
        RulesRequestBuilder::default()
    }

    pub fn session_name(&self) -> Option<&str> {
        self.session_name.as_deref()
    }

    pub fn base_name(&self) -> Option<&str> {
        self.base_name.as_deref()
    }

    pub fn session_type(&self) -> SessionType {
        self.session_type
    }

    pub fn facts(&self) -> &[Fact] {
        &self.facts
    }

    /// Global bindings in the order they were added
    pub fn globals(&self) -> &[(String, Fact)] {
        &self.globals
    }

    pub fn build_session_by_base(&self) -> bool {
        self.build_session_by_base
    }

    pub(crate) fn into_inputs(self) -> (Vec<(String, Fact)>, Vec<Fact>) {
        (self.globals, self.facts)
    }
}

impl fmt::Display for RulesRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let globals: Vec<&str> = self.globals.iter().map(|(name, _)| name.as_str()).collect();
        write!(
            f,
            "RulesRequest(type={}, session={}, base={}, by_base={}, facts={}, globals=[{}])",
            self.session_type,
            self.session_name.as_deref().unwrap_or("-"),
            self.base_name.as_deref().unwrap_or("-"),
            self.build_session_by_base,
            self.facts.len(),
            globals.join(", ")
        )
    }
}

/// Builder for `RulesRequest`
#[derive(Debug, Default)]
pub struct RulesRequestBuilder {
    session_name: Option<String>,
    base_name: Option<String>,
    session_type: SessionType,
    facts: Vec<Fact>,
    globals: Vec<(String, Fact)>,
    build_session_by_base: bool,
}

impl RulesRequestBuilder {
    /// Name of a session declared in the container
    pub fn session_name(mut self, name: impl Into<String>) -> Self {
        self.session_name = Some(name.into());
        self
    }

    /// Name of a knowledge base; used when `build_session_by_base` is set
    pub fn base_name(mut self, name: impl Into<String>) -> Self {
        self.base_name = Some(name.into());
        self
    }

    pub fn session_type(mut self, session_type: SessionType) -> Self {
        self.session_type = session_type;
        self
    }

    pub fn stateless(self) -> Self {
        self.session_type(SessionType::Stateless)
    }

    /// Create a fresh session from `base_name` instead of a named session
    pub fn build_session_by_base(mut self, enabled: bool) -> Self {
        self.build_session_by_base = enabled;
        self
    }

    pub fn fact<T: FactValue>(self, value: T) -> Self {
        self.fact_value(Fact::new(value))
    }

    pub fn fact_value(mut self, fact: Fact) -> Self {
        self.facts.push(fact);
        self
    }

    pub fn facts(mut self, facts: impl IntoIterator<Item = Fact>) -> Self {
        self.facts.extend(facts);
        self
    }

    pub fn global<T: FactValue>(self, name: impl Into<String>, value: T) -> Self {
        self.global_value(name, Fact::new(value))
    }

    pub fn global_value(mut self, name: impl Into<String>, value: Fact) -> Self {
        self.globals.push((name.into(), value));
        self
    }

    /// Finish the request; global names must be non-empty and unique
    pub fn build(self) -> Result<RulesRequest> {
        for (index, (name, _)) in self.globals.iter().enumerate() {
            if name.trim().is_empty() {
                return Err(RulesError::InvalidArgument(
                    "Global name must not be empty".to_string(),
                ));
            }
            if self.globals[..index].iter().any(|(other, _)| other == name) {
                return Err(RulesError::InvalidArgument(format!(
                    "Duplicate global binding: {}",
                    name
                )));
            }
        }

        Ok(RulesRequest {
            session_name: self.session_name,
            base_name: self.base_name,
            session_type: self.session_type,
            facts: self.facts,
            globals: self.globals,
            build_session_by_base: self.build_session_by_base,
        })
    }
}
