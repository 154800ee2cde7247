//! Rule execution response

use rulefire_core::Fact;
use std::any::Any;
use std::fmt;

/// Output of one `RulesEngine` call: how many rules fired and which facts
/// the rules emitted, in emission order
#[derive(Debug, Clone)]
pub struct RulesResponse {
    fired_count: usize,
    facts: Vec<Fact>,
}

impl RulesResponse {
    pub fn new(fired_count: usize, facts: Vec<Fact>) -> Self {
        Self { fired_count, facts }
    }

    pub fn fired_count(&self) -> usize {
        self.fired_count
    }

    pub fn facts(&self) -> &[Fact] {
        &self.facts
    }

    pub fn into_facts(self) -> Vec<Fact> {
        self.facts
    }

    /// Emitted facts of exactly type `T`
    pub fn facts_of<T: Any>(&self) -> Vec<&T> {
        self.facts
            .iter()
            .filter_map(|fact| fact.downcast_ref::<T>())
            .collect()
    }
}

impl fmt::Display for RulesResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let types: Vec<&str> = self.facts.iter().map(Fact::type_name).collect();
        write!(
            f,
            "RulesResponse(fired={}, facts=[{}])",
            self.fired_count,
            types.join(", ")
        )
    }
}
