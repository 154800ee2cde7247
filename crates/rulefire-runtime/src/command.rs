//! Batch commands for stateless sessions

use rulefire_core::Fact;
use std::any::Any;
use std::collections::HashMap;

/// One step of a stateless batch
#[derive(Debug, Clone)]
pub enum Command {
    /// Insert every fact, in order
    InsertElements(Vec<Fact>),

    /// Set a global for the rest of the batch
    SetGlobal { name: String, value: Fact },

    /// Fire all activations; store the fired count under `out_identifier`
    FireAllRules { out_identifier: Option<String> },

    /// Store a snapshot of working memory under `out_identifier`
    GetObjects { out_identifier: String },
}

impl Command {
    pub fn insert_elements(facts: Vec<Fact>) -> Self {
        Command::InsertElements(facts)
    }

    pub fn set_global(name: impl Into<String>, value: Fact) -> Self {
        Command::SetGlobal {
            name: name.into(),
            value,
        }
    }

    pub fn fire_all_rules(out_identifier: impl Into<String>) -> Self {
        Command::FireAllRules {
            out_identifier: Some(out_identifier.into()),
        }
    }

    pub fn get_objects(out_identifier: impl Into<String>) -> Self {
        Command::GetObjects {
            out_identifier: out_identifier.into(),
        }
    }
}

/// Ordered list of commands executed atomically by a stateless session
#[derive(Debug, Clone, Default)]
pub struct BatchExecution {
    commands: Vec<Command>,
}

impl BatchExecution {
    pub fn new(commands: Vec<Command>) -> Self {
        Self { commands }
    }

    pub fn push(&mut self, command: Command) {
        self.commands.push(command);
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn into_commands(self) -> Vec<Command> {
        self.commands
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// Named outputs of a batch
#[derive(Debug, Clone, Default)]
pub struct ExecutionResults {
    values: HashMap<String, Fact>,
}

impl ExecutionResults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, identifier: impl Into<String>, value: Fact) {
        self.values.insert(identifier.into(), value);
    }

    pub fn value(&self, identifier: &str) -> Option<&Fact> {
        self.values.get(identifier)
    }

    /// Typed view of an output; `None` if absent or of another type
    pub fn get<T: Any>(&self, identifier: &str) -> Option<&T> {
        self.values.get(identifier).and_then(|v| v.downcast_ref::<T>())
    }

    pub fn identifiers(&self) -> Vec<&str> {
        self.values.keys().map(String::as_str).collect()
    }
}
