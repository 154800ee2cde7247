//! Rules written in Rust
//!
//! A rule has one pattern (either "every fact of type `T` passing a test" or
//! "a test over globals only"), an optional salience, the globals it
//! declares, and a consequence closure. Rules are built with `Rule::builder`:
//!
//! ```rust,ignore
//! let rule = Rule::builder("ApplyDiscount")
//!     .salience(10)
//!     .when::<Order>(|order, _| order.amount > 100.0)
//!     .then(|ctx| {
//!         let order = ctx.fact_as::<Order>()?;
//!         ctx.send("send-channel", Discount { percent: 10, order_id: order.id })
//!     });
//! ```

use crate::channel::Channel;
use crate::error::{Result, RuntimeError};
use rulefire_core::{CoreError, Fact, FactType, FactValue};
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::panic::Location;
use std::sync::Arc;

type FactTest = dyn Fn(&Fact, &Globals) -> bool + Send + Sync;
type GlobalTest = dyn Fn(&Globals) -> bool + Send + Sync;
type Consequence = dyn Fn(&mut RuleContext<'_>) -> Result<()> + Send + Sync;

/// Where a rule was declared; reported in verification messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    pub file: &'static str,
    pub line: u32,
    pub column: u32,
}

impl SourceLocation {
    #[track_caller]
    fn caller() -> Self {
        let location = Location::caller();
        Self {
            file: location.file(),
            line: location.line(),
            column: location.column(),
        }
    }
}

#[derive(Clone)]
pub(crate) enum Pattern {
    Fact {
        fact_type: FactType,
        test: Arc<FactTest>,
    },
    Globals {
        test: Arc<GlobalTest>,
    },
}

/// A compiled rule
#[derive(Clone)]
pub struct Rule {
    name: String,
    salience: i32,
    pattern: Pattern,
    globals: Vec<String>,
    consequence: Arc<Consequence>,
    location: SourceLocation,
}

impl Rule {
    /// Start a rule; the caller's source location is recorded
    #[track_caller]
    pub fn builder(name: impl Into<String>) -> RuleBuilder {
        RuleBuilder {
            name: name.into(),
            salience: 0,
            pattern: None,
            globals: Vec::new(),
            location: SourceLocation::caller(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn salience(&self) -> i32 {
        self.salience
    }

    /// Globals this rule may read
    pub fn declared_globals(&self) -> &[String] {
        &self.globals
    }

    pub fn location(&self) -> SourceLocation {
        self.location
    }

    /// Type matched by the pattern; `None` for globals-only rules
    pub fn fact_type(&self) -> Option<FactType> {
        match &self.pattern {
            Pattern::Fact { fact_type, .. } => Some(*fact_type),
            Pattern::Globals { .. } => None,
        }
    }

    pub(crate) fn matches_fact(&self, fact: &Fact, globals: &Globals) -> bool {
        match &self.pattern {
            Pattern::Fact { fact_type, test } => fact_type.matches(fact) && test(fact, globals),
            Pattern::Globals { .. } => false,
        }
    }

    pub(crate) fn matches_globals(&self, globals: &Globals) -> bool {
        match &self.pattern {
            Pattern::Fact { .. } => false,
            Pattern::Globals { test } => test(globals),
        }
    }

    pub(crate) fn fire(&self, ctx: &mut RuleContext<'_>) -> Result<()> {
        (self.consequence)(ctx).map_err(|e| match e {
            RuntimeError::Consequence { .. } => e,
            other => RuntimeError::Consequence {
                rule: self.name.clone(),
                message: other.to_string(),
            },
        })
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("salience", &self.salience)
            .field("fact_type", &self.fact_type().map(|t| t.name()))
            .field("globals", &self.globals)
            .field("location", &self.location)
            .finish()
    }
}

/// Builder returned by `Rule::builder`; `then` finishes the rule
pub struct RuleBuilder {
    name: String,
    salience: i32,
    pattern: Option<Pattern>,
    globals: Vec<String>,
    location: SourceLocation,
}

impl RuleBuilder {
    /// Higher salience fires first
    pub fn salience(mut self, salience: i32) -> Self {
        self.salience = salience;
        self
    }

    /// Match every fact of exactly type `T` for which `test` holds
    pub fn when<T>(mut self, test: impl Fn(&T, &Globals) -> bool + Send + Sync + 'static) -> Self
    where
        T: Any + Send + Sync,
    {
        let test = move |fact: &Fact, globals: &Globals| {
            fact.downcast_ref::<T>()
                .map_or(false, |value| test(value, globals))
        };
        self.pattern = Some(Pattern::Fact {
            fact_type: FactType::of::<T>(),
            test: Arc::new(test),
        });
        self
    }

    /// Match every fact of exactly type `T`
    pub fn when_any<T>(self) -> Self
    where
        T: Any + Send + Sync,
    {
        self.when::<T>(|_, _| true)
    }

    /// Match once per session when `test` over the globals holds
    pub fn when_globals(mut self, test: impl Fn(&Globals) -> bool + Send + Sync + 'static) -> Self {
        self.pattern = Some(Pattern::Globals {
            test: Arc::new(test),
        });
        self
    }

    /// Declare a global the rule reads
    pub fn global(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !self.globals.contains(&name) {
            self.globals.push(name);
        }
        self
    }

    /// Finish the rule. Without a pattern the rule fires once per session.
    pub fn then(
        self,
        consequence: impl Fn(&mut RuleContext<'_>) -> Result<()> + Send + Sync + 'static,
    ) -> Rule {
        let pattern = self.pattern.unwrap_or_else(|| Pattern::Globals {
            test: Arc::new(|_: &Globals| true),
        });
        Rule {
            name: self.name,
            salience: self.salience,
            pattern,
            globals: self.globals,
            consequence: Arc::new(consequence),
            location: self.location,
        }
    }
}

/// Named global values of a session
#[derive(Debug, Clone, Default)]
pub struct Globals {
    values: HashMap<String, Fact>,
}

impl Globals {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: impl Into<String>, value: Fact) {
        self.values.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&Fact> {
        self.values.get(name)
    }

    /// Typed view; `None` if unset or of another type
    pub fn get_as<T: Any>(&self, name: &str) -> Option<&T> {
        self.values.get(name).and_then(|v| v.downcast_ref::<T>())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.values.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// What a consequence can see and do while its rule fires
pub struct RuleContext<'a> {
    rule: &'a str,
    fact: Option<&'a Fact>,
    globals: &'a Globals,
    channels: &'a HashMap<String, Arc<dyn Channel>>,
    inserted: Vec<Fact>,
}

impl<'a> RuleContext<'a> {
    pub(crate) fn new(
        rule: &'a str,
        fact: Option<&'a Fact>,
        globals: &'a Globals,
        channels: &'a HashMap<String, Arc<dyn Channel>>,
    ) -> Self {
        Self {
            rule,
            fact,
            globals,
            channels,
            inserted: Vec::new(),
        }
    }

    pub fn rule_name(&self) -> &str {
        self.rule
    }

    /// The matched fact, if the rule has a fact pattern
    pub fn fact(&self) -> Option<&'a Fact> {
        self.fact
    }

    pub fn fact_as<T: Any>(&self) -> Result<&'a T> {
        match self.fact {
            Some(fact) => Ok(fact.downcast::<T>()?),
            None => Err(CoreError::TypeMismatch {
                expected: std::any::type_name::<T>(),
                found: "<no matched fact>",
            }
            .into()),
        }
    }

    /// Read a global; fails if it was never set on the session
    pub fn global<T: Any>(&self, name: &str) -> Result<&'a T> {
        let globals: &'a Globals = self.globals;
        let value = globals
            .get(name)
            .ok_or_else(|| RuntimeError::MissingGlobal(name.to_string()))?;
        Ok(value.downcast::<T>()?)
    }

    /// Insert a new fact into working memory once the consequence returns
    pub fn insert<T: FactValue>(&mut self, value: T) {
        self.inserted.push(Fact::new(value));
    }

    pub fn insert_fact(&mut self, fact: Fact) {
        self.inserted.push(fact);
    }

    /// Send a value to a registered channel
    pub fn send<T: FactValue>(&self, channel: &str, value: T) -> Result<()> {
        self.send_fact(channel, Fact::new(value))
    }

    pub fn send_fact(&self, channel: &str, fact: Fact) -> Result<()> {
        let target = self
            .channels
            .get(channel)
            .ok_or_else(|| RuntimeError::UnknownChannel(channel.to_string()))?;
        target.send(fact);
        Ok(())
    }

    pub(crate) fn into_inserted(self) -> Vec<Fact> {
        self.inserted
    }
}
