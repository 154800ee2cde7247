//! Common test utilities for SDK integration tests

#![allow(dead_code)]

use rulefire_core::Fact;
use rulefire_runtime::{
    AgendaEventListener, BaseModel, Channel, FactHandle, KnowledgeModule, Rule,
    RuleRuntimeEventListener, SessionModel, StatefulSession,
};
use rulefire_sdk::RulesEngine;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq)]
pub struct OrderFact {
    pub id: u32,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DiscountFact {
    pub order_id: u32,
    pub percent: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AuditFact {
    pub order_id: u32,
    pub reason: String,
}

/// Stand-in for a logger handed to rules as a global
#[derive(Debug, Default)]
pub struct MockLogger {
    lines: Mutex<Vec<String>>,
}

impl MockLogger {
    pub fn log(&self, line: impl Into<String>) {
        self.lines.lock().unwrap().push(line.into());
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }
}

pub fn order(id: u32, amount: f64) -> OrderFact {
    OrderFact { id, amount }
}

/// "pricing" rules: discount orders above 100, audit orders above 1000
pub fn pricing_rules() -> Vec<Rule> {
    vec![
        Rule::builder("ApplyDiscount")
            .when::<OrderFact>(|order, _| order.amount > 100.0)
            .then(|ctx| {
                let order = ctx.fact_as::<OrderFact>()?;
                ctx.send(
                    "send-channel",
                    DiscountFact {
                        order_id: order.id,
                        percent: 10,
                    },
                )
            }),
        Rule::builder("FlagLargeOrder")
            .salience(10)
            .when::<OrderFact>(|order, _| order.amount > 1000.0)
            .then(|ctx| {
                let order = ctx.fact_as::<OrderFact>()?;
                ctx.send(
                    "send-channel",
                    AuditFact {
                        order_id: order.id,
                        reason: "large order".to_string(),
                    },
                )
            }),
    ]
}

/// "logging" rules: log every order through the `logger` global
pub fn logging_rules() -> Vec<Rule> {
    vec![Rule::builder("LogOrder")
        .global("logger")
        .when_any::<OrderFact>()
        .then(|ctx| {
            let order = ctx.fact_as::<OrderFact>()?;
            let logger = ctx.global::<Arc<MockLogger>>("logger")?;
            logger.log(format!("order {} for {}", order.id, order.amount));
            Ok(())
        })]
}

/// Two bases: default "pricing" and "logging", each with a stateful and a
/// stateless session
pub fn module() -> KnowledgeModule {
    KnowledgeModule::new()
        .with_base(
            BaseModel::new("pricing")
                .as_default()
                .with_rules(pricing_rules())
                .with_session(SessionModel::stateful("pricing.session").as_default())
                .with_session(SessionModel::stateless("pricing.stateless").as_default()),
        )
        .with_base(
            BaseModel::new("logging")
                .with_rules(logging_rules())
                .with_session(SessionModel::stateful("logging.session"))
                .with_session(SessionModel::stateless("logging.stateless")),
        )
}

pub fn engine() -> RulesEngine {
    RulesEngine::builder().with_module(module()).build().unwrap()
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Stateful session wrapper that records lifecycle calls
pub struct TrackingSession {
    inner: Box<dyn StatefulSession>,
    pub disposed: Arc<AtomicBool>,
    pub inserts: Arc<AtomicUsize>,
}

impl TrackingSession {
    pub fn new(inner: Box<dyn StatefulSession>) -> Self {
        Self {
            inner,
            disposed: Arc::new(AtomicBool::new(false)),
            inserts: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl StatefulSession for TrackingSession {
    fn id(&self) -> &str {
        self.inner.id()
    }

    fn register_channel(&mut self, name: &str, channel: Arc<dyn Channel>) {
        self.inner.register_channel(name, channel);
    }

    fn add_agenda_listener(&mut self, listener: Arc<dyn AgendaEventListener>) {
        self.inner.add_agenda_listener(listener);
    }

    fn add_runtime_listener(&mut self, listener: Arc<dyn RuleRuntimeEventListener>) {
        self.inner.add_runtime_listener(listener);
    }

    fn set_global(&mut self, name: &str, value: Fact) -> rulefire_runtime::Result<()> {
        self.inner.set_global(name, value)
    }

    fn insert(&mut self, fact: Fact) -> rulefire_runtime::Result<FactHandle> {
        self.inserts.fetch_add(1, Ordering::SeqCst);
        self.inner.insert(fact)
    }

    fn update(&mut self, handle: FactHandle, fact: Fact) -> rulefire_runtime::Result<()> {
        self.inner.update(handle, fact)
    }

    fn delete(&mut self, handle: FactHandle) -> rulefire_runtime::Result<()> {
        self.inner.delete(handle)
    }

    fn fire_all_rules(&mut self) -> rulefire_runtime::Result<usize> {
        self.inner.fire_all_rules()
    }

    fn objects(&self) -> Vec<Fact> {
        self.inner.objects()
    }

    fn dispose(&mut self) {
        self.disposed.store(true, Ordering::SeqCst);
        self.inner.dispose();
    }

    fn is_disposed(&self) -> bool {
        self.inner.is_disposed()
    }
}
