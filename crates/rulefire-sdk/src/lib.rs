//! rulefire SDK
//!
//! Request/response facade over rule sessions. A caller builds a
//! `RulesRequest` (facts, globals, stateful or stateless mode, optional
//! session or base name) and hands it to `RulesEngine`, which resolves a
//! session, injects the inputs, fires the rules and returns the fired count
//! together with the facts the rules sent on the `send-channel`.

pub mod builder;
pub mod channel;
pub mod config;
pub mod container;
pub mod engine;
pub mod error;
pub mod executor;
pub mod listener;
pub mod metrics;
pub mod request;
pub mod resolver;
pub mod response;

// Re-export main types
pub use builder::RulesEngineBuilder;
pub use channel::{SendData, SEND_CHANNEL};
pub use config::ReleaseConfig;
pub use container::{verify_container, ContainerSource, SharedContainer};
pub use engine::RulesEngine;
pub use error::{Result, RulesError};
pub use executor::{filter_facts, ExecutionContext, OUT_FIRED};
pub use listener::RuleAgendaListener;
pub use metrics::{Counter, Histogram, HistogramSummary, Metrics, MetricsCollector};
pub use request::{RulesRequest, RulesRequestBuilder};
pub use resolver::{SessionResolver, SessionSelector};
pub use response::RulesResponse;

// Re-export commonly used types from dependencies
pub use rulefire_core::{Fact, FactType, FactTypes, ReleaseId, SessionType};
pub use rulefire_runtime::{KnowledgeContainer, KnowledgeModule, ModuleRepository, Rule};
