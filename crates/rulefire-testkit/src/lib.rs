//! rulefire testkit
//!
//! Helpers for testing rules directly against sessions, without going
//! through `RulesEngine`:
//! - `RulesTestHarness`: verified container plus session and firing helpers
//! - `RuleRuntimeListener`: records every fact inserted into a session

pub mod harness;
pub mod listener;

pub use harness::{DebugAgendaListener, RulesTestHarness};
pub use listener::RuleRuntimeListener;
