//! Knowledge container and knowledge base seams

use crate::error::Result;
use crate::session::{StatefulSession, StatelessSession};
use rulefire_core::{ReleaseId, Results};
use std::sync::Arc;

/// A compiled set of rules that sessions are created from
pub trait KnowledgeBase: Send + Sync {
    fn name(&self) -> &str;

    fn rule_names(&self) -> Vec<String>;

    fn new_session(&self) -> Box<dyn StatefulSession>;

    fn new_stateless_session(&self) -> Box<dyn StatelessSession>;
}

/// Built knowledge: bases plus named session declarations.
///
/// Shared by every request, so implementations must allow concurrent reads.
pub trait KnowledgeContainer: Send + Sync {
    fn release_id(&self) -> Option<ReleaseId>;

    /// Diagnostics collected while the container was built
    fn verify(&self) -> Results;

    fn base_names(&self) -> Vec<String>;

    fn base(&self, name: &str) -> Option<Arc<dyn KnowledgeBase>>;

    /// Named stateful session, or the default one when `name` is `None`
    fn new_session(&self, name: Option<&str>) -> Result<Box<dyn StatefulSession>>;

    /// Named stateless session, or the default one when `name` is `None`
    fn new_stateless_session(&self, name: Option<&str>) -> Result<Box<dyn StatelessSession>>;
}
