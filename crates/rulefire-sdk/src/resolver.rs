//! Session resolution
//!
//! Picks the execution context a request runs in. Selection precedence:
//! 1. `build_session_by_base` with a non-empty base name: fresh session from
//!    that knowledge base
//! 2. a non-empty session name: the named session of the container
//! 3. the container's default session
//!
//! The requested mode (stateful or stateless) is applied to whichever
//! source was selected.

use crate::error::{Result, RulesError};
use crate::executor::ExecutionContext;
use crate::request::RulesRequest;
use rulefire_core::SessionType;
use rulefire_runtime::KnowledgeContainer;

/// Where the execution context of a request comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionSelector<'a> {
    ByBase(&'a str),
    ByName(&'a str),
    Default,
}

impl<'a> SessionSelector<'a> {
    pub fn for_request(request: &'a RulesRequest) -> Self {
        let non_empty = |name: Option<&'a str>| name.filter(|n| !n.is_empty());

        match (request.build_session_by_base(), non_empty(request.base_name())) {
            (true, Some(base)) => SessionSelector::ByBase(base),
            _ => match non_empty(request.session_name()) {
                Some(name) => SessionSelector::ByName(name),
                None => SessionSelector::Default,
            },
        }
    }
}

/// Resolves requests to execution contexts
pub struct SessionResolver;

impl SessionResolver {
    /// Create the execution context for `request`. Nothing is injected into
    /// the returned context yet.
    pub fn resolve(
        request: &RulesRequest,
        container: &dyn KnowledgeContainer,
    ) -> Result<ExecutionContext> {
        let selector = SessionSelector::for_request(request);
        let session_type = request.session_type();
        tracing::debug!("Resolving {} session via {:?}", session_type, selector);

        match selector {
            SessionSelector::ByBase(name) => {
                let base = container.base(name).ok_or_else(|| {
                    tracing::warn!("Knowledge base not found: {}", name);
                    RulesError::SessionResolution(format!("Knowledge base not found: {}", name))
                })?;
                Ok(match session_type {
                    SessionType::Stateful => ExecutionContext::Stateful(base.new_session()),
                    SessionType::Stateless => {
                        ExecutionContext::Stateless(base.new_stateless_session())
                    }
                })
            }
            SessionSelector::ByName(name) => {
                Self::from_container(container, Some(name), session_type)
            }
            SessionSelector::Default => Self::from_container(container, None, session_type),
        }
    }

    fn from_container(
        container: &dyn KnowledgeContainer,
        name: Option<&str>,
        session_type: SessionType,
    ) -> Result<ExecutionContext> {
        let context = match session_type {
            SessionType::Stateful => container.new_session(name).map(ExecutionContext::Stateful),
            SessionType::Stateless => container
                .new_stateless_session(name)
                .map(ExecutionContext::Stateless),
        };
        context.map_err(|e| {
            tracing::warn!(
                "Failed to create {} session {}: {}",
                session_type,
                name.unwrap_or("<default>"),
                e
            );
            RulesError::SessionResolution(e.to_string())
        })
    }
}
