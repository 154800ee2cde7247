//! Execution of a resolved request
//!
//! Both modes attach a fresh `SendData` channel and `RuleAgendaListener`,
//! bind the request globals, and then diverge:
//! - stateful: insert facts one by one, fire, dispose the session
//! - stateless: submit a single batch and read the fired count back

use crate::channel::{SendData, SEND_CHANNEL};
use crate::error::Result;
use crate::listener::RuleAgendaListener;
use crate::request::RulesRequest;
use crate::response::RulesResponse;
use rulefire_core::{Fact, FactTypes, SessionType};
use rulefire_runtime::{BatchExecution, Command, StatefulSession, StatelessSession};
use std::sync::Arc;

/// Out identifier of the fire command in stateless batches
pub const OUT_FIRED: &str = "outFired";

/// A session owned by exactly one execution
pub enum ExecutionContext {
    Stateful(Box<dyn StatefulSession>),
    Stateless(Box<dyn StatelessSession>),
}

impl ExecutionContext {
    pub fn session_type(&self) -> SessionType {
        match self {
            ExecutionContext::Stateful(_) => SessionType::Stateful,
            ExecutionContext::Stateless(_) => SessionType::Stateless,
        }
    }

    /// Run `request` in this context. A stateful session is disposed before
    /// this returns, whether execution succeeded or not.
    pub fn execute(
        self,
        request: RulesRequest,
        returned_types: Option<&FactTypes>,
    ) -> Result<RulesResponse> {
        match self {
            ExecutionContext::Stateful(session) => {
                execute_stateful(session, request, returned_types)
            }
            ExecutionContext::Stateless(session) => {
                execute_stateless(session, request, returned_types)
            }
        }
    }
}

/// Disposes the wrapped session when dropped
struct DisposeOnDrop(Box<dyn StatefulSession>);

impl Drop for DisposeOnDrop {
    fn drop(&mut self) {
        self.0.dispose();
    }
}

fn execute_stateful(
    session: Box<dyn StatefulSession>,
    request: RulesRequest,
    returned_types: Option<&FactTypes>,
) -> Result<RulesResponse> {
    let mut guard = DisposeOnDrop(session);
    let session = &mut guard.0;
    let channel = Arc::new(SendData::new());
    let listener = Arc::new(RuleAgendaListener::new());
    session.register_channel(SEND_CHANNEL, channel.clone());
    session.add_agenda_listener(listener.clone());

    let (globals, facts) = request.into_inputs();
    for (name, value) in globals {
        session.set_global(&name, value)?;
    }
    for fact in facts {
        session.insert(fact)?;
    }

    let fired_count = session.fire_all_rules()?;
    tracing::debug!(
        "Session {} fired {} rules ({} observed)",
        session.id(),
        fired_count,
        listener.fired_count()
    );

    let facts = filter_facts(channel.drain(), returned_types);
    drop(guard);
    Ok(RulesResponse::new(fired_count, facts))
}

fn execute_stateless(
    mut session: Box<dyn StatelessSession>,
    request: RulesRequest,
    returned_types: Option<&FactTypes>,
) -> Result<RulesResponse> {
    let channel = Arc::new(SendData::new());
    let listener = Arc::new(RuleAgendaListener::new());
    session.register_channel(SEND_CHANNEL, channel.clone());
    session.add_agenda_listener(listener.clone());

    let (globals, facts) = request.into_inputs();
    for (name, value) in globals {
        session.set_global(&name, value)?;
    }

    let mut batch = BatchExecution::default();
    if !facts.is_empty() {
        batch.push(Command::insert_elements(facts));
    }
    batch.push(Command::fire_all_rules(OUT_FIRED));

    let results = session.execute(batch)?;
    let fired_count = match results.get::<usize>(OUT_FIRED) {
        Some(count) => *count,
        None => {
            tracing::warn!("Batch returned no '{}' result; reporting 0", OUT_FIRED);
            0
        }
    };
    tracing::debug!(
        "Stateless batch fired {} rules ({} observed)",
        fired_count,
        listener.fired_count()
    );

    Ok(RulesResponse::new(
        fired_count,
        filter_facts(channel.drain(), returned_types),
    ))
}

/// Keep facts whose exact type is in `returned_types`, preserving order.
/// `None` keeps everything.
pub fn filter_facts(captured: Vec<Fact>, returned_types: Option<&FactTypes>) -> Vec<Fact> {
    match returned_types {
        None => captured,
        Some(types) => captured
            .into_iter()
            .filter(|fact| types.matches(fact))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Discount(u32);

    #[derive(Debug)]
    struct Alert;

    /// Wraps a discount; must not pass a `Discount` filter
    #[derive(Debug)]
    struct SpecialDiscount(Discount);

    #[test]
    fn test_filter_none_keeps_everything() {
        let facts = vec![Fact::new(Alert), Fact::new(Discount(1))];
        let kept = filter_facts(facts, None);

        assert_eq!(kept.len(), 2);
        assert!(kept[0].is::<Alert>());
    }

    #[test]
    fn test_filter_preserves_order_of_matches() {
        let facts = vec![
            Fact::new(Discount(1)),
            Fact::new(Alert),
            Fact::new(Discount(2)),
            Fact::new(Alert),
        ];
        let kept = filter_facts(facts, Some(&FactTypes::of::<Discount>()));

        let values: Vec<u32> = kept
            .iter()
            .map(|f| f.downcast_ref::<Discount>().unwrap().0)
            .collect();
        assert_eq!(values, vec![1, 2]);
    }

    #[test]
    fn test_filter_is_exact_type() {
        let facts = vec![
            Fact::new(SpecialDiscount(Discount(5))),
            Fact::new(Discount(3)),
        ];
        let kept = filter_facts(facts, Some(&FactTypes::of::<Discount>()));

        assert_eq!(kept.len(), 1);
        assert!(kept[0].is::<Discount>());
    }
}
