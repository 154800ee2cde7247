//! Integration tests for the in-memory engine
//!
//! Drives stateful and stateless sessions through the public traits only.

use rulefire_core::Fact;
use rulefire_runtime::{
    AgendaEventListener, BatchExecution, Channel, Command, KnowledgeContainer, KnowledgeModule,
    Match, MemoryContainer, ObjectEvent, Rule, RuleRuntimeEventListener, RuntimeError,
    StatefulSession,
};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq)]
struct Order {
    id: u32,
    amount: f64,
}

#[derive(Debug, Clone, PartialEq)]
struct Discount {
    order_id: u32,
    percent: u32,
}

#[derive(Default)]
struct Outbox(Mutex<Vec<Fact>>);

impl Channel for Outbox {
    fn send(&self, fact: Fact) {
        self.0.lock().unwrap().push(fact);
    }
}

#[derive(Default)]
struct EventLog(Mutex<Vec<String>>);

impl EventLog {
    fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

impl AgendaEventListener for EventLog {
    fn match_created(&self, activation: &Match) {
        self.0.lock().unwrap().push(format!("created:{}", activation.rule));
    }

    fn match_cancelled(&self, activation: &Match) {
        self.0.lock().unwrap().push(format!("cancelled:{}", activation.rule));
    }

    fn after_match_fired(&self, activation: &Match) {
        self.0.lock().unwrap().push(format!("fired:{}", activation.rule));
    }

    fn agenda_group_pushed(&self, group: &str) {
        self.0.lock().unwrap().push(format!("push:{}", group));
    }

    fn agenda_group_popped(&self, group: &str) {
        self.0.lock().unwrap().push(format!("pop:{}", group));
    }
}

impl RuleRuntimeEventListener for EventLog {
    fn object_inserted(&self, event: &ObjectEvent) {
        let origin = event.rule.clone().unwrap_or_else(|| "caller".to_string());
        self.0.lock().unwrap().push(format!("inserted-by:{}", origin));
    }
}

fn pricing_rules() -> Vec<Rule> {
    vec![
        Rule::builder("ApplyDiscount")
            .when::<Order>(|order, _| order.amount > 100.0)
            .then(|ctx| {
                let order = ctx.fact_as::<Order>()?;
                ctx.insert(Discount {
                    order_id: order.id,
                    percent: 10,
                });
                Ok(())
            }),
        Rule::builder("PublishDiscount")
            .when_any::<Discount>()
            .then(|ctx| {
                let discount = ctx.fact_as::<Discount>()?;
                ctx.send("send-channel", discount.clone())
            }),
    ]
}

fn container() -> MemoryContainer {
    MemoryContainer::from_module(KnowledgeModule::single("pricing", pricing_rules()))
}

#[test]
fn test_stateful_chain_fires_and_sends() {
    let container = container();
    let outbox = Arc::new(Outbox::default());
    let mut session = container.new_session(None).unwrap();
    session.register_channel("send-channel", outbox.clone());

    session.insert(Fact::new(Order { id: 1, amount: 150.0 })).unwrap();
    session.insert(Fact::new(Order { id: 2, amount: 20.0 })).unwrap();
    let fired = session.fire_all_rules().unwrap();

    assert_eq!(fired, 2);
    let sent = outbox.0.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(
        sent[0].downcast_ref::<Discount>(),
        Some(&Discount {
            order_id: 1,
            percent: 10
        })
    );
    assert_eq!(session.objects().len(), 3);
}

#[test]
fn test_second_fire_is_refracted() {
    let container = container();
    let mut session = container.new_session(None).unwrap();
    session.register_channel("send-channel", Arc::new(Outbox::default()));

    session.insert(Fact::new(Order { id: 1, amount: 500.0 })).unwrap();
    assert_eq!(session.fire_all_rules().unwrap(), 2);
    assert_eq!(session.fire_all_rules().unwrap(), 0);
}

#[test]
fn test_update_reactivates_fact() {
    let container = container();
    let mut session = container.new_session(None).unwrap();
    session.register_channel("send-channel", Arc::new(Outbox::default()));

    let handle = session.insert(Fact::new(Order { id: 1, amount: 50.0 })).unwrap();
    assert_eq!(session.fire_all_rules().unwrap(), 0);

    session
        .update(handle, Fact::new(Order { id: 1, amount: 250.0 }))
        .unwrap();
    assert_eq!(session.fire_all_rules().unwrap(), 2);
}

#[test]
fn test_delete_cancels_pending_match() {
    let container = container();
    let log = Arc::new(EventLog::default());
    let mut session = container.new_session(None).unwrap();
    session.add_agenda_listener(log.clone());

    let handle = session.insert(Fact::new(Order { id: 1, amount: 150.0 })).unwrap();
    session.delete(handle).unwrap();
    assert_eq!(session.fire_all_rules().unwrap(), 0);

    assert_eq!(
        log.entries(),
        vec![
            "created:ApplyDiscount",
            "cancelled:ApplyDiscount",
            "push:MAIN",
            "pop:MAIN"
        ]
    );
    assert!(matches!(
        session.delete(handle),
        Err(RuntimeError::UnknownFactHandle(_))
    ));
}

#[test]
fn test_event_sequence_while_firing() {
    let container = container();
    let log = Arc::new(EventLog::default());
    let mut session = container.new_session(None).unwrap();
    session.register_channel("send-channel", Arc::new(Outbox::default()));
    session.add_agenda_listener(log.clone());
    session.add_runtime_listener(log.clone());

    session.insert(Fact::new(Order { id: 7, amount: 120.0 })).unwrap();
    session.fire_all_rules().unwrap();

    assert_eq!(
        log.entries(),
        vec![
            "inserted-by:caller",
            "created:ApplyDiscount",
            "push:MAIN",
            "fired:ApplyDiscount",
            "inserted-by:ApplyDiscount",
            "created:PublishDiscount",
            "fired:PublishDiscount",
            "pop:MAIN",
        ]
    );
}

#[test]
fn test_disposed_session_rejects_work() {
    let container = container();
    let mut session = container.new_session(None).unwrap();
    session.insert(Fact::new(Order { id: 1, amount: 1.0 })).unwrap();

    session.dispose();
    session.dispose();

    assert!(session.is_disposed());
    assert!(session.objects().is_empty());
    assert!(matches!(
        session.insert(Fact::new(Order { id: 2, amount: 1.0 })),
        Err(RuntimeError::SessionDisposed(_))
    ));
    assert!(matches!(
        session.fire_all_rules(),
        Err(RuntimeError::SessionDisposed(_))
    ));
}

#[test]
fn test_unregistered_channel_fails_consequence() {
    let container = container();
    let mut session = container.new_session(None).unwrap();
    session.insert(Fact::new(Order { id: 1, amount: 150.0 })).unwrap();

    let err = session.fire_all_rules().unwrap_err();
    match err {
        RuntimeError::Consequence { rule, message } => {
            assert_eq!(rule, "PublishDiscount");
            assert!(message.contains("send-channel"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_globals_must_be_declared_and_set() {
    let rules = vec![Rule::builder("Audit")
        .global("auditor")
        .then(|ctx| {
            let auditor = ctx.global::<String>("auditor")?;
            ctx.send("send-channel", format!("audited by {}", auditor))
        })];
    let container = MemoryContainer::from_module(KnowledgeModule::single("audit", rules));

    let mut session = container.new_session(None).unwrap();
    assert!(matches!(
        session.set_global("unknown", Fact::new(1_u8)),
        Err(RuntimeError::UndeclaredGlobal(_))
    ));
    assert!(session.fire_all_rules().is_err());

    let outbox = Arc::new(Outbox::default());
    let mut session = container.new_session(None).unwrap();
    session.register_channel("send-channel", outbox.clone());
    session
        .set_global("auditor", Fact::new("ops".to_string()))
        .unwrap();
    assert_eq!(session.fire_all_rules().unwrap(), 1);
    assert_eq!(
        outbox.0.lock().unwrap()[0].downcast_ref::<String>(),
        Some(&"audited by ops".to_string())
    );
}

#[test]
fn test_stateless_batch_reports_fired_count() {
    let container = container();
    let outbox = Arc::new(Outbox::default());
    let mut session = container.new_stateless_session(None).unwrap();
    session.register_channel("send-channel", outbox.clone());

    let batch = BatchExecution::new(vec![
        Command::insert_elements(vec![
            Fact::new(Order { id: 1, amount: 101.0 }),
            Fact::new(Order { id: 2, amount: 300.0 }),
        ]),
        Command::fire_all_rules("outFired"),
        Command::get_objects("objects"),
    ]);
    let results = session.execute(batch).unwrap();

    assert_eq!(results.get::<usize>("outFired"), Some(&4));
    assert_eq!(results.get::<Vec<Fact>>("objects").map(Vec::len), Some(4));
    assert_eq!(outbox.0.lock().unwrap().len(), 2);
}

#[test]
fn test_stateless_batches_do_not_share_memory() {
    let container = container();
    let mut session = container.new_stateless_session(None).unwrap();
    session.register_channel("send-channel", Arc::new(Outbox::default()));

    let first = session
        .execute(BatchExecution::new(vec![
            Command::insert_elements(vec![Fact::new(Order { id: 1, amount: 200.0 })]),
            Command::fire_all_rules("outFired"),
        ]))
        .unwrap();
    let second = session
        .execute(BatchExecution::new(vec![Command::fire_all_rules("outFired")]))
        .unwrap();

    assert_eq!(first.get::<usize>("outFired"), Some(&2));
    assert_eq!(second.get::<usize>("outFired"), Some(&0));
}

#[test]
fn test_salience_orders_firing() {
    let order = Arc::new(Mutex::new(Vec::new()));
    let (first, second) = (order.clone(), order.clone());
    let rules = vec![
        Rule::builder("late").then(move |_| {
            first.lock().unwrap().push("late");
            Ok(())
        }),
        Rule::builder("early").salience(100).then(move |_| {
            second.lock().unwrap().push("early");
            Ok(())
        }),
    ];
    let container = MemoryContainer::from_module(KnowledgeModule::single("ordering", rules));

    let mut session = container.new_session(None).unwrap();
    assert_eq!(session.fire_all_rules().unwrap(), 2);
    assert_eq!(*order.lock().unwrap(), vec!["early", "late"]);
}
