//! Release-based container example
//!
//! This example demonstrates:
//! - Installing knowledge modules into a ModuleRepository per release
//! - Selecting the release through ReleaseConfig (config/rules.* or RULES_* env)
//! - Named sessions, base sessions and global bindings
//!
//! Run with e.g.
//! `RULES_GROUP_ID=com.acme RULES_ARTIFACT_ID=fraud RULES_VERSION=1.1.0 cargo run --example release_container`

use anyhow::Result;
use rulefire_runtime::{BaseModel, KnowledgeModule, ModuleRepository, Rule, SessionModel};
use rulefire_sdk::{ReleaseConfig, ReleaseId, RulesEngine, RulesError, RulesRequest};
use std::sync::Arc;

#[derive(Debug)]
struct Payment {
    account: String,
    amount: f64,
    country: String,
}

#[derive(Debug)]
struct Alert {
    account: String,
    reason: String,
}

/// Countries treated as high risk, injected as a global
#[derive(Debug)]
struct RiskList(Vec<String>);

fn fraud_module(threshold: f64) -> KnowledgeModule {
    let rules = vec![
        Rule::builder("HighAmount")
            .when::<Payment>(move |p, _| p.amount > threshold)
            .then(|ctx| {
                let payment = ctx.fact_as::<Payment>()?;
                ctx.send(
                    "send-channel",
                    Alert {
                        account: payment.account.clone(),
                        reason: format!("amount {}", payment.amount),
                    },
                )
            }),
        Rule::builder("RiskyCountry")
            .global("risk_list")
            .when::<Payment>(|p, globals| {
                globals
                    .get_as::<RiskList>("risk_list")
                    .map_or(false, |list| list.0.contains(&p.country))
            })
            .then(|ctx| {
                let payment = ctx.fact_as::<Payment>()?;
                ctx.send(
                    "send-channel",
                    Alert {
                        account: payment.account.clone(),
                        reason: format!("country {}", payment.country),
                    },
                )
            }),
    ];

    KnowledgeModule::new().with_base(
        BaseModel::new("fraud")
            .as_default()
            .with_rules(rules)
            .with_session(SessionModel::stateful("fraud.session").as_default())
            .with_session(SessionModel::stateless("fraud.batch").as_default()),
    )
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let repository = Arc::new(ModuleRepository::new());
    repository.install(ReleaseId::new("com.acme", "fraud", "1.0.0"), fraud_module(10_000.0));
    repository.install(ReleaseId::new("com.acme", "fraud", "1.1.0"), fraud_module(5_000.0));

    let loaded = ReleaseConfig::load()?;
    let config = match loaded.release_id() {
        Ok(_) => loaded,
        Err(RulesError::Configuration(message)) => {
            tracing::warn!("{}; falling back to com.acme:fraud:1.1.0", message);
            ReleaseConfig::new("com.acme", "fraud", "1.1.0")
        }
        Err(e) => return Err(e.into()),
    };

    let engine = RulesEngine::builder()
        .with_release(config, repository)
        .eager(true)
        .build()?;

    let request = RulesRequest::builder()
        .session_name("fraud.session")
        .global("risk_list", RiskList(vec!["XX".to_string()]))
        .fact(Payment {
            account: "acc-1".to_string(),
            amount: 7_500.0,
            country: "US".to_string(),
        })
        .fact(Payment {
            account: "acc-2".to_string(),
            amount: 20.0,
            country: "XX".to_string(),
        })
        .build()?;
    let response = engine.fire_rules_with(request, None)?;

    println!("Rules fired: {}", response.fired_count());
    for alert in response.facts_of::<Alert>() {
        println!("  {} flagged: {}", alert.account, alert.reason);
    }

    // Fresh stateless session straight from the knowledge base
    let request = RulesRequest::builder()
        .stateless()
        .base_name("fraud")
        .build_session_by_base(true)
        .fact(Payment {
            account: "acc-3".to_string(),
            amount: 12_000.0,
            country: "FR".to_string(),
        })
        .build()?;
    println!("Batch fired: {}", engine.fire_rules(request)?);

    Ok(())
}
