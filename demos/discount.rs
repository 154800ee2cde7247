//! Discount rules example
//!
//! This example demonstrates:
//! - Building a RulesEngine from an in-process knowledge module
//! - Firing stateful and stateless requests
//! - Filtering emitted facts by type

use anyhow::Result;
use rulefire_sdk::{FactTypes, KnowledgeModule, Rule, RulesEngine, RulesRequest};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone)]
struct Order {
    id: u32,
    amount: f64,
}

#[derive(Debug, Clone)]
struct Discount {
    order_id: u32,
    percent: u32,
}

#[derive(Debug, Clone)]
struct ReviewTask {
    order_id: u32,
}

fn rules() -> Vec<Rule> {
    vec![
        Rule::builder("ApplyDiscount")
            .when::<Order>(|order, _| order.amount > 100.0)
            .then(|ctx| {
                let order = ctx.fact_as::<Order>()?;
                let percent = if order.amount > 1000.0 { 15 } else { 10 };
                ctx.send(
                    "send-channel",
                    Discount {
                        order_id: order.id,
                        percent,
                    },
                )
            }),
        Rule::builder("ReviewLargeOrder")
            .salience(10)
            .when::<Order>(|order, _| order.amount > 1000.0)
            .then(|ctx| {
                let order = ctx.fact_as::<Order>()?;
                ctx.send("send-channel", ReviewTask { order_id: order.id })
            }),
    ]
}

fn init_tracing() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rulefire_sdk=info,rulefire_runtime=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {}", e))?;

    Ok(())
}

fn main() -> Result<()> {
    init_tracing()?;
    println!("=== Discount Rules Example ===\n");

    let engine = RulesEngine::builder()
        .with_module(KnowledgeModule::single("discounts", rules()))
        .eager(true)
        .build()?;

    // Stateful: every emitted fact
    let request = RulesRequest::builder()
        .fact(Order { id: 1, amount: 150.0 })
        .fact(Order { id: 2, amount: 2400.0 })
        .fact(Order { id: 3, amount: 40.0 })
        .build()?;
    let response = engine.fire_rules_with(request, None)?;

    println!("Stateful request");
    println!("  Rules fired: {}", response.fired_count());
    for fact in response.facts() {
        println!("  Emitted: {:?}", fact);
    }

    // Stateless: discounts only
    let request = RulesRequest::builder()
        .stateless()
        .fact(Order { id: 4, amount: 5000.0 })
        .build()?;
    let response = engine.fire_rules_with(request, Some(&FactTypes::of::<Discount>()))?;

    println!("\nStateless request (discounts only)");
    println!("  Rules fired: {}", response.fired_count());
    for discount in response.facts_of::<Discount>() {
        println!(
            "  Order {} gets {}% off",
            discount.order_id, discount.percent
        );
    }

    let metrics = engine.metrics();
    println!("\nMetrics");
    for (name, value) in metrics.counter_values() {
        println!("  {}: {}", name, value);
    }
    for (name, summary) in metrics.histogram_summaries() {
        println!(
            "  {}: count={} mean={:.6}s max={:.6}s",
            name,
            summary.count,
            summary.mean(),
            summary.max
        );
    }

    Ok(())
}
