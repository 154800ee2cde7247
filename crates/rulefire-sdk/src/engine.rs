//! RulesEngine - main API for firing rules

use crate::builder::RulesEngineBuilder;
use crate::container::SharedContainer;
use crate::error::Result;
use crate::metrics::{Metrics, MetricsCollector};
use crate::request::RulesRequest;
use crate::resolver::SessionResolver;
use crate::response::RulesResponse;
use rulefire_core::FactTypes;
use rulefire_runtime::KnowledgeContainer;
use std::sync::Arc;
use std::time::Instant;

/// Facade over a knowledge container.
///
/// Each call resolves its own execution context, so one engine can serve
/// concurrent callers; the container is shared and built once.
#[derive(Debug)]
pub struct RulesEngine {
    container: SharedContainer,
    metrics: Arc<MetricsCollector>,
}

impl RulesEngine {
    pub fn builder() -> RulesEngineBuilder {
        RulesEngineBuilder::new()
    }

    pub(crate) fn new(container: SharedContainer, metrics: Arc<MetricsCollector>) -> Self {
        Self { container, metrics }
    }

    /// Generate a unique execution ID
    /// Format: exec_YYYYMMDDHHmmss_xxxxxx
    fn generate_execution_id() -> String {
        use chrono::Utc;
        use rand::Rng;

        let datetime_str = Utc::now().format("%Y%m%d%H%M%S").to_string();
        let random: u32 = rand::thread_rng().gen_range(0..=0xFFFFFF);

        format!("exec_{}_{:06x}", datetime_str, random)
    }

    /// Fire rules and return how many fired
    pub fn fire_rules(&self, request: RulesRequest) -> Result<usize> {
        self.fire_rules_with(request, None)
            .map(|response| response.fired_count())
    }

    /// Fire rules and return the fired count plus the emitted facts,
    /// restricted to `returned_types` when given
    pub fn fire_rules_with(
        &self,
        request: RulesRequest,
        returned_types: Option<&FactTypes>,
    ) -> Result<RulesResponse> {
        let execution_id = Self::generate_execution_id();
        let start = Instant::now();
        tracing::info!("[{}] Firing rules for {}", execution_id, request);
        if let Some(types) = returned_types {
            tracing::debug!("[{}] Returning only facts of types {}", execution_id, types);
        }

        self.metrics.counter("fire_rules_total").inc();
        let result = self.execute(request, returned_types);
        let elapsed = start.elapsed();
        self.metrics.record_execution_time("fire_rules", elapsed);

        match &result {
            Ok(response) => {
                self.metrics
                    .counter("rules_fired_total")
                    .add(response.fired_count() as u64);
                tracing::info!("[{}] {} in {:?}", execution_id, response, elapsed);
            }
            Err(e) => {
                self.metrics.record_error(e.kind());
                tracing::error!("[{}] Rule execution failed: {}", execution_id, e);
            }
        }
        result
    }

    fn execute(
        &self,
        request: RulesRequest,
        returned_types: Option<&FactTypes>,
    ) -> Result<RulesResponse> {
        let container = self.container.get()?;
        let context = SessionResolver::resolve(&request, container.as_ref())?;
        context.execute(request, returned_types)
    }

    /// The verified container, building it on first use
    pub fn container(&self) -> Result<Arc<dyn KnowledgeContainer>> {
        self.container.get()
    }

    pub fn metrics(&self) -> Arc<MetricsCollector> {
        Arc::clone(&self.metrics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_execution_id_format() {
        let id = RulesEngine::generate_execution_id();

        assert!(id.starts_with("exec_"));
        let parts: Vec<&str> = id.split('_').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[1].len(), 14);
        assert!(parts[1].chars().all(|c| c.is_ascii_digit()));
        assert_eq!(parts[2].len(), 6);
        assert!(u32::from_str_radix(parts[2], 16).is_ok());
    }
}
