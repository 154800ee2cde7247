//! Builder pattern for RulesEngine

use crate::config::ReleaseConfig;
use crate::container::{ContainerSource, SharedContainer};
use crate::engine::RulesEngine;
use crate::error::{Result, RulesError};
use crate::metrics::MetricsCollector;
use rulefire_runtime::{KnowledgeContainer, KnowledgeModule, ModuleRepository};
use std::sync::Arc;

/// Builder for RulesEngine
///
/// # Example
///
/// ```rust,ignore
/// use rulefire_sdk::{ReleaseConfig, RulesEngine};
///
/// // From a release installed in a repository
/// let engine = RulesEngine::builder()
///     .with_release(ReleaseConfig::load()?, repository)
///     .eager(true)
///     .build()?;
///
/// // From an in-process module (tests, embedded tables)
/// let engine = RulesEngine::builder()
///     .with_module(KnowledgeModule::single("pricing", rules))
///     .build()?;
/// ```
#[derive(Debug, Default)]
pub struct RulesEngineBuilder {
    source: Option<ContainerSource>,
    metrics: Option<Arc<MetricsCollector>>,
    eager: bool,
}

impl RulesEngineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the container from the release `config` names in `repository`
    pub fn with_release(
        mut self,
        config: ReleaseConfig,
        repository: Arc<ModuleRepository>,
    ) -> Self {
        self.source = Some(ContainerSource::Release { config, repository });
        self
    }

    pub fn with_module(mut self, module: KnowledgeModule) -> Self {
        self.source = Some(ContainerSource::Module(module));
        self
    }

    pub fn with_container(mut self, container: Arc<dyn KnowledgeContainer>) -> Self {
        self.source = Some(ContainerSource::Prebuilt(container));
        self
    }

    pub fn with_source(mut self, source: ContainerSource) -> Self {
        self.source = Some(source);
        self
    }

    /// Share a metrics collector with other components
    pub fn with_metrics(mut self, metrics: Arc<MetricsCollector>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Build and verify the container in `build` instead of on first call
    pub fn eager(mut self, eager: bool) -> Self {
        self.eager = eager;
        self
    }

    /// Build the engine.
    ///
    /// Release coordinates are checked here so a misconfigured engine fails
    /// before serving any request.
    pub fn build(self) -> Result<RulesEngine> {
        let source = self.source.ok_or_else(|| {
            RulesError::Configuration("No knowledge container source configured".to_string())
        })?;
        if let ContainerSource::Release { config, .. } = &source {
            config.release_id()?;
        }

        let container = SharedContainer::new(source);
        if self.eager {
            container.get()?;
        }

        let metrics = self.metrics.unwrap_or_default();
        Ok(RulesEngine::new(container, metrics))
    }
}
