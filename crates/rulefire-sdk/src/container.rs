//! Init-once knowledge container

use crate::config::ReleaseConfig;
use crate::error::{Result, RulesError};
use rulefire_core::Level;
use rulefire_runtime::{KnowledgeContainer, KnowledgeModule, MemoryContainer, ModuleRepository};
use std::fmt;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

type ContainerFactory = dyn Fn() -> Result<Arc<dyn KnowledgeContainer>> + Send + Sync;

/// Where the container is built from
pub enum ContainerSource {
    /// A release looked up in a module repository
    Release {
        config: ReleaseConfig,
        repository: Arc<ModuleRepository>,
    },

    /// A module compiled in process
    Module(KnowledgeModule),

    /// A container built elsewhere; still verified on first use
    Prebuilt(Arc<dyn KnowledgeContainer>),

    /// Custom construction, e.g. another engine implementation
    Factory(Arc<ContainerFactory>),
}

impl ContainerSource {
    pub fn factory(
        factory: impl Fn() -> Result<Arc<dyn KnowledgeContainer>> + Send + Sync + 'static,
    ) -> Self {
        ContainerSource::Factory(Arc::new(factory))
    }

    fn create(&self) -> Result<Arc<dyn KnowledgeContainer>> {
        match self {
            ContainerSource::Release { config, repository } => {
                let release_id = config.release_id()?;
                tracing::info!(
                    "Building knowledge container for release {} (scan interval {} ms)",
                    release_id,
                    config.scan_interval_ms
                );
                let container = repository.new_container(&release_id).map_err(|e| {
                    tracing::error!("Not able to build the container for {}: {}", release_id, e);
                    RulesError::Configuration(e.to_string())
                })?;
                Ok(Arc::new(container))
            }
            ContainerSource::Module(module) => {
                tracing::info!(
                    "Building knowledge container from module with {} bases",
                    module.bases.len()
                );
                Ok(Arc::new(MemoryContainer::from_module(module.clone())))
            }
            ContainerSource::Prebuilt(container) => Ok(Arc::clone(container)),
            ContainerSource::Factory(factory) => factory(),
        }
    }
}

impl fmt::Debug for ContainerSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContainerSource::Release { config, .. } => {
                f.debug_struct("Release").field("config", config).finish()
            }
            ContainerSource::Module(module) => f.debug_tuple("Module").field(module).finish(),
            ContainerSource::Prebuilt(_) => f.write_str("Prebuilt"),
            ContainerSource::Factory(_) => f.write_str("Factory"),
        }
    }
}

/// Check the container's verification results.
///
/// Every WARNING and ERROR message is logged with its location; any such
/// message fails the build.
pub fn verify_container(container: &dyn KnowledgeContainer) -> Result<()> {
    let results = container.verify();
    for message in results.messages(&[Level::Info]) {
        tracing::debug!("{}", message);
    }

    let problems = results.messages(&[Level::Warning, Level::Error]);
    if problems.is_empty() {
        return Ok(());
    }

    for message in &problems {
        tracing::error!(
            "Compilation errors in rules: {} in file {} at line number {} and column {}. Error message is: {}",
            message.level,
            message.path,
            message.line,
            message.column,
            message.text
        );
    }
    Err(RulesError::Configuration(
        "Compilation errors are found in the rules file. Please check the logs.".to_string(),
    ))
}

/// Container built on first use and shared for the life of the engine.
///
/// Concurrent first callers wait on a build lock, so the source is built and
/// verified at most once successfully. A failed build is not cached.
pub struct SharedContainer {
    source: ContainerSource,
    container: OnceLock<Arc<dyn KnowledgeContainer>>,
    build_lock: Mutex<()>,
}

impl SharedContainer {
    pub fn new(source: ContainerSource) -> Self {
        Self {
            source,
            container: OnceLock::new(),
            build_lock: Mutex::new(()),
        }
    }

    pub fn source(&self) -> &ContainerSource {
        &self.source
    }

    pub fn is_built(&self) -> bool {
        self.container.get().is_some()
    }

    /// The verified container, building it if this is the first call
    pub fn get(&self) -> Result<Arc<dyn KnowledgeContainer>> {
        if let Some(container) = self.container.get() {
            return Ok(Arc::clone(container));
        }

        let _guard = self.build_lock.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(container) = self.container.get() {
            return Ok(Arc::clone(container));
        }

        let container = self.source.create()?;
        verify_container(container.as_ref())?;
        tracing::info!(
            "Knowledge container ready with bases [{}]",
            container.base_names().join(", ")
        );

        Ok(Arc::clone(self.container.get_or_init(|| container)))
    }
}

impl fmt::Debug for SharedContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedContainer")
            .field("source", &self.source)
            .field("built", &self.is_built())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rulefire_core::ReleaseId;
    use rulefire_runtime::{BaseModel, Rule};

    fn rules() -> Vec<Rule> {
        vec![Rule::builder("noop").then(|_| Ok(()))]
    }

    #[test]
    fn test_module_source_builds_once() {
        let shared = SharedContainer::new(ContainerSource::Module(KnowledgeModule::single(
            "pricing",
            rules(),
        )));
        assert!(!shared.is_built());

        let first = shared.get().unwrap();
        let second = shared.get().unwrap();

        assert!(shared.is_built());
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.base_names(), vec!["pricing"]);
    }

    #[test]
    fn test_warning_fails_verification() {
        let module = KnowledgeModule::new().with_base(BaseModel::new("empty").as_default());
        let shared = SharedContainer::new(ContainerSource::Module(module));

        match shared.get() {
            Err(RulesError::Configuration(message)) => {
                assert!(message.contains("Compilation errors are found"))
            }
            other => panic!("unexpected result: {:?}", other.map(|c| c.base_names())),
        }
        assert!(!shared.is_built());
    }

    #[test]
    fn test_release_source() {
        let repository = Arc::new(ModuleRepository::new());
        repository.install(
            ReleaseId::new("com.acme", "pricing", "1.0.0"),
            KnowledgeModule::single("pricing", rules()),
        );

        let found = SharedContainer::new(ContainerSource::Release {
            config: ReleaseConfig::new("com.acme", "pricing", "1.0.0"),
            repository: repository.clone(),
        });
        let container = found.get().unwrap();
        assert_eq!(
            container.release_id(),
            Some(ReleaseId::new("com.acme", "pricing", "1.0.0"))
        );

        let missing = SharedContainer::new(ContainerSource::Release {
            config: ReleaseConfig::new("com.acme", "pricing", "9.9.9"),
            repository,
        });
        assert!(matches!(missing.get(), Err(RulesError::Configuration(_))));
    }
}
