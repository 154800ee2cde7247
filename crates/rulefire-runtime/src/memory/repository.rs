//! Releases installed in-process

use super::container::MemoryContainer;
use crate::error::{Result, RuntimeError};
use crate::module::KnowledgeModule;
use rulefire_core::ReleaseId;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// Thread-safe map from release coordinates to knowledge modules
#[derive(Debug, Default)]
pub struct ModuleRepository {
    modules: RwLock<HashMap<ReleaseId, KnowledgeModule>>,
}

impl ModuleRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install or replace the module published under `release_id`
    pub fn install(&self, release_id: ReleaseId, module: KnowledgeModule) {
        tracing::info!(
            "Installing release {} ({} knowledge bases)",
            release_id,
            module.bases.len()
        );
        self.modules
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(release_id, module);
    }

    pub fn contains(&self, release_id: &ReleaseId) -> bool {
        self.modules
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(release_id)
    }

    pub fn releases(&self) -> Vec<ReleaseId> {
        self.modules
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }

    /// Build a container from the module installed under `release_id`
    pub fn new_container(&self, release_id: &ReleaseId) -> Result<MemoryContainer> {
        let module = self
            .modules
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(release_id)
            .cloned()
            .ok_or_else(|| RuntimeError::ReleaseNotFound(release_id.clone()))?;
        Ok(MemoryContainer::for_release(release_id.clone(), module))
    }
}
