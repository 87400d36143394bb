use std::sync::Arc;

use super::SelectedContext;
use crate::storage::{KeyValueStore, StorageError, StorageKey};

/// Persists a [`SelectedContext`], one key per level.
#[derive(Clone)]
pub struct ContextStore {
    kv: Arc<dyn KeyValueStore>,
}

impl ContextStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    pub fn load(&self) -> Result<SelectedContext, StorageError> {
        Ok(SelectedContext {
            team_id: self.kv.get(StorageKey::SelectedTeamId)?,
            project_id: self.kv.get(StorageKey::SelectedProjectId)?,
            deployment_name: self.kv.get(StorageKey::SelectedDeploymentName)?,
        })
    }

    pub fn save(&self, context: &SelectedContext) -> Result<(), StorageError> {
        self.kv
            .set_or_remove(StorageKey::SelectedTeamId, context.team_id.as_deref())?;
        self.kv
            .set_or_remove(StorageKey::SelectedProjectId, context.project_id.as_deref())?;
        self.kv.set_or_remove(
            StorageKey::SelectedDeploymentName,
            context.deployment_name.as_deref(),
        )
    }

    pub fn clear(&self) -> Result<(), StorageError> {
        self.save(&SelectedContext::default())
    }
}
