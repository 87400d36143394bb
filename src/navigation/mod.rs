//! The user's team / project / deployment selection.
//!
//! [`SelectedContext`] is a plain value. Commands produce a new context
//! instead of mutating shared state; [`Navigator`] owns the current value
//! and persists every change.

mod store;

pub use store::ContextStore;

use serde::{Deserialize, Serialize};

use crate::error::{DeckError, Result};
use crate::storage::StorageError;

/// Last navigation choice, restored on the next launch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedContext {
    pub team_id: Option<String>,
    pub project_id: Option<String>,
    pub deployment_name: Option<String>,
}

/// User navigation actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationCommand {
    SelectTeam(String),
    SelectProject(String),
    SelectDeployment(String),
    /// Drop the innermost selection.
    Back,
    Reset,
}

impl SelectedContext {
    /// Selecting a level clears every level below it.
    pub fn apply(&self, command: NavigationCommand) -> SelectedContext {
        match command {
            NavigationCommand::SelectTeam(team_id) => {
                if self.team_id.as_deref() == Some(team_id.as_str()) {
                    return self.clone();
                }
                SelectedContext {
                    team_id: Some(team_id),
                    project_id: None,
                    deployment_name: None,
                }
            }
            NavigationCommand::SelectProject(project_id) => {
                if self.project_id.as_deref() == Some(project_id.as_str()) {
                    return self.clone();
                }
                SelectedContext {
                    team_id: self.team_id.clone(),
                    project_id: Some(project_id),
                    deployment_name: None,
                }
            }
            NavigationCommand::SelectDeployment(name) => SelectedContext {
                deployment_name: Some(name),
                ..self.clone()
            },
            NavigationCommand::Back => {
                let mut next = self.clone();
                if next.deployment_name.take().is_none() && next.project_id.take().is_none() {
                    next.team_id = None;
                }
                next
            }
            NavigationCommand::Reset => SelectedContext::default(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.team_id.is_none() && self.project_id.is_none() && self.deployment_name.is_none()
    }

    pub fn require_team(&self) -> Result<&str> {
        self.team_id.as_deref().ok_or(DeckError::MissingSelection("team"))
    }

    pub fn require_project(&self) -> Result<&str> {
        self.project_id
            .as_deref()
            .ok_or(DeckError::MissingSelection("project"))
    }

    pub fn require_deployment(&self) -> Result<&str> {
        self.deployment_name
            .as_deref()
            .ok_or(DeckError::MissingSelection("deployment"))
    }
}

/// Owns the current [`SelectedContext`] and writes every change through.
pub struct Navigator {
    store: ContextStore,
    current: SelectedContext,
}

impl Navigator {
    /// Restore the persisted selection.
    pub fn load(store: ContextStore) -> std::result::Result<Self, StorageError> {
        let current = store.load()?;
        Ok(Self { store, current })
    }

    pub fn context(&self) -> &SelectedContext {
        &self.current
    }

    pub fn dispatch(
        &mut self,
        command: NavigationCommand,
    ) -> std::result::Result<&SelectedContext, StorageError> {
        let next = self.current.apply(command);
        if next != self.current {
            tracing::debug!(?next, "navigation changed");
            self.store.save(&next)?;
            self.current = next;
        }
        Ok(&self.current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryKeyValueStore;
    use std::sync::Arc;

    fn full() -> SelectedContext {
        SelectedContext {
            team_id: Some("t1".into()),
            project_id: Some("p1".into()),
            deployment_name: Some("happy-otter-123".into()),
        }
    }

    #[test]
    fn selecting_new_team_clears_project_and_deployment() {
        let next = full().apply(NavigationCommand::SelectTeam("t2".into()));
        assert_eq!(next.team_id.as_deref(), Some("t2"));
        assert!(next.project_id.is_none());
        assert!(next.deployment_name.is_none());
    }

    #[test]
    fn reselecting_same_team_keeps_selection() {
        let next = full().apply(NavigationCommand::SelectTeam("t1".into()));
        assert_eq!(next, full());
    }

    #[test]
    fn selecting_project_clears_deployment() {
        let next = full().apply(NavigationCommand::SelectProject("p2".into()));
        assert_eq!(next.team_id.as_deref(), Some("t1"));
        assert_eq!(next.project_id.as_deref(), Some("p2"));
        assert!(next.deployment_name.is_none());
    }

    #[test]
    fn back_pops_innermost_level() {
        let ctx = full().apply(NavigationCommand::Back);
        assert!(ctx.deployment_name.is_none());
        assert!(ctx.project_id.is_some());
        let ctx = ctx.apply(NavigationCommand::Back);
        assert!(ctx.project_id.is_none());
        assert!(ctx.team_id.is_some());
        let ctx = ctx.apply(NavigationCommand::Back);
        assert!(ctx.is_empty());
    }

    #[test]
    fn require_reports_missing_level() {
        let ctx = SelectedContext::default();
        assert!(matches!(
            ctx.require_deployment(),
            Err(DeckError::MissingSelection("deployment"))
        ));
    }

    #[test]
    fn navigator_persists_changes() {
        let kv = Arc::new(MemoryKeyValueStore::new());
        let mut nav = Navigator::load(ContextStore::new(kv.clone())).unwrap();
        nav.dispatch(NavigationCommand::SelectTeam("t1".into()))
            .unwrap();
        nav.dispatch(NavigationCommand::SelectProject("p1".into()))
            .unwrap();

        let restored = Navigator::load(ContextStore::new(kv)).unwrap();
        assert_eq!(restored.context().team_id.as_deref(), Some("t1"));
        assert_eq!(restored.context().project_id.as_deref(), Some("p1"));
    }
}
