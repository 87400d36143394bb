use std::sync::Arc;

use chrono::{Duration, Utc};
use convex_deck::auth::{Session, SessionStore};
use convex_deck::navigation::{ContextStore, NavigationCommand, Navigator};
use convex_deck::storage::{FileKeyValueStore, KeyValueStore, StorageKey, StoreConfig};
use pretty_assertions::assert_eq;

fn open(dir: &tempfile::TempDir) -> Arc<dyn KeyValueStore> {
    Arc::new(FileKeyValueStore::new(StoreConfig::new(dir.path().to_path_buf())))
}

#[test]
fn session_and_selection_survive_a_restart() {
    let dir = tempfile::tempdir().unwrap();
    let expires_at = Utc::now() + Duration::hours(1);

    {
        let store = open(&dir);
        SessionStore::new(store.clone())
            .save(&Session {
                access_token: "vendor-token".to_string(),
                token_type: "Bearer".to_string(),
                expires_at: Some(expires_at),
                refresh_token: Some("refresh".to_string()),
            })
            .unwrap();
        let mut navigator = Navigator::load(ContextStore::new(store)).unwrap();
        navigator
            .dispatch(NavigationCommand::SelectTeam("7".to_string()))
            .unwrap();
        navigator
            .dispatch(NavigationCommand::SelectProject("11".to_string()))
            .unwrap();
        navigator
            .dispatch(NavigationCommand::SelectDeployment("happy-otter-123".to_string()))
            .unwrap();
    }

    let store = open(&dir);
    let session = SessionStore::new(store.clone()).load().unwrap().unwrap();
    assert_eq!(session.access_token, "vendor-token");
    assert_eq!(session.refresh_token.as_deref(), Some("refresh"));
    assert_eq!(
        session.expires_at.map(|at| at.timestamp()),
        Some(expires_at.timestamp())
    );

    let navigator = Navigator::load(ContextStore::new(store)).unwrap();
    assert_eq!(navigator.context().team_id.as_deref(), Some("7"));
    assert_eq!(navigator.context().project_id.as_deref(), Some("11"));
    assert_eq!(
        navigator.context().deployment_name.as_deref(),
        Some("happy-otter-123")
    );
}

#[test]
fn selecting_another_team_clears_the_persisted_levels_below() {
    let dir = tempfile::tempdir().unwrap();
    let store = open(&dir);
    let mut navigator = Navigator::load(ContextStore::new(store.clone())).unwrap();
    navigator
        .dispatch(NavigationCommand::SelectTeam("7".to_string()))
        .unwrap();
    navigator
        .dispatch(NavigationCommand::SelectProject("11".to_string()))
        .unwrap();
    navigator
        .dispatch(NavigationCommand::SelectTeam("8".to_string()))
        .unwrap();

    let reopened = open(&dir);
    assert_eq!(
        reopened.get(StorageKey::SelectedTeamId).unwrap().as_deref(),
        Some("8")
    );
    assert_eq!(reopened.get(StorageKey::SelectedProjectId).unwrap(), None);
}

#[test]
fn epoch_millis_expiry_is_still_readable() {
    let dir = tempfile::tempdir().unwrap();
    let store = open(&dir);
    store.set(StorageKey::AccessToken, "vendor-token").unwrap();
    store
        .set(StorageKey::TokenExpiry, "1893456000000")
        .unwrap();

    let session = SessionStore::new(store).load().unwrap().unwrap();
    assert_eq!(
        session.expires_at.map(|at| at.timestamp()),
        Some(1_893_456_000)
    );
    assert_eq!(session.token_type, "Bearer");
}
