use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{KeyValueStore, StorageError, StorageKey};

const STATE_FILE: &str = "state.toml";

/// Configuration for file-backed storage.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub base_dir: PathBuf,
}

impl StoreConfig {
    pub fn new(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn default_dir() -> PathBuf {
        default_deck_dir()
    }
}

/// File-backed store keeping every key in one TOML document.
///
/// # Example
/// ```no_run
/// use convex_deck::storage::{FileKeyValueStore, KeyValueStore, StorageKey};
///
/// let store = FileKeyValueStore::new_default();
/// store.set(StorageKey::SelectedTeamId, "42")?;
/// # Ok::<(), convex_deck::storage::StorageError>(())
/// ```
#[derive(Debug)]
pub struct FileKeyValueStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    write_lock: Mutex<()>,
}

impl FileKeyValueStore {
    pub fn new(config: StoreConfig) -> Self {
        Self {
            path: config.base_dir.join(STATE_FILE),
            write_lock: Mutex::new(()),
        }
    }

    pub fn new_default() -> Self {
        Self::new(StoreConfig::new(default_deck_dir()))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<BTreeMap<String, String>, StorageError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(BTreeMap::new())
            }
            Err(err) => return Err(err.into()),
        };
        let file: StateFile = toml::from_str(&raw)?;
        Ok(file.values)
    }

    fn write(&self, values: BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = StateFile {
            version: 1,
            saved_at: Utc::now(),
            values,
        };
        fs::write(&self.path, toml::to_string(&file)?)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.path, fs::Permissions::from_mode(0o600))?;
        }
        Ok(())
    }

    fn update(
        &self,
        apply: impl FnOnce(&mut BTreeMap<String, String>) -> bool,
    ) -> Result<(), StorageError> {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut values = self.read()?;
        if apply(&mut values) {
            self.write(values)?;
        }
        Ok(())
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: StorageKey) -> Result<Option<String>, StorageError> {
        Ok(self.read()?.remove(key.as_ref()))
    }

    fn set(&self, key: StorageKey, value: &str) -> Result<(), StorageError> {
        self.update(|values| {
            values.insert(key.as_ref().to_string(), value.to_string());
            true
        })
    }

    fn remove(&self, key: StorageKey) -> Result<(), StorageError> {
        self.update(|values| values.remove(key.as_ref()).is_some())
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct StateFile {
    version: u32,
    saved_at: DateTime<Utc>,
    #[serde(default)]
    values: BTreeMap<String, String>,
}

fn default_deck_dir() -> PathBuf {
    directories::UserDirs::new()
        .map(|dirs| dirs.home_dir().join(".convex-deck"))
        .unwrap_or_else(|| PathBuf::from(".convex-deck"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn temp_store() -> (TempDir, FileKeyValueStore) {
        let dir = TempDir::new().unwrap();
        let store = FileKeyValueStore::new(StoreConfig::new(dir.path().to_path_buf()));
        (dir, store)
    }

    #[test]
    fn missing_file_reads_as_absent() {
        let (_dir, store) = temp_store();
        assert!(store.get(StorageKey::AccessToken).unwrap().is_none());
    }

    #[test]
    fn values_survive_a_new_handle() {
        let (dir, store) = temp_store();
        store.set(StorageKey::AccessToken, "access").unwrap();
        store.set(StorageKey::SelectedTeamId, "7").unwrap();

        let reopened = FileKeyValueStore::new(StoreConfig::new(dir.path().to_path_buf()));
        assert_eq!(
            reopened.get(StorageKey::AccessToken).unwrap().as_deref(),
            Some("access")
        );
        assert_eq!(
            reopened.get(StorageKey::SelectedTeamId).unwrap().as_deref(),
            Some("7")
        );
    }

    #[test]
    fn remove_only_touches_one_key() {
        let (_dir, store) = temp_store();
        store.set(StorageKey::AccessToken, "access").unwrap();
        store.set(StorageKey::RefreshToken, "refresh").unwrap();
        store.remove(StorageKey::AccessToken).unwrap();
        assert!(store.get(StorageKey::AccessToken).unwrap().is_none());
        assert_eq!(
            store.get(StorageKey::RefreshToken).unwrap().as_deref(),
            Some("refresh")
        );
    }

    #[test]
    fn removing_absent_key_is_ok() {
        let (_dir, store) = temp_store();
        store.remove(StorageKey::TokenExpiry).unwrap();
        assert!(!store.path().exists());
    }

    #[cfg(unix)]
    #[test]
    fn state_file_is_private() {
        use std::os::unix::fs::PermissionsExt;
        let (_dir, store) = temp_store();
        store.set(StorageKey::AccessToken, "secret").unwrap();
        let mode = fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn corrupt_file_is_reported() {
        let (_dir, store) = temp_store();
        fs::write(store.path(), "not = [valid").unwrap();
        assert!(matches!(
            store.get(StorageKey::AccessToken),
            Err(StorageError::Corrupt(_))
        ));
    }
}
