//! Durable local key-value storage for session and navigation state.

mod file;
mod memory;

pub use file::{FileKeyValueStore, StoreConfig};
pub use memory::MemoryKeyValueStore;

use strum::{AsRefStr, Display, EnumString};
use thiserror::Error;

/// Errors raised by a [`KeyValueStore`].
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Corrupt store file: {0}")]
    Corrupt(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for StorageError {
    fn from(error: toml::de::Error) -> Self {
        Self::Corrupt(error.to_string())
    }
}

impl From<toml::ser::Error> for StorageError {
    fn from(error: toml::ser::Error) -> Self {
        Self::Serialization(error.to_string())
    }
}

/// Keys persisted by convex-deck. Each is read and written independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, Display, EnumString)]
#[strum(serialize_all = "camelCase")]
pub enum StorageKey {
    AccessToken,
    TokenType,
    TokenExpiry,
    RefreshToken,
    SelectedTeamId,
    SelectedProjectId,
    SelectedDeploymentName,
}

/// String key-value storage. A missing key reads as `Ok(None)`.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: StorageKey) -> Result<Option<String>, StorageError>;
    fn set(&self, key: StorageKey, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: StorageKey) -> Result<(), StorageError>;

    /// Write `value` when present, otherwise remove the key.
    fn set_or_remove(&self, key: StorageKey, value: Option<&str>) -> Result<(), StorageError> {
        match value {
            Some(value) => self.set(key, value),
            None => self.remove(key),
        }
    }
}
