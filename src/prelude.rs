//! Convenience re-exports for common use.

pub use crate::api::{DashboardClient, DeploymentClient, DeploymentCredentials, FunctionKind, FunctionOutcome};
pub use crate::auth::{AuthError, DeviceAuthClient, DeviceAuthorization, Session};
pub use crate::config::DeckConfig;
pub use crate::error::{DeckError, Result};
pub use crate::logs::{LogEntry, LogEvent, LogFilter, LogPoller, PollerSettings};
pub use crate::navigation::{NavigationCommand, Navigator, SelectedContext};
pub use crate::storage::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore};
