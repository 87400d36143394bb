//! convex-deck: browse and operate Convex projects from the terminal.
//!
//! Signs in with the OAuth device-authorization grant, exchanges the
//! identity token for a dashboard session, remembers the selected
//! team / project / deployment, and tails function logs.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use convex_deck::prelude::*;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> convex_deck::error::Result<()> {
//! let config = DeckConfig::from_env();
//! let store = Arc::new(FileKeyValueStore::new(config.store_config()));
//! let auth = DeviceAuthClient::from_config(&config, store);
//! if let Some(session) = auth
//!     .login(|authz| println!("Open {} and enter {}", authz.browser_uri(), authz.user_code), &CancellationToken::new())
//!     .await?
//! {
//!     let teams = DashboardClient::new(&config, session).list_teams().await?;
//!     println!("{} teams", teams.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod logs;
pub mod navigation;
pub mod prelude;
pub mod storage;
pub mod util;

#[cfg(feature = "cli")]
pub mod cli;
