//! OAuth device-code flow, vendor session exchange and session storage.

pub mod client;
pub mod device_code;
pub mod discovery;
pub mod error;
pub mod session;
pub mod sleeper;
pub mod store;

pub use client::DeviceAuthClient;
pub use device_code::{AuthPhase, DeviceAuthorization, DeviceCodePoll, OidcToken, SlowDownPolicy};
pub use discovery::OidcEndpoints;
pub use error::AuthError;
pub use session::Session;
pub use sleeper::{Sleeper, TokioSleeper};
pub use store::SessionStore;
