//! Utility modules.

pub mod backoff;
