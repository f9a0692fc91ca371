//! Remote authority access.
//!
//! # Responsibility
//! - Expose a best-effort `RemoteCapability` whose only failure signal is
//!   `RemoteOutcome::Unavailable`.
//! - Provide the HTTP and offline implementations.

pub mod capability;
pub mod http;
