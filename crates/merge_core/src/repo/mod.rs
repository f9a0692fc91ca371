//! Local persistence layer.
//!
//! # Responsibility
//! - Define the durable-store contract used by the economy fallback path.
//! - Keep SQLite details out of the coordinators.
//!
//! # Invariants
//! - Corrupt or missing records are recovered with defaults and a `warn` log.

pub mod state_repo;
