//! SQLite bootstrap for the local state store.
//!
//! # Responsibility
//! - Open file or in-memory SQLite connections.
//! - Apply schema migrations before any record is read or written.
//!
//! # Invariants
//! - Schema version is tracked via `PRAGMA user_version`.
//! - A store written by a newer build is rejected with
//!   `RepoError::UnsupportedSchemaVersion`, never downgraded.

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};
