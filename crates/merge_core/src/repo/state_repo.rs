//! Local state store contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist the player economy record as one JSON value per key.
//! - Persist the last board snapshot for resume.
//!
//! # Invariants
//! - Every save is a single upsert statement, so a record is never observed
//!   half-written.
//! - `update_state` holds the SQLite write lock from read to write, so
//!   concurrent writers on other connections cannot interleave.
//! - Absent or undecodable records resolve to defaults, never to an error.
//! - Only SQLite failures and newer schemas surface as `RepoError`.

use crate::engine::grid::BoardSnapshot;
use crate::model::economy::UserEconomyState;
use log::warn;
use rusqlite::types::ValueRef;
use rusqlite::{params, Connection, OptionalExtension, Transaction, TransactionBehavior};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Default key of the economy record.
pub const DEFAULT_STATE_RECORD_KEY: &str = "user_state_v1";
/// Key of the persisted board snapshot.
pub const BOARD_SNAPSHOT_KEY: &str = "board_snapshot_v1";

pub type RepoResult<T> = Result<T, RepoError>;

/// Storage error for the local state store.
#[derive(Debug)]
pub enum RepoError {
    Sqlite(rusqlite::Error),
    /// The store file was written by a newer build.
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    Encode {
        key: String,
        source: serde_json::Error,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "state store query failed: {err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "state store schema version {db_version} is newer than supported {latest_supported}"
            ),
            Self::Encode { key, source } => write!(f, "failed to encode record `{key}`: {source}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::Encode { source, .. } => Some(source),
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// Durable store for the single local economy record.
pub trait LocalStateStore {
    /// Loads the record, persisting defaults first when none exists.
    fn load_state(&self) -> RepoResult<UserEconomyState>;
    /// Replaces the record in one write.
    fn save_state(&self, state: &UserEconomyState) -> RepoResult<()>;
    /// Reads, mutates and writes the record as one exclusive unit.
    ///
    /// `apply` sees defaults when the record is absent or corrupt. An `Err`
    /// from `apply` leaves the stored record untouched.
    fn update_state<T, E, F>(&self, apply: F) -> Result<T, E>
    where
        F: FnOnce(&mut UserEconomyState) -> Result<T, E>,
        E: From<RepoError>;
}

enum RecordRead<T> {
    Absent,
    Corrupt,
    Present(T),
}

/// SQLite-backed local state store.
pub struct SqliteStateStore<'conn> {
    conn: &'conn Connection,
    record_key: String,
}

impl<'conn> SqliteStateStore<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self::with_record_key(conn, DEFAULT_STATE_RECORD_KEY)
    }

    pub fn with_record_key(conn: &'conn Connection, record_key: impl Into<String>) -> Self {
        Self {
            conn,
            record_key: record_key.into(),
        }
    }

    pub fn record_key(&self) -> &str {
        &self.record_key
    }

    /// Persists the board snapshot for a later resume.
    pub fn save_board_snapshot(&self, snapshot: &BoardSnapshot) -> RepoResult<()> {
        write_record(self.conn, BOARD_SNAPSHOT_KEY, snapshot)
    }

    /// Returns the last saved board snapshot, or `None` when absent or corrupt.
    pub fn load_board_snapshot(&self) -> RepoResult<Option<BoardSnapshot>> {
        match read_record(self.conn, BOARD_SNAPSHOT_KEY)? {
            RecordRead::Present(snapshot) => Ok(Some(snapshot)),
            RecordRead::Absent | RecordRead::Corrupt => Ok(None),
        }
    }
}

impl LocalStateStore for SqliteStateStore<'_> {
    fn load_state(&self) -> RepoResult<UserEconomyState> {
        match read_record(self.conn, &self.record_key)? {
            RecordRead::Present(state) => Ok(state),
            RecordRead::Corrupt => Ok(UserEconomyState::default()),
            RecordRead::Absent => {
                let state = UserEconomyState::default();
                if insert_record_if_absent(self.conn, &self.record_key, &state)? {
                    return Ok(state);
                }
                // Another writer created the record first.
                match read_record(self.conn, &self.record_key)? {
                    RecordRead::Present(stored) => Ok(stored),
                    RecordRead::Absent | RecordRead::Corrupt => Ok(state),
                }
            }
        }
    }

    fn save_state(&self, state: &UserEconomyState) -> RepoResult<()> {
        write_record(self.conn, &self.record_key, state)
    }

    fn update_state<T, E, F>(&self, apply: F) -> Result<T, E>
    where
        F: FnOnce(&mut UserEconomyState) -> Result<T, E>,
        E: From<RepoError>,
    {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)
            .map_err(RepoError::from)?;
        let mut state = match read_record(&tx, &self.record_key)? {
            RecordRead::Present(state) => state,
            RecordRead::Absent | RecordRead::Corrupt => UserEconomyState::default(),
        };
        // Dropping `tx` on the error path rolls back.
        let value = apply(&mut state)?;
        write_record(&tx, &self.record_key, &state)?;
        tx.commit().map_err(RepoError::from)?;
        Ok(value)
    }
}

enum RawRecord {
    Text(String),
    Unreadable(&'static str),
}

fn read_record<T: DeserializeOwned>(conn: &Connection, key: &str) -> RepoResult<RecordRead<T>> {
    let raw = conn
        .query_row(
            "SELECT value FROM kv_records WHERE key = ?1;",
            [key],
            |row| {
                Ok(match row.get_ref(0)? {
                    ValueRef::Text(bytes) => match std::str::from_utf8(bytes) {
                        Ok(text) => RawRecord::Text(text.to_string()),
                        Err(_) => RawRecord::Unreadable("non_utf8_text"),
                    },
                    ValueRef::Blob(_) => RawRecord::Unreadable("blob"),
                    ValueRef::Null => RawRecord::Unreadable("null"),
                    ValueRef::Integer(_) | ValueRef::Real(_) => RawRecord::Unreadable("numeric"),
                })
            },
        )
        .optional()?;

    let decoded = match raw {
        None => return Ok(RecordRead::Absent),
        Some(RawRecord::Text(text)) => {
            serde_json::from_str(&text).map_err(|err| err.to_string())
        }
        Some(RawRecord::Unreadable(kind)) => Err(format!("unreadable value type {kind}")),
    };
    match decoded {
        Ok(value) => Ok(RecordRead::Present(value)),
        Err(error) => {
            warn!(
                "event=record_load module=repo status=corrupt key={} error={}",
                key, error
            );
            Ok(RecordRead::Corrupt)
        }
    }
}

fn encode<T: Serialize>(key: &str, value: &T) -> RepoResult<String> {
    serde_json::to_string(value).map_err(|source| RepoError::Encode {
        key: key.to_string(),
        source,
    })
}

fn write_record<T: Serialize>(conn: &Connection, key: &str, value: &T) -> RepoResult<()> {
    let encoded = encode(key, value)?;
    conn.execute(
        "INSERT INTO kv_records (key, value, updated_at)
         VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
         ON CONFLICT(key) DO UPDATE SET
            value = excluded.value,
            updated_at = excluded.updated_at;",
        params![key, encoded],
    )?;
    Ok(())
}

/// Returns `true` when this call created the record.
fn insert_record_if_absent<T: Serialize>(
    conn: &Connection,
    key: &str,
    value: &T,
) -> RepoResult<bool> {
    let encoded = encode(key, value)?;
    let inserted = conn.execute(
        "INSERT INTO kv_records (key, value, updated_at)
         VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
         ON CONFLICT(key) DO NOTHING;",
        params![key, encoded],
    )?;
    Ok(inserted == 1)
}
