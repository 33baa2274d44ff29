// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Persistent Storage
//!
//! Embedded database backed by redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! - `users`: user id → serialized [`UserRecord`]
//! - `user_emails`: normalized email → user id
//! - `astronauts`: astronaut id → serialized [`Astronaut`]
//! - `astronaut_emails`: normalized email → astronaut id
//! - `missions`: mission id → serialized [`Mission`]
//! - `astronaut_missions`: (astronaut id, mission id) → ()
//! - `sequences`: table name → last issued id
//!
//! ## Transactions
//!
//! Every repository call opens its own redb transaction. redb allows a single
//! writer at a time and gives readers a consistent snapshot, so the service
//! holds no locks of its own. A write transaction dropped before `commit()`
//! is aborted, which releases it on every early `?` return.

use std::path::Path;
use std::sync::Arc;

use redb::{Database, ReadableDatabase, ReadableTable, Table, TableDefinition};
use serde::{de::DeserializeOwned, Serialize};

pub mod astronauts;
pub mod missions;
pub mod users;

pub use astronauts::{Astronaut, AstronautRepository, AstronautUpdate, NewAstronaut};
pub use missions::{Mission, MissionRepository, MissionStatus, MissionUpdate, NewMission};
pub use users::{NewUser, User, UserRecord, UserRepository};

// =============================================================================
// Table Definitions
// =============================================================================

const USERS: TableDefinition<u64, &[u8]> = TableDefinition::new("users");
const USER_EMAILS: TableDefinition<&str, u64> = TableDefinition::new("user_emails");
const ASTRONAUTS: TableDefinition<u64, &[u8]> = TableDefinition::new("astronauts");
const ASTRONAUT_EMAILS: TableDefinition<&str, u64> = TableDefinition::new("astronaut_emails");
const MISSIONS: TableDefinition<u64, &[u8]> = TableDefinition::new("missions");
const ASTRONAUT_MISSIONS: TableDefinition<(u64, u64), ()> =
    TableDefinition::new("astronaut_missions");
const SEQUENCES: TableDefinition<&str, u64> = TableDefinition::new("sequences");

// =============================================================================
// Error Type
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("redb database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Referenced record does not exist. Holds the entity name.
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("email already registered")]
    DuplicateEmail,

    /// Astronaut cannot be deleted while missions still reference it.
    #[error("astronaut {0} still has assigned missions")]
    HasMissions(u64),

    #[error("invalid input: {0}")]
    Validation(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

// =============================================================================
// Store
// =============================================================================

/// Shared handle to the embedded database.
///
/// Cloning is cheap; all clones refer to the same database.
#[derive(Clone)]
pub struct Store {
    db: Arc<Database>,
}

impl Store {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let db = Database::create(path)?;

        // Pre-create all tables so later read transactions don't fail
        let write_txn = db.begin_write()?;
        {
            write_txn.open_table(USERS)?;
            write_txn.open_table(USER_EMAILS)?;
            write_txn.open_table(ASTRONAUTS)?;
            write_txn.open_table(ASTRONAUT_EMAILS)?;
            write_txn.open_table(MISSIONS)?;
            write_txn.open_table(ASTRONAUT_MISSIONS)?;
            write_txn.open_table(SEQUENCES)?;
        }
        write_txn.commit()?;

        tracing::info!(path = %path.display(), "Opened mission control database");
        Ok(Self { db: Arc::new(db) })
    }

    pub(crate) fn database(&self) -> &Database {
        &self.db
    }

    /// Cheap round-trip used by readiness probes.
    pub fn ping(&self) -> StoreResult<()> {
        let read_txn = self.db.begin_read()?;
        read_txn.open_table(SEQUENCES)?;
        Ok(())
    }

    pub fn users(&self) -> UserRepository<'_> {
        UserRepository::new(self)
    }

    pub fn astronauts(&self) -> AstronautRepository<'_> {
        AstronautRepository::new(self)
    }

    pub fn missions(&self) -> MissionRepository<'_> {
        MissionRepository::new(self)
    }
}

// =============================================================================
// Helpers shared by the repositories
// =============================================================================

/// Allocate the next identifier for `table`. Identifiers start at 1.
fn next_id(sequences: &mut Table<'_, &'static str, u64>, table: &str) -> StoreResult<u64> {
    let current = sequences.get(table)?.map(|v| v.value()).unwrap_or(0);
    let next = current + 1;
    sequences.insert(table, next)?;
    Ok(next)
}

fn encode<T: Serialize>(value: &T) -> StoreResult<Vec<u8>> {
    Ok(serde_json::to_vec(value)?)
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> StoreResult<T> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Load and decode the record stored under `id`, if any.
fn load<T, R>(table: &R, id: u64) -> StoreResult<Option<T>>
where
    T: DeserializeOwned,
    R: ReadableTable<u64, &'static [u8]>,
{
    match table.get(id)? {
        Some(value) => Ok(Some(decode(value.value())?)),
        None => Ok(None),
    }
}

/// Reject blank required text fields.
fn require_text(field: &str, value: &str) -> StoreResult<()> {
    if value.trim().is_empty() {
        return Err(StoreError::Validation(format!("{field} must not be empty")));
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::Store;
    use tempfile::TempDir;

    /// Open a fresh database inside a temporary directory.
    ///
    /// Keep the returned `TempDir` alive for the duration of the test.
    pub fn temp_store() -> (Store, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = Store::open(&temp_dir.path().join("test.redb")).expect("Failed to open store");
        (store, temp_dir)
    }
}
