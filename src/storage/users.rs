// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User repository.
//!
//! Users are created at registration and never mutated afterwards. The
//! `user_emails` index enforces email uniqueness inside the same write
//! transaction that inserts the record.

use std::fmt;

use redb::{ReadableDatabase, ReadableTable};
use serde::{Deserialize, Serialize};

use super::{decode, encode, next_id, Store, StoreError, StoreResult};
use super::{SEQUENCES, USERS, USER_EMAILS};
use crate::models::normalize_email;

/// User as persisted, including the password hash.
///
/// Stays inside the auth layer; everything above it sees [`User`].
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserRecord {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

impl fmt::Debug for UserRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserRecord")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password_hash", &"**redacted**")
            .finish()
    }
}

/// User without password material.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub email: String,
}

impl From<UserRecord> for User {
    fn from(record: UserRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            email: record.email,
        }
    }
}

/// Fields needed to insert a user. The password is already hashed.
#[derive(Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

/// Repository for user records.
pub struct UserRepository<'a> {
    store: &'a Store,
}

impl<'a> UserRepository<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// Whether a user with this email exists.
    pub fn email_exists(&self, email: &str) -> StoreResult<bool> {
        let email = normalize_email(email);
        let read_txn = self.store.database().begin_read()?;
        let emails = read_txn.open_table(USER_EMAILS)?;
        Ok(emails.get(email.as_str())?.is_some())
    }

    /// Insert a new user, failing with [`StoreError::DuplicateEmail`] when the
    /// email is taken.
    pub fn insert(&self, user: NewUser) -> StoreResult<UserRecord> {
        let email = normalize_email(&user.email);

        let write_txn = self.store.database().begin_write()?;
        let record = {
            let mut emails = write_txn.open_table(USER_EMAILS)?;
            if emails.get(email.as_str())?.is_some() {
                return Err(StoreError::DuplicateEmail);
            }

            let mut sequences = write_txn.open_table(SEQUENCES)?;
            let id = next_id(&mut sequences, "users")?;

            let record = UserRecord {
                id,
                name: user.name.trim().to_string(),
                email,
                password_hash: user.password_hash,
            };

            let mut users = write_txn.open_table(USERS)?;
            users.insert(id, encode(&record)?.as_slice())?;
            emails.insert(record.email.as_str(), id)?;
            record
        };
        write_txn.commit()?;

        Ok(record)
    }

    /// Look up a user by id.
    #[cfg(test)]
    pub fn get(&self, user_id: u64) -> StoreResult<Option<UserRecord>> {
        let read_txn = self.store.database().begin_read()?;
        let users = read_txn.open_table(USERS)?;
        super::load(&users, user_id)
    }

    /// Look up a user by email (normalized before comparison).
    pub fn find_by_email(&self, email: &str) -> StoreResult<Option<UserRecord>> {
        let email = normalize_email(email);
        let read_txn = self.store.database().begin_read()?;
        let emails = read_txn.open_table(USER_EMAILS)?;
        let Some(user_id) = emails.get(email.as_str())?.map(|v| v.value()) else {
            return Ok(None);
        };

        let users = read_txn.open_table(USERS)?;
        match users.get(user_id)? {
            Some(value) => Ok(Some(decode(value.value())?)),
            // Index entry without a record: treat as absent.
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::test_support::temp_store;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            name: "Test User".to_string(),
            email: email.to_string(),
            password_hash: "$2b$04$not-a-real-hash".to_string(),
        }
    }

    #[test]
    fn insert_assigns_sequential_ids() {
        let (store, _temp_dir) = temp_store();
        let repo = store.users();

        let first = repo.insert(new_user("first@example.com")).unwrap();
        let second = repo.insert(new_user("second@example.com")).unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(repo.get(2).unwrap(), Some(second));
    }

    #[test]
    fn duplicate_email_is_rejected() {
        let (store, _temp_dir) = temp_store();
        let repo = store.users();

        repo.insert(new_user("jane.doe@example.com")).unwrap();
        let result = repo.insert(new_user("  Jane.Doe@Example.com "));

        assert!(matches!(result, Err(StoreError::DuplicateEmail)));
        assert!(repo.get(2).unwrap().is_none());
    }

    #[test]
    fn find_by_email_normalizes_lookup() {
        let (store, _temp_dir) = temp_store();
        let repo = store.users();

        let user = repo.insert(new_user("test@example.com")).unwrap();

        assert_eq!(repo.find_by_email("TEST@example.com").unwrap(), Some(user));
        assert!(repo.find_by_email("nobody@example.com").unwrap().is_none());
        assert!(repo.email_exists("test@example.com").unwrap());
    }

    #[test]
    fn debug_output_redacts_hash() {
        let record = UserRecord {
            id: 1,
            name: "Test".into(),
            email: "test@example.com".into(),
            password_hash: "$2b$12$secret-hash".into(),
        };
        let debug = format!("{record:?}");
        assert!(!debug.contains("secret-hash"));
    }
}
