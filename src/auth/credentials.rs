// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Credential store: registration and login verification.
//!
//! Login failures are deliberately uniform. An unknown email and a wrong
//! password produce the same [`CredentialError::InvalidCredentials`], and an
//! unknown email still pays for one bcrypt verification against a dummy hash.

use std::sync::Arc;

use super::password::{hash_password, verify_password, MAX_PASSWORD_BYTES};
use crate::models::{normalize_email, validate_email};
use crate::storage::{NewUser, Store, StoreError, User};

/// Credential store errors.
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("email already registered")]
    DuplicateEmail,

    #[error("incorrect username or password")]
    InvalidCredentials,

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("password hashing failed: {0}")]
    Hashing(#[from] bcrypt::BcryptError),

    #[error("storage error: {0}")]
    Storage(StoreError),

    #[error("blocking task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl From<StoreError> for CredentialError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::DuplicateEmail => CredentialError::DuplicateEmail,
            StoreError::Validation(msg) => CredentialError::InvalidInput(msg),
            other => CredentialError::Storage(other),
        }
    }
}

/// Registration and login on top of the user repository.
#[derive(Clone)]
pub struct CredentialStore {
    store: Store,
    cost: u32,
    dummy_hash: Arc<str>,
}

impl CredentialStore {
    /// Create a credential store hashing at `cost`.
    ///
    /// Computes the dummy hash used to equalize unknown-email logins, so this
    /// takes one bcrypt round at the configured cost.
    pub fn new(store: Store, cost: u32) -> Result<Self, CredentialError> {
        let dummy_hash = hash_password(&uuid::Uuid::new_v4().to_string(), cost)?;
        Ok(Self {
            store,
            cost,
            dummy_hash: dummy_hash.into(),
        })
    }

    /// Register a new user.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<User, CredentialError> {
        if name.trim().is_empty() {
            return Err(CredentialError::InvalidInput("name must not be empty".into()));
        }
        let email = normalize_email(email);
        validate_email(&email).map_err(CredentialError::InvalidInput)?;
        if password.is_empty() {
            return Err(CredentialError::InvalidInput(
                "password must not be empty".into(),
            ));
        }
        if password.len() > MAX_PASSWORD_BYTES {
            return Err(CredentialError::InvalidInput(format!(
                "password must be at most {MAX_PASSWORD_BYTES} bytes"
            )));
        }

        // Cheap pre-check so duplicates don't cost a bcrypt round. The insert
        // re-checks inside its write transaction.
        if self.store.users().email_exists(&email)? {
            return Err(CredentialError::DuplicateEmail);
        }

        let cost = self.cost;
        let plaintext = password.to_owned();
        let password_hash =
            tokio::task::spawn_blocking(move || hash_password(&plaintext, cost)).await??;

        let record = self.store.users().insert(NewUser {
            name: name.to_string(),
            email,
            password_hash,
        })?;

        tracing::info!(user_id = record.id, "Registered user");
        Ok(record.into())
    }

    /// Verify an email/password pair.
    ///
    /// Passwords longer than bcrypt's input limit never match: bcrypt would
    /// truncate them and accept any extension of a 72-byte password.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<User, CredentialError> {
        let oversized = password.len() > MAX_PASSWORD_BYTES;
        let record = match self.store.users().find_by_email(email)? {
            Some(_) if oversized => None,
            found => found,
        };

        let hash = match &record {
            Some(user) => user.password_hash.clone(),
            None => self.dummy_hash.to_string(),
        };
        let plaintext = password.to_owned();
        let valid =
            tokio::task::spawn_blocking(move || verify_password(&plaintext, &hash)).await?;

        match record {
            Some(user) if valid => {
                tracing::info!(user_id = user.id, "User authenticated");
                Ok(user.into())
            }
            _ => {
                tracing::debug!("Login rejected");
                Err(CredentialError::InvalidCredentials)
            }
        }
    }

    /// Look up a user by email.
    pub fn find_by_email(&self, email: &str) -> Result<Option<User>, CredentialError> {
        Ok(self.store.users().find_by_email(email)?.map(User::from))
    }
}
