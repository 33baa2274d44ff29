// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Astronaut repository.
//!
//! Astronauts own zero or more missions through the `astronaut_missions`
//! index. Deleting an astronaut that still owns missions is rejected with
//! [`StoreError::HasMissions`]; missions must be removed first.

use redb::{ReadableDatabase, ReadableTable};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::missions::{missions_of, Mission};
use super::{encode, load, next_id, require_text, Store, StoreError, StoreResult};
use super::{ASTRONAUTS, ASTRONAUT_EMAILS, ASTRONAUT_MISSIONS, MISSIONS, SEQUENCES};
use crate::models::{normalize_email, validate_email};

/// Astronaut record.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct Astronaut {
    /// Unique astronaut identifier
    pub id: u64,
    /// Full name
    pub name: String,
    /// Contact email (unique across astronauts)
    pub email: String,
}

/// Request body for creating an astronaut.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NewAstronaut {
    pub name: String,
    pub email: String,
}

/// Partial update; absent fields keep their stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct AstronautUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Repository for astronaut records.
pub struct AstronautRepository<'a> {
    store: &'a Store,
}

impl<'a> AstronautRepository<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// Create an astronaut after validating the required fields.
    pub fn create(&self, request: &NewAstronaut) -> StoreResult<Astronaut> {
        require_text("name", &request.name)?;
        let email = normalize_email(&request.email);
        validate_email(&email).map_err(StoreError::Validation)?;

        let write_txn = self.store.database().begin_write()?;
        let astronaut = {
            let mut emails = write_txn.open_table(ASTRONAUT_EMAILS)?;
            if emails.get(email.as_str())?.is_some() {
                return Err(StoreError::DuplicateEmail);
            }

            let mut sequences = write_txn.open_table(SEQUENCES)?;
            let id = next_id(&mut sequences, "astronauts")?;
            let astronaut = Astronaut {
                id,
                name: request.name.trim().to_string(),
                email,
            };

            let mut astronauts = write_txn.open_table(ASTRONAUTS)?;
            astronauts.insert(id, encode(&astronaut)?.as_slice())?;
            emails.insert(astronaut.email.as_str(), id)?;
            astronaut
        };
        write_txn.commit()?;

        Ok(astronaut)
    }

    /// All astronauts in id order, without missions.
    #[cfg(test)]
    pub fn list(&self) -> StoreResult<Vec<Astronaut>> {
        let read_txn = self.store.database().begin_read()?;
        let astronauts = read_txn.open_table(ASTRONAUTS)?;

        let mut result = Vec::new();
        for entry in astronauts.iter()? {
            let (_, value) = entry?;
            result.push(super::decode(value.value())?);
        }
        Ok(result)
    }

    /// All astronauts with their missions, read from a single snapshot.
    pub fn list_with_missions(&self) -> StoreResult<Vec<(Astronaut, Vec<Mission>)>> {
        let read_txn = self.store.database().begin_read()?;
        let astronauts = read_txn.open_table(ASTRONAUTS)?;
        let index = read_txn.open_table(ASTRONAUT_MISSIONS)?;
        let missions = read_txn.open_table(MISSIONS)?;

        let mut result = Vec::new();
        for entry in astronauts.iter()? {
            let (_, value) = entry?;
            let astronaut: Astronaut = super::decode(value.value())?;
            let owned = missions_of(&index, &missions, astronaut.id)?;
            result.push((astronaut, owned));
        }
        Ok(result)
    }

    /// Get an astronaut by id.
    pub fn get(&self, astronaut_id: u64) -> StoreResult<Astronaut> {
        let read_txn = self.store.database().begin_read()?;
        let astronauts = read_txn.open_table(ASTRONAUTS)?;
        load(&astronauts, astronaut_id)?.ok_or(StoreError::NotFound("Astronaut"))
    }

    /// Get an astronaut and its missions from a single snapshot.
    pub fn get_with_missions(&self, astronaut_id: u64) -> StoreResult<(Astronaut, Vec<Mission>)> {
        let read_txn = self.store.database().begin_read()?;
        let astronauts = read_txn.open_table(ASTRONAUTS)?;
        let astronaut: Astronaut =
            load(&astronauts, astronaut_id)?.ok_or(StoreError::NotFound("Astronaut"))?;

        let index = read_txn.open_table(ASTRONAUT_MISSIONS)?;
        let missions = read_txn.open_table(MISSIONS)?;
        let owned = missions_of(&index, &missions, astronaut_id)?;
        Ok((astronaut, owned))
    }

    /// Apply a partial update.
    pub fn update(&self, astronaut_id: u64, update: &AstronautUpdate) -> StoreResult<Astronaut> {
        if let Some(name) = &update.name {
            require_text("name", name)?;
        }
        let new_email = update.email.as_deref().map(normalize_email);
        if let Some(email) = &new_email {
            validate_email(email).map_err(StoreError::Validation)?;
        }

        let write_txn = self.store.database().begin_write()?;
        let astronaut = {
            let mut astronauts = write_txn.open_table(ASTRONAUTS)?;
            let mut astronaut: Astronaut =
                load(&astronauts, astronaut_id)?.ok_or(StoreError::NotFound("Astronaut"))?;

            if let Some(name) = &update.name {
                astronaut.name = name.trim().to_string();
            }

            if let Some(email) = new_email {
                if email != astronaut.email {
                    let mut emails = write_txn.open_table(ASTRONAUT_EMAILS)?;
                    let taken = emails.get(email.as_str())?.is_some();
                    if taken {
                        return Err(StoreError::DuplicateEmail);
                    }
                    emails.remove(astronaut.email.as_str())?;
                    emails.insert(email.as_str(), astronaut_id)?;
                    astronaut.email = email;
                }
            }

            astronauts.insert(astronaut_id, encode(&astronaut)?.as_slice())?;
            astronaut
        };
        write_txn.commit()?;

        Ok(astronaut)
    }

    /// Delete an astronaut that owns no missions.
    pub fn delete(&self, astronaut_id: u64) -> StoreResult<()> {
        let write_txn = self.store.database().begin_write()?;
        {
            let mut astronauts = write_txn.open_table(ASTRONAUTS)?;
            let astronaut: Astronaut =
                load(&astronauts, astronaut_id)?.ok_or(StoreError::NotFound("Astronaut"))?;

            let index = write_txn.open_table(ASTRONAUT_MISSIONS)?;
            let has_missions = index
                .range((astronaut_id, 0)..=(astronaut_id, u64::MAX))?
                .next()
                .is_some();
            if has_missions {
                return Err(StoreError::HasMissions(astronaut_id));
            }

            let mut emails = write_txn.open_table(ASTRONAUT_EMAILS)?;
            emails.remove(astronaut.email.as_str())?;
            astronauts.remove(astronaut_id)?;
        }
        write_txn.commit()?;

        Ok(())
    }
}
