// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Mission repository.
//!
//! Every mission belongs to exactly one astronaut. The owner must exist when
//! the mission is created; the `(astronaut_id, mission_id)` index keeps
//! per-astronaut listings in id order without scanning all missions.

use redb::{ReadableDatabase, ReadableTable};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

use super::{decode, encode, load, next_id, require_text, Store, StoreError, StoreResult};
use super::{ASTRONAUTS, ASTRONAUT_MISSIONS, MISSIONS, SEQUENCES};

/// Mission progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
pub enum MissionStatus {
    #[default]
    Pending,
    #[serde(rename = "In Progress")]
    InProgress,
    Completed,
}

/// Mission record.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct Mission {
    /// Unique mission identifier
    pub id: u64,
    pub title: String,
    /// Free-text description
    pub description: Option<String>,
    pub status: MissionStatus,
    /// Owning astronaut
    pub astronaut_id: u64,
}

/// Request body for creating a mission. `status` defaults to `Pending`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NewMission {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<MissionStatus>,
}

/// Partial update; absent fields keep their stored value.
///
/// `description: null` clears the description, an absent `description`
/// leaves it unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct MissionUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<MissionStatus>,
}

/// Maps a present field (even `null`) to `Some`, so absence stays `None`.
fn present<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Missions owned by `astronaut_id`, in id order.
pub(super) fn missions_of<I, M>(
    index: &I,
    missions: &M,
    astronaut_id: u64,
) -> StoreResult<Vec<Mission>>
where
    I: ReadableTable<(u64, u64), ()>,
    M: ReadableTable<u64, &'static [u8]>,
{
    let mut result = Vec::new();
    for entry in index.range((astronaut_id, 0)..=(astronaut_id, u64::MAX))? {
        let (key, _) = entry?;
        let (_, mission_id) = key.value();
        if let Some(mission) = load(missions, mission_id)? {
            result.push(mission);
        }
    }
    Ok(result)
}

/// Repository for mission records.
pub struct MissionRepository<'a> {
    store: &'a Store,
}

impl<'a> MissionRepository<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// Create a mission for an existing astronaut.
    ///
    /// Fails with `NotFound("Astronaut")` and writes nothing when the owner
    /// does not exist.
    pub fn create(&self, astronaut_id: u64, request: &NewMission) -> StoreResult<Mission> {
        require_text("title", &request.title)?;

        let write_txn = self.store.database().begin_write()?;
        let mission = {
            let astronauts = write_txn.open_table(ASTRONAUTS)?;
            if astronauts.get(astronaut_id)?.is_none() {
                return Err(StoreError::NotFound("Astronaut"));
            }

            let mut sequences = write_txn.open_table(SEQUENCES)?;
            let id = next_id(&mut sequences, "missions")?;
            let mission = Mission {
                id,
                title: request.title.trim().to_string(),
                description: request.description.clone(),
                status: request.status.unwrap_or_default(),
                astronaut_id,
            };

            let mut missions = write_txn.open_table(MISSIONS)?;
            missions.insert(id, encode(&mission)?.as_slice())?;
            let mut index = write_txn.open_table(ASTRONAUT_MISSIONS)?;
            index.insert((astronaut_id, id), ())?;
            mission
        };
        write_txn.commit()?;

        Ok(mission)
    }

    /// Missions of one astronaut. Fails when the astronaut does not exist.
    pub fn list_for_astronaut(&self, astronaut_id: u64) -> StoreResult<Vec<Mission>> {
        let read_txn = self.store.database().begin_read()?;
        let astronauts = read_txn.open_table(ASTRONAUTS)?;
        if astronauts.get(astronaut_id)?.is_none() {
            return Err(StoreError::NotFound("Astronaut"));
        }

        let index = read_txn.open_table(ASTRONAUT_MISSIONS)?;
        let missions = read_txn.open_table(MISSIONS)?;
        missions_of(&index, &missions, astronaut_id)
    }

    /// Get a mission by id.
    pub fn get(&self, mission_id: u64) -> StoreResult<Mission> {
        let read_txn = self.store.database().begin_read()?;
        let missions = read_txn.open_table(MISSIONS)?;
        load(&missions, mission_id)?.ok_or(StoreError::NotFound("Mission"))
    }

    /// Apply a partial update. The owning astronaut never changes.
    pub fn update(&self, mission_id: u64, update: &MissionUpdate) -> StoreResult<Mission> {
        if let Some(title) = &update.title {
            require_text("title", title)?;
        }

        let write_txn = self.store.database().begin_write()?;
        let mission = {
            let mut missions = write_txn.open_table(MISSIONS)?;
            let existing_bytes = {
                let existing = missions
                    .get(mission_id)?
                    .ok_or(StoreError::NotFound("Mission"))?;
                existing.value().to_vec()
            };

            let mut mission: Mission = decode(&existing_bytes)?;
            if let Some(title) = &update.title {
                mission.title = title.trim().to_string();
            }
            if let Some(description) = &update.description {
                mission.description = description.clone();
            }
            if let Some(status) = update.status {
                mission.status = status;
            }

            missions.insert(mission_id, encode(&mission)?.as_slice())?;
            mission
        };
        write_txn.commit()?;

        Ok(mission)
    }

    /// Delete a mission.
    pub fn delete(&self, mission_id: u64) -> StoreResult<()> {
        let write_txn = self.store.database().begin_write()?;
        {
            let mut missions = write_txn.open_table(MISSIONS)?;
            let mission: Mission =
                load(&missions, mission_id)?.ok_or(StoreError::NotFound("Mission"))?;

            let mut index = write_txn.open_table(ASTRONAUT_MISSIONS)?;
            index.remove((mission.astronaut_id, mission_id))?;
            missions.remove(mission_id)?;
        }
        write_txn.commit()?;

        Ok(())
    }
}
