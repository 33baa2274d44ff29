// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Mission Control - Astronaut and Mission Tracking Service
//!
//! This crate provides an authenticated REST API for registering users and
//! managing astronauts and the missions assigned to them, persisted in an
//! embedded redb database.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Registration, bcrypt passwords, HS256 bearer tokens
//! - `config` - Environment-driven configuration
//! - `storage` - redb-backed user, astronaut and mission repositories

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod state;
pub mod storage;
