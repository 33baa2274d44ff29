// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::auth::{CredentialError, CredentialStore, TokenService};
use crate::config::AppConfig;
use crate::storage::Store;

/// Shared handler state. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Store,
    pub credentials: CredentialStore,
    pub tokens: Arc<TokenService>,
}

impl AppState {
    pub fn new(config: AppConfig, store: Store) -> Result<Self, CredentialError> {
        let credentials = CredentialStore::new(store.clone(), config.bcrypt_cost)?;
        let tokens = Arc::new(TokenService::from_config(&config));
        Ok(Self {
            config: Arc::new(config),
            store,
            credentials,
            tokens,
        })
    }
}
