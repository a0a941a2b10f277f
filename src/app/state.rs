//! The explicit session object shared by every command

use anyhow::{Context, Result};

use crate::auth::{AccessGate, AuthError, FirebaseAuth, IdentityProvider};
use crate::config::Config;
use crate::config::progress::LearningRecords;
use crate::store::{DocumentStore, FirestoreClient};

/// Everything one run of the program works with
pub struct AppState<S = FirestoreClient, P = FirebaseAuth> {
    pub config: Config,
    pub store: S,
    /// Device-local progress, loaded once at start
    pub records: LearningRecords,
    pub gate: AccessGate<P>,
}

impl AppState {
    /// Build clients for the configured project and load local progress
    pub fn connect(config: Config) -> Result<Self> {
        config.ensure_remote()?;

        let store = match &config.firestore_emulator {
            Some(host) => FirestoreClient::with_emulator(host, &config.project_id),
            None => FirestoreClient::new(&config.project_id, Some(config.api_key.clone())),
        }
        .context("Failed to create document store client")?;

        let auth = match &config.auth_emulator {
            Some(host) => FirebaseAuth::with_emulator(host, config.api_key.clone()),
            None => FirebaseAuth::new(config.api_key.clone()),
        }
        .context("Failed to create identity provider client")?;

        let records = LearningRecords::load();
        tracing::debug!("loaded {} learning records", records.len());

        Ok(Self::new(config, store, records, AccessGate::new(auth)))
    }
}

impl<S: DocumentStore, P: IdentityProvider> AppState<S, P> {
    pub fn new(config: Config, store: S, records: LearningRecords, gate: AccessGate<P>) -> Self {
        Self { config, store, records, gate }
    }

    /// Tear down the admin session
    pub fn sign_out(&mut self) -> Result<(), AuthError> {
        self.gate.sign_out(&self.store)
    }
}
