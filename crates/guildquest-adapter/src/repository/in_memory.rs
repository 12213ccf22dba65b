//! In-Memory Repository Implementations
//!
//! Keep the cache and the session keys in memory only.
//! Used for ephemeral sessions and in tests.

use std::sync::{Arc, RwLock};

use guildquest_domain::{CredentialRepository, Credentials, GuildRepository, GuildState, RepositoryError};

fn poisoned(kind: &str) -> RepositoryError {
    RepositoryError::PersistenceError {
        message: format!("Failed to acquire {} lock", kind),
    }
}

/// In-memory guild cache
///
/// Clones share the same slot, so a test can keep a handle after handing
/// one to the session.
#[derive(Debug, Clone, Default)]
pub struct InMemoryGuildRepository {
    snapshot: Arc<RwLock<Option<GuildState>>>,
}

impl InMemoryGuildRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl GuildRepository for InMemoryGuildRepository {
    fn load(&self) -> Result<Option<GuildState>, RepositoryError> {
        let snapshot = self.snapshot.read().map_err(|_| poisoned("read"))?;
        Ok(snapshot.clone())
    }

    fn save(&mut self, state: &GuildState) -> Result<(), RepositoryError> {
        let mut snapshot = self.snapshot.write().map_err(|_| poisoned("write"))?;
        *snapshot = Some(state.clone());
        Ok(())
    }

    fn clear(&mut self) -> Result<(), RepositoryError> {
        let mut snapshot = self.snapshot.write().map_err(|_| poisoned("write"))?;
        *snapshot = None;
        Ok(())
    }
}

/// In-memory session keys
#[derive(Debug, Clone, Default)]
pub struct InMemoryCredentialRepository {
    credentials: Arc<RwLock<Option<Credentials>>>,
}

impl InMemoryCredentialRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialRepository for InMemoryCredentialRepository {
    fn load(&self) -> Result<Option<Credentials>, RepositoryError> {
        let credentials = self.credentials.read().map_err(|_| poisoned("read"))?;
        Ok(credentials.clone())
    }

    fn save(&mut self, credentials: &Credentials) -> Result<(), RepositoryError> {
        let mut slot = self.credentials.write().map_err(|_| poisoned("write"))?;
        *slot = Some(credentials.clone());
        Ok(())
    }

    fn clear(&mut self) -> Result<(), RepositoryError> {
        let mut slot = self.credentials.write().map_err(|_| poisoned("write"))?;
        *slot = None;
        Ok(())
    }
}
