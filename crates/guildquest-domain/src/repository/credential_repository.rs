//! Credential Repository - Abstract persistence for session keys
//!
//! Access token, refresh token and the signed-in user are stored apart
//! from the guild snapshot so a restart can resume the session.

use crate::model::user::Credentials;
use crate::repository::guild_repository::RepositoryError;

/// Credential Repository Trait
///
/// This is a PORT in hexagonal architecture.
pub trait CredentialRepository {
    /// Load stored credentials, if any
    fn load(&self) -> Result<Option<Credentials>, RepositoryError>;

    /// Store credentials, replacing previous ones
    fn save(&mut self, credentials: &Credentials) -> Result<(), RepositoryError>;

    /// Remove all session keys
    fn clear(&mut self) -> Result<(), RepositoryError>;
}
