//! Error types for the session

use guildquest_domain::{DomainError, RepositoryError};
use thiserror::Error;

use crate::remote::RemoteError;

/// Errors surfaced to the user by a session action
///
/// None of these end the session except `Unauthorized`, which clears it
/// and asks for a new sign-in.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Validation or economy rule failed; nothing was sent to the hall
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("not signed in")]
    NotSignedIn,

    /// The hall rejected the token; session keys were cleared
    #[error("session expired, sign in again")]
    Unauthorized,

    /// The hall could not be reached or did not answer in time
    #[error("guild hall unreachable: {0}")]
    Transport(String),

    /// The hall answered with an error
    #[error("guild hall refused: {0}")]
    Rejected(String),

    #[error("local storage: {0}")]
    Storage(#[from] RepositoryError),
}

impl From<RemoteError> for SessionError {
    fn from(err: RemoteError) -> Self {
        match err {
            RemoteError::Unauthorized => SessionError::Unauthorized,
            RemoteError::Transport(message) => SessionError::Transport(message),
            RemoteError::Timeout => SessionError::Transport("request timed out".to_string()),
            other => SessionError::Rejected(other.to_string()),
        }
    }
}

/// Result type for session actions
pub type Result<T> = std::result::Result<T, SessionError>;
