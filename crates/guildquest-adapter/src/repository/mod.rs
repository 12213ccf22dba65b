//! Persistence Adapters - Repository implementations
//!
//! These implement the repository traits from guildquest-domain.

pub mod file_store;
pub mod in_memory;

pub use file_store::{FileCredentialRepository, FileGuildRepository};
pub use in_memory::{InMemoryCredentialRepository, InMemoryGuildRepository};
