//! Guild Repository - Abstract persistence for the session snapshot
//!
//! The snapshot is one namespaced blob: quests, gold, companion and
//! decorations. Where it lives (a file, memory, browser storage) is not
//! our concern here.

use crate::model::state::GuildState;

/// Errors that can occur during repository operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// Nothing stored under the requested key
    NotFound { key: String },
    /// Failed to persist
    PersistenceError { message: String },
    /// Stored data could not be read back
    Corrupted { message: String },
}

impl core::fmt::Display for RepositoryError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            RepositoryError::NotFound { key } => {
                write!(f, "Nothing stored for: {}", key)
            }
            RepositoryError::PersistenceError { message } => {
                write!(f, "Persistence error: {}", message)
            }
            RepositoryError::Corrupted { message } => {
                write!(f, "Stored data is corrupted: {}", message)
            }
        }
    }
}

impl std::error::Error for RepositoryError {}

/// Guild Repository Trait
///
/// This is a PORT in hexagonal architecture.
/// Used as the write-through cache behind the remote guild hall.
///
/// Note: No async here - local storage is small and fast.
pub trait GuildRepository {
    /// Load the last saved snapshot, if any
    fn load(&self) -> Result<Option<GuildState>, RepositoryError>;

    /// Replace the stored snapshot
    fn save(&mut self, state: &GuildState) -> Result<(), RepositoryError>;

    /// Forget the snapshot (sign-out)
    fn clear(&mut self) -> Result<(), RepositoryError>;

    /// Check whether a snapshot exists
    fn exists(&self) -> Result<bool, RepositoryError> {
        Ok(self.load()?.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::quest::{Quest, QuestDraft, QuestId, Timestamp};

    /// In-memory implementation for testing
    struct InMemoryGuildRepo {
        snapshot: Option<GuildState>,
    }

    impl GuildRepository for InMemoryGuildRepo {
        fn load(&self) -> Result<Option<GuildState>, RepositoryError> {
            Ok(self.snapshot.clone())
        }

        fn save(&mut self, state: &GuildState) -> Result<(), RepositoryError> {
            self.snapshot = Some(state.clone());
            Ok(())
        }

        fn clear(&mut self) -> Result<(), RepositoryError> {
            self.snapshot = None;
            Ok(())
        }
    }

    #[test]
    fn test_in_memory_repo() {
        let mut repo = InMemoryGuildRepo { snapshot: None };
        assert!(!repo.exists().unwrap());

        let mut state = GuildState::new().with_gold(40);
        state.board.upsert(Quest::new(
            QuestId::new("q-1"),
            QuestDraft::new("Sweep the hall", "", 10).unwrap(),
            Timestamp::from_millis(0),
        ));
        repo.save(&state).unwrap();

        let loaded = repo.load().unwrap().unwrap();
        assert_eq!(loaded.gold(), 40);
        assert_eq!(loaded.board.len(), 1);

        repo.clear().unwrap();
        assert!(!repo.exists().unwrap());
    }
}
