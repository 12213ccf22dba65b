//! # GuildQuest Domain Layer
//!
//! The reward economy of GuildQuest - pure business logic with zero external
//! dependencies.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    Domain Layer (This Crate)                     │
//! │  ┌─────────────────────────────────────────────────────────────┐│
//! │  │  model/     - Quest, Companion, Ledger, Inventory, State    ││
//! │  │  repository/- Trait definitions (not implementations)       ││
//! │  │  service/   - Domain services (Guildmaster)                 ││
//! │  └─────────────────────────────────────────────────────────────┘│
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## The Golden Rule
//!
//! **This crate has ZERO external dependencies.**
//!
//! Whether the guild hall is a REST backend or a JSON file on disk,
//! the rules for gold, experience and decorations do not change.

pub mod model;
pub mod repository;
pub mod service;

// Re-export commonly used types
pub use model::{
    companion::{Companion, Growth},
    decoration::{Decoration, Inventory},
    error::DomainError,
    ledger::{Ledger, DECORATION_COST, FEED_COST},
    quest::{parse_bulk, Completion, Quest, QuestBoard, QuestDraft, QuestId, Timestamp},
    state::GuildState,
    user::{Credentials, User},
};

pub use repository::{
    credential_repository::CredentialRepository,
    guild_repository::{GuildRepository, RepositoryError},
};

pub use service::guildmaster::{GuildEvent, Guildmaster};
