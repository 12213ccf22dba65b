//! Repository Traits - The "Ports" of Hexagonal Architecture
//!
//! These traits define HOW the domain wants its local cache persisted,
//! but NOT how it's actually done. That's the adapter's job.
//!
//! ```text
//! Domain Layer          │  Adapter Layer
//! ──────────────────────┼────────────────────────
//! trait GuildRepo       │  FileGuildRepository
//!   fn load()           │  InMemoryGuildRepository
//!   fn save()           │
//! ```

pub mod credential_repository;
pub mod guild_repository;
