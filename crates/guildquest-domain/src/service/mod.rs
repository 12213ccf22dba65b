//! Domain Services - Business logic that doesn't belong to a single entity
//!
//! Services operate on several entities at once and contain the "verbs"
//! of the guild: completing a quest touches the board, the ledger and
//! the companion together.

pub mod guildmaster;
