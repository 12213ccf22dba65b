//! # GuildQuest Adapter Layer
//!
//! External system integrations (Hexagonal Architecture adapters).
//!
//! ## Structure
//!
//! - `gateway/` - Guild hall implementations (REST client, offline hall)
//! - `repository/` - Local persistence (JSON files, memory)

pub mod gateway;
pub mod repository;
