//! # GuildQuest Shared
//!
//! Configuration and error types used by the binary and its wiring.

pub mod config;
pub mod error;

// Re-exports
pub use config::*;
pub use error::*;
