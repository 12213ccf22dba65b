//! Outbound Adapters - Implementations of the guild hall port
//!
//! - `http` talks to the REST backend
//! - `local` keeps the hall in-process for offline play

pub mod dto;
pub mod http;
pub mod local;

pub use http::HttpGuildClient;
pub use local::LocalGuild;
