//! # GuildQuest Use Case Layer
//!
//! Application-specific business rules.
//! This layer orchestrates the flow of data between the domain and adapters:
//!
//! ```text
//! user action ─▶ domain check ─▶ GuildRemote (timeout) ─▶ mirror into cache ─▶ persist
//! ```
//!
//! The guild hall is authoritative: a mutation the hall rejects is never
//! applied locally.

pub mod decay;
pub mod error;
pub mod notice;
pub mod remote;
pub mod session;

pub use guildquest_domain;

pub use decay::DecayTimer;
pub use error::SessionError;
pub use notice::{Notice, Tone};
pub use remote::{GuildRemote, RemoteError, SyncBundle};
pub use session::{Session, SessionSettings};
