//! GuildRemote - The port to the guild hall
//!
//! One method per REST endpoint the client consumes. Implementations
//! live in the adapter crate: an HTTP client for the real backend and an
//! in-process hall for offline play.

use async_trait::async_trait;
use guildquest_domain::{Companion, Credentials, Decoration, Quest, QuestDraft, QuestId, Timestamp, User};
use thiserror::Error;

/// Errors reported by the guild hall or the road to it
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    /// The access token was rejected (HTTP 401)
    #[error("unauthorized")]
    Unauthorized,

    /// The hall refused a purchase or meal for lack of gold
    #[error("insufficient gold")]
    InsufficientGold,

    /// The hall says the decoration is already owned
    #[error("decoration already owned")]
    AlreadyOwned,

    /// The record does not exist on the hall
    #[error("not found")]
    NotFound,

    /// The quest was already turned in, possibly from another device
    #[error("task already completed")]
    AlreadyCompleted,

    /// Any other rejection
    #[error("server error {status}: {message}")]
    Server { status: u16, message: String },

    /// The hall could not be reached
    #[error("transport error: {0}")]
    Transport(String),

    /// The hall did not answer in time
    #[error("request timed out")]
    Timeout,

    /// The answer could not be understood
    #[error("invalid response: {0}")]
    Decode(String),
}

/// Everything that changed on the hall since a point in time
#[derive(Debug, Clone, Default)]
pub struct SyncBundle {
    pub quests: Vec<Quest>,
    pub companion: Option<Companion>,
    pub decorations: Vec<Decoration>,
    pub user: Option<User>,
    pub synced_at: Timestamp,
}

/// GuildRemote Trait
///
/// This is a PORT in hexagonal architecture. Every call other than
/// `login` and `register` carries the token set with `authorize`.
#[async_trait]
pub trait GuildRemote: Send + Sync {
    /// Set or clear the bearer token used for subsequent calls
    fn authorize(&self, access_token: Option<String>);

    // ========== Auth ==========

    async fn login(&self, email: &str, password: &str) -> Result<Credentials, RemoteError>;

    async fn register(&self, email: &str, password: &str) -> Result<Credentials, RemoteError>;

    async fn me(&self) -> Result<User, RemoteError>;

    // ========== Quests ==========

    async fn list_quests(&self) -> Result<Vec<Quest>, RemoteError>;

    async fn create_quest(&self, draft: &QuestDraft) -> Result<Quest, RemoteError>;

    async fn create_quests(&self, drafts: &[QuestDraft]) -> Result<Vec<Quest>, RemoteError>;

    async fn complete_quest(&self, id: &QuestId) -> Result<Quest, RemoteError>;

    async fn delete_quest(&self, id: &QuestId) -> Result<(), RemoteError>;

    // ========== Companion ==========

    async fn companion(&self) -> Result<Companion, RemoteError>;

    async fn feed(&self) -> Result<Companion, RemoteError>;

    async fn play(&self) -> Result<Companion, RemoteError>;

    // ========== Chamber ==========

    async fn decorations(&self) -> Result<Vec<Decoration>, RemoteError>;

    async fn buy_decoration(&self, decoration: Decoration) -> Result<(), RemoteError>;

    // ========== Sync ==========

    /// Fetch what changed since `since` (everything when `None`)
    async fn sync(&self, since: Option<Timestamp>) -> Result<SyncBundle, RemoteError>;
}
