//! App - Dependency injection & wiring
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  App::connect                                                   │
//! │    │                                                            │
//! │    ├── Local stores: FileGuildRepository / FileCredentialRepo   │
//! │    │                 (in-memory with --ephemeral)               │
//! │    ├── Guild hall:   HttpGuildClient (REST)                     │
//! │    │                 LocalGuild (--offline, seeded from cache)  │
//! │    └── Session:      remote-authoritative context               │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use guildquest_adapter::gateway::{HttpGuildClient, LocalGuild};
use guildquest_adapter::repository::{
    FileCredentialRepository, FileGuildRepository, InMemoryCredentialRepository,
    InMemoryGuildRepository,
};
use guildquest_domain::{CredentialRepository, GuildRepository};
use guildquest_shared::GuildConfig;
use guildquest_usecase::{GuildRemote, Notice, Session, SessionError, SessionSettings};
use tracing::{info, warn};

type Stores = (
    Box<dyn GuildRepository + Send>,
    Box<dyn CredentialRepository + Send>,
);

/// Everything a command needs: the resolved config and the session
pub struct App {
    config: GuildConfig,
    pub session: Session,
}

impl App {
    /// Wire stores, guild hall and session from `config`
    ///
    /// `ephemeral` keeps everything in memory: nothing is read from or
    /// written to the data directory.
    pub fn connect(config: GuildConfig, ephemeral: bool) -> anyhow::Result<Self> {
        let (cache, keys): Stores = if ephemeral {
            (
                Box::new(InMemoryGuildRepository::new()),
                Box::new(InMemoryCredentialRepository::new()),
            )
        } else {
            (
                Box::new(FileGuildRepository::new(&config.data_dir)),
                Box::new(FileCredentialRepository::new(&config.data_dir)),
            )
        };

        let remote: Arc<dyn GuildRemote> = if config.offline {
            Arc::new(open_local_hall(cache.as_ref(), keys.as_ref()))
        } else {
            Arc::new(HttpGuildClient::new(
                config.api_base_url.clone(),
                config.request_timeout(),
            )?)
        };

        info!(
            offline = config.offline,
            ephemeral,
            api = %config.api_base_url,
            data_dir = %config.data_dir.display(),
            "guild wired"
        );

        let settings = SessionSettings {
            request_timeout: config.request_timeout(),
            decay_period: config.decay_period(),
        };
        let session = Session::new(remote, cache, keys, settings);

        Ok(Self { config, session })
    }

    pub fn config(&self) -> &GuildConfig {
        &self.config
    }

    /// Pick up the stored session if we are not signed in yet
    ///
    /// Returns the greeting when a session was resumed.
    pub async fn resume(&mut self) -> Result<Option<Notice>, SessionError> {
        if self.session.is_signed_in() {
            return Ok(None);
        }
        self.session.resume().await.map(Some)
    }
}

/// Offline hall holding the cached state, honoring the stored token
fn open_local_hall(cache: &dyn GuildRepository, keys: &dyn CredentialRepository) -> LocalGuild {
    let seed = cache.load().unwrap_or_else(|err| {
        warn!(error = %err, "ignoring unreadable local cache");
        None
    });
    let mut hall = LocalGuild::new(seed.unwrap_or_default());

    match keys.load() {
        Ok(Some(credentials)) => {
            hall.honor(credentials.access_token.clone());
            hall = hall.with_user(credentials.user);
        }
        Ok(None) => {}
        Err(err) => warn!(error = %err, "ignoring unreadable session keys"),
    }
    hall
}
