//! Session - One signed-in adventurer
//!
//! The session owns the [`GuildState`] cache and applies the
//! remote-authoritative policy to every mutation:
//!
//! 1. Check: the domain rejects what it can (empty title, not enough gold,
//!    already owned) without bothering the guild hall
//! 2. Ask: the guild hall performs the mutation, bounded by a timeout
//! 3. Mirror: only a confirmed mutation is applied to the cache, then the
//!    cache is written through to local storage
//!
//! A rejected token (401) from any call ends the session: keys and cache
//! are cleared and the decay timer stops.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use guildquest_domain::{
    parse_bulk, Completion, CredentialRepository, Credentials, Decoration, DomainError, GuildEvent,
    GuildRepository, GuildState, Guildmaster, Ledger, Quest, QuestBoard, QuestDraft, QuestId,
    Timestamp, User, FEED_COST,
};
use tokio::sync::Mutex;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::decay::DecayTimer;
use crate::error::{Result, SessionError};
use crate::notice::Notice;
use crate::remote::{GuildRemote, RemoteError};

/// Timing knobs for a session
#[derive(Debug, Clone, Copy)]
pub struct SessionSettings {
    /// How long a guild hall call may take before it counts as failed
    pub request_timeout: Duration,
    /// Period of the companion's decay tick
    pub decay_period: Duration,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(10),
            decay_period: Duration::from_secs(60),
        }
    }
}

/// Session - The explicit context object handed to the UI layer
pub struct Session {
    remote: Arc<dyn GuildRemote>,
    cache: Box<dyn GuildRepository + Send>,
    keys: Box<dyn CredentialRepository + Send>,
    state: Arc<Mutex<GuildState>>,
    guildmaster: Guildmaster,
    settings: SessionSettings,
    signed_in: Option<Credentials>,
    decay: Option<DecayTimer>,
    last_sync: Option<Timestamp>,
}

impl Session {
    pub fn new(
        remote: Arc<dyn GuildRemote>,
        cache: Box<dyn GuildRepository + Send>,
        keys: Box<dyn CredentialRepository + Send>,
        settings: SessionSettings,
    ) -> Self {
        Self {
            remote,
            cache,
            keys,
            state: Arc::new(Mutex::new(GuildState::default())),
            guildmaster: Guildmaster::new(),
            settings,
            signed_in: None,
            decay: None,
            last_sync: None,
        }
    }

    // ========== Getters ==========

    pub fn user(&self) -> Option<&User> {
        self.signed_in.as_ref().map(|c| &c.user)
    }

    pub fn is_signed_in(&self) -> bool {
        self.signed_in.is_some()
    }

    pub fn is_decaying(&self) -> bool {
        self.decay.as_ref().is_some_and(DecayTimer::is_running)
    }

    pub fn last_sync(&self) -> Option<Timestamp> {
        self.last_sync
    }

    /// A copy of the current state, for rendering
    pub async fn snapshot(&self) -> GuildState {
        self.state.lock().await.clone()
    }

    // ========== Sign-in / Sign-out ==========

    pub async fn login(&mut self, email: &str, password: &str) -> Result<Notice> {
        check_login(email, password)?;
        let remote = Arc::clone(&self.remote);
        let credentials = self.authenticate(remote.login(email, password)).await?;
        self.start(credentials).await
    }

    pub async fn register(&mut self, email: &str, password: &str) -> Result<Notice> {
        check_login(email, password)?;
        let remote = Arc::clone(&self.remote);
        let credentials = self.authenticate(remote.register(email, password)).await?;
        self.start(credentials).await
    }

    /// Continue the session saved by a previous run
    pub async fn resume(&mut self) -> Result<Notice> {
        match self.keys.load()? {
            Some(credentials) => self.start(credentials).await,
            None => Err(SessionError::NotSignedIn),
        }
    }

    pub async fn logout(&mut self) -> Result<Notice> {
        self.end().await;
        info!("signed out");
        Ok(Notice::info("Farewell, adventurer! Your companion awaits your return."))
    }

    // ========== Reconciliation ==========

    /// Reload everything from the guild hall, replacing the cache
    pub async fn refresh(&mut self) -> Result<()> {
        self.require_session()?;
        let remote = Arc::clone(&self.remote);
        let (quests, companion, decorations, user) = self
            .call(async {
                tokio::try_join!(
                    remote.list_quests(),
                    remote.companion(),
                    remote.decorations(),
                    remote.me()
                )
            })
            .await?;

        let mut state = Arc::clone(&self.state).lock_owned().await;
        state.board = QuestBoard::from_quests(quests);
        state.companion = companion;
        state.inventory = decorations.into_iter().collect();
        state.ledger = Ledger::new(user.gold);
        if let Some(credentials) = self.signed_in.as_mut() {
            credentials.user = user;
        }
        // Only the hall's own clock may stamp a sync point
        self.last_sync = None;
        self.persist(&state);

        info!(quests = state.board.len(), gold = state.gold(), "guild state refreshed");
        Ok(())
    }

    /// Pull what changed on the guild hall since the last sync
    pub async fn sync(&mut self) -> Result<Notice> {
        self.require_session()?;
        let remote = Arc::clone(&self.remote);
        let since = self.last_sync;
        let bundle = self.call(remote.sync(since)).await?;

        let mut state = Arc::clone(&self.state).lock_owned().await;
        let updated = bundle.quests.len();
        state.board.merge(bundle.quests);
        if let Some(companion) = bundle.companion {
            state.companion = companion;
        }
        for decoration in bundle.decorations {
            state.inventory.insert(decoration);
        }
        if let Some(user) = bundle.user {
            state.ledger = Ledger::new(user.gold);
            if let Some(credentials) = self.signed_in.as_mut() {
                credentials.user = user;
            }
        }
        self.last_sync = Some(bundle.synced_at);
        self.persist(&state);

        info!(updated, "synced with guild hall");
        Ok(Notice::info(format!("The guild ledger is up to date ({} quests updated).", updated)))
    }

    // ========== Quests ==========

    pub async fn post_quest(&mut self, draft: QuestDraft) -> Result<(Quest, Notice)> {
        self.require_session()?;
        let remote = Arc::clone(&self.remote);
        let quest = self.call(remote.create_quest(&draft)).await?;

        let mut state = Arc::clone(&self.state).lock_owned().await;
        let event = self.guildmaster.post_quest(&mut state, quest.clone());
        self.persist(&state);

        info!(quest_id = %quest.id(), reward = quest.reward(), "quest posted");
        Ok((quest, announce(&event)))
    }

    /// Post every line of a pasted list as a quest
    pub async fn post_bulk(&mut self, text: &str) -> Result<(Vec<Quest>, Notice)> {
        self.require_session()?;
        let drafts = parse_bulk(text);
        if drafts.is_empty() {
            return Err(DomainError::validation("quests", "no quests found in the list").into());
        }

        let remote = Arc::clone(&self.remote);
        let quests = self.call(remote.create_quests(&drafts)).await?;

        let mut state = Arc::clone(&self.state).lock_owned().await;
        let event = self.guildmaster.post_quests(&mut state, quests.clone());
        self.persist(&state);

        info!(count = quests.len(), "quests posted in bulk");
        Ok((quests, announce(&event)))
    }

    /// Complete a quest and collect its reward
    ///
    /// Unknown or already completed quests are a silent no-op (`Ok(None)`),
    /// so completing twice never pays twice.
    pub async fn complete_quest(&mut self, id: &QuestId) -> Result<Option<Notice>> {
        self.require_session()?;
        let pending = {
            let state = self.state.lock().await;
            state.board.get(id).is_some_and(|q| !q.is_completed())
        };
        if !pending {
            debug!(quest_id = %id, "nothing to complete");
            return Ok(None);
        }

        let remote = Arc::clone(&self.remote);
        let confirmed = match self.call(remote.complete_quest(id)).await {
            Ok(quest) => quest,
            Err(RemoteError::NotFound) => {
                self.forget_quest(id).await;
                return Ok(None);
            }
            Err(RemoteError::AlreadyCompleted) => {
                self.settle_quest(id).await;
                return Ok(None);
            }
            Err(err) => return Err(err.into()),
        };

        // The hall rewarded its own companion; ours has been decaying locally
        let companion = match self.call(remote.companion()).await {
            Ok(companion) => Some(companion),
            Err(RemoteError::Unauthorized) => return Err(SessionError::Unauthorized),
            Err(err) => {
                warn!(error = %err, "could not reload companion, rewarding locally");
                None
            }
        };

        let mut state = Arc::clone(&self.state).lock_owned().await;
        let event = match companion {
            Some(companion) => self
                .guildmaster
                .confirm_completion(&mut state, confirmed, companion),
            None => {
                let event = self.guildmaster.complete_quest(&mut state, id);
                state.board.upsert(confirmed);
                event
            }
        };
        self.persist(&state);

        if let Some(GuildEvent::QuestCompleted { reward, gold, growth, .. }) = &event {
            info!(quest_id = %id, reward, gold, leveled_up = growth.leveled_up(), "quest completed");
        }
        Ok(event.as_ref().map(announce))
    }

    /// Take a quest off the board; unknown ids are a silent no-op
    pub async fn delete_quest(&mut self, id: &QuestId) -> Result<Option<Notice>> {
        self.require_session()?;
        let known = self.state.lock().await.board.get(id).is_some();
        if !known {
            return Ok(None);
        }

        let remote = Arc::clone(&self.remote);
        match self.call(remote.delete_quest(id)).await {
            Ok(()) | Err(RemoteError::NotFound) => {}
            Err(err) => return Err(err.into()),
        }

        let mut state = Arc::clone(&self.state).lock_owned().await;
        let event = self.guildmaster.remove_quest(&mut state, id);
        self.persist(&state);

        info!(quest_id = %id, "quest removed");
        Ok(event.as_ref().map(announce))
    }

    // ========== Companion ==========

    pub async fn feed(&mut self) -> Result<Notice> {
        self.require_session()?;
        self.guildmaster.check_feed(&*self.state.lock().await)?;

        let remote = Arc::clone(&self.remote);
        let fed = match self.call(remote.feed()).await {
            Ok(companion) => companion,
            Err(RemoteError::InsufficientGold) => {
                return Err(self.insufficient(FEED_COST).await);
            }
            Err(err) => return Err(err.into()),
        };

        let mut state = Arc::clone(&self.state).lock_owned().await;
        let event = self.guildmaster.confirm_feed(&mut state, fed)?;
        self.persist(&state);

        info!(gold = state.gold(), "companion fed");
        Ok(announce(&event))
    }

    pub async fn play(&mut self) -> Result<Notice> {
        self.require_session()?;
        let remote = Arc::clone(&self.remote);
        let played = self.call(remote.play()).await?;

        let mut state = Arc::clone(&self.state).lock_owned().await;
        let event = self.guildmaster.confirm_play(&mut state, played);
        self.persist(&state);

        info!(happiness = state.companion.happiness(), "played with companion");
        Ok(announce(&event))
    }

    /// Apply one decay tick by hand (the timer does this on its own)
    pub async fn tick(&self) {
        let mut state = self.state.lock().await;
        self.guildmaster.decay(&mut state);
    }

    // ========== Chamber ==========

    pub async fn buy_decoration(&mut self, decoration: Decoration) -> Result<Notice> {
        self.require_session()?;
        self.guildmaster
            .check_purchase(&*self.state.lock().await, decoration)?;

        let remote = Arc::clone(&self.remote);
        match self.call(remote.buy_decoration(decoration)).await {
            Ok(()) => {}
            Err(RemoteError::AlreadyOwned) => {
                // The hall knows better: record it so we stop offering it
                let mut state = Arc::clone(&self.state).lock_owned().await;
                state.inventory.insert(decoration);
                self.persist(&state);
                return Err(DomainError::AlreadyOwned { decoration }.into());
            }
            Err(RemoteError::InsufficientGold) => {
                return Err(self.insufficient(decoration.cost()).await);
            }
            Err(err) => return Err(err.into()),
        }

        let mut state = Arc::clone(&self.state).lock_owned().await;
        let event = self.guildmaster.buy_decoration(&mut state, decoration)?;
        self.persist(&state);

        info!(%decoration, gold = state.gold(), "decoration bought");
        Ok(announce(&event))
    }

    // ========== Internals ==========

    fn require_session(&self) -> Result<()> {
        if self.signed_in.is_none() {
            return Err(SessionError::NotSignedIn);
        }
        Ok(())
    }

    /// Run a guild hall call under the request timeout
    ///
    /// A 401 ends the session before the error is handed back.
    async fn call<T>(
        &mut self,
        request: impl Future<Output = std::result::Result<T, RemoteError>>,
    ) -> std::result::Result<T, RemoteError> {
        let response = timeout(self.settings.request_timeout, request)
            .await
            .unwrap_or(Err(RemoteError::Timeout));

        match response {
            Err(RemoteError::Unauthorized) => {
                warn!("guild hall rejected the access token, clearing session");
                self.end().await;
                Err(RemoteError::Unauthorized)
            }
            Err(err) => {
                debug!(error = %err, "guild hall call failed");
                Err(err)
            }
            ok => ok,
        }
    }

    /// Like `call`, for sign-in: a 401 there means bad credentials
    async fn authenticate(
        &mut self,
        request: impl Future<Output = std::result::Result<Credentials, RemoteError>>,
    ) -> Result<Credentials> {
        let response = timeout(self.settings.request_timeout, request)
            .await
            .unwrap_or(Err(RemoteError::Timeout));

        match response {
            Ok(credentials) => Ok(credentials),
            Err(RemoteError::Unauthorized) => {
                Err(SessionError::Rejected("invalid credentials".to_string()))
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn start(&mut self, credentials: Credentials) -> Result<Notice> {
        self.stop_decay().await;
        self.remote.authorize(Some(credentials.access_token.clone()));
        if let Err(err) = self.keys.save(&credentials) {
            warn!(error = %err, "failed to store session keys");
        }

        let cached = self.cache.load().unwrap_or_else(|err| {
            warn!(error = %err, "ignoring unreadable local cache");
            None
        });
        {
            let mut state = self.state.lock().await;
            *state = cached.unwrap_or_default();
            state.ledger = Ledger::new(credentials.user.gold);
        }

        let greeting = format!("Welcome, {}!", credentials.user.display_name());
        info!(user = %credentials.user.email, "signed in");
        self.signed_in = Some(credentials);
        self.decay = Some(DecayTimer::spawn(
            Arc::clone(&self.state),
            self.settings.decay_period,
        ));

        match self.refresh().await {
            Ok(()) => Ok(Notice::success(greeting)),
            Err(SessionError::Unauthorized) => Err(SessionError::Unauthorized),
            Err(err) => {
                warn!(error = %err, "could not load from guild hall, showing local cache");
                Ok(Notice::warning("Failed to connect to the Guild Hall!"))
            }
        }
    }

    async fn end(&mut self) {
        self.stop_decay().await;
        self.remote.authorize(None);
        self.signed_in = None;
        self.last_sync = None;
        if let Err(err) = self.keys.clear() {
            warn!(error = %err, "failed to clear session keys");
        }
        if let Err(err) = self.cache.clear() {
            warn!(error = %err, "failed to clear local cache");
        }
        *self.state.lock().await = GuildState::default();
    }

    async fn stop_decay(&mut self) {
        if let Some(timer) = self.decay.take() {
            timer.stop().await;
        }
    }

    async fn forget_quest(&mut self, id: &QuestId) {
        let mut state = Arc::clone(&self.state).lock_owned().await;
        if state.board.delete(id) {
            debug!(quest_id = %id, "quest vanished from guild hall, dropped locally");
            self.persist(&state);
        }
    }

    /// Mark a quest the hall already completed, without paying it again
    async fn settle_quest(&mut self, id: &QuestId) {
        let mut state = Arc::clone(&self.state).lock_owned().await;
        if let Completion::Completed(_) = state.board.complete(id) {
            debug!(quest_id = %id, "quest already completed on guild hall");
            self.persist(&state);
        }
    }

    async fn insufficient(&self, needed: u64) -> SessionError {
        let available = self.state.lock().await.gold();
        DomainError::InsufficientFunds { needed, available }.into()
    }

    /// Write the confirmed state through to local storage
    ///
    /// The hall already accepted the mutation, so a local failure is
    /// logged and not reported.
    fn persist(&mut self, state: &GuildState) {
        if let Err(err) = self.cache.save(state) {
            warn!(error = %err, "failed to write local cache");
        }
        if let Some(credentials) = self.signed_in.as_mut() {
            credentials.user.gold = state.gold();
            if let Err(err) = self.keys.save(credentials) {
                warn!(error = %err, "failed to store session keys");
            }
        }
    }
}

fn check_login(email: &str, password: &str) -> Result<()> {
    if email.trim().is_empty() {
        return Err(DomainError::validation("email", "email is required").into());
    }
    if password.is_empty() {
        return Err(DomainError::validation("password", "password is required").into());
    }
    Ok(())
}

fn announce(event: &GuildEvent) -> Notice {
    Notice::from_event(event).unwrap_or_else(|| Notice::info("The guild is quiet."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notice::Tone;
    use crate::remote::SyncBundle;
    use async_trait::async_trait;
    use guildquest_domain::{Companion, RepositoryError};
    use std::sync::Mutex as StdMutex;

    // ============== Test doubles ==============

    #[derive(Default)]
    struct FakeHall {
        state: GuildState,
        next_id: u32,
        authorized: bool,
        failure: Option<RemoteError>,
        delay: Option<Duration>,
        broken: Vec<&'static str>,
        calls: Vec<&'static str>,
    }

    #[derive(Clone, Default)]
    struct FakeRemote {
        hall: Arc<StdMutex<FakeHall>>,
    }

    impl FakeRemote {
        fn with_state(state: GuildState) -> Self {
            let remote = Self::default();
            remote.hall.lock().unwrap().state = state;
            remote
        }

        fn fail_next(&self, err: RemoteError) {
            self.hall.lock().unwrap().failure = Some(err);
        }

        fn break_call(&self, call: &'static str) {
            self.hall.lock().unwrap().broken.push(call);
        }

        fn slow_down(&self, delay: Duration) {
            self.hall.lock().unwrap().delay = Some(delay);
        }

        fn calls(&self, name: &str) -> usize {
            self.hall.lock().unwrap().calls.iter().filter(|c| **c == name).count()
        }

        fn gold(&self) -> u64 {
            self.hall.lock().unwrap().state.gold()
        }

        async fn enter(&self, call: &'static str) -> std::result::Result<(), RemoteError> {
            let (delay, failure, authorized) = {
                let mut hall = self.hall.lock().unwrap();
                hall.calls.push(call);
                let failure = if hall.broken.contains(&call) {
                    Some(RemoteError::Transport("connection refused".to_string()))
                } else {
                    hall.failure.take()
                };
                (hall.delay, failure, hall.authorized)
            };
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            if let Some(err) = failure {
                return Err(err);
            }
            if !authorized && call != "login" && call != "register" {
                return Err(RemoteError::Unauthorized);
            }
            Ok(())
        }

        fn with_hall<T>(&self, f: impl FnOnce(&mut FakeHall) -> T) -> T {
            f(&mut self.hall.lock().unwrap())
        }

        fn credentials(&self, email: &str) -> Credentials {
            Credentials {
                access_token: "access-1".to_string(),
                refresh_token: "refresh-1".to_string(),
                user: User::new("u-1", email, self.gold()),
            }
        }
    }

    fn store(hall: &mut FakeHall, draft: &QuestDraft) -> Quest {
        hall.next_id += 1;
        let quest = Quest::new(
            QuestId::new(format!("q-{}", hall.next_id)),
            draft.clone(),
            Timestamp::from_millis(0),
        );
        Guildmaster::new().post_quest(&mut hall.state, quest.clone());
        quest
    }

    fn economy(err: DomainError) -> RemoteError {
        match err {
            DomainError::InsufficientFunds { .. } => RemoteError::InsufficientGold,
            DomainError::AlreadyOwned { .. } => RemoteError::AlreadyOwned,
            other => RemoteError::Server {
                status: 400,
                message: other.to_string(),
            },
        }
    }

    #[async_trait]
    impl GuildRemote for FakeRemote {
        fn authorize(&self, access_token: Option<String>) {
            self.hall.lock().unwrap().authorized = access_token.is_some();
        }

        async fn login(&self, email: &str, _password: &str) -> std::result::Result<Credentials, RemoteError> {
            self.enter("login").await?;
            Ok(self.credentials(email))
        }

        async fn register(&self, email: &str, _password: &str) -> std::result::Result<Credentials, RemoteError> {
            self.enter("register").await?;
            Ok(self.credentials(email))
        }

        async fn me(&self) -> std::result::Result<User, RemoteError> {
            self.enter("me").await?;
            Ok(User::new("u-1", "aria@guild.example", self.gold()))
        }

        async fn list_quests(&self) -> std::result::Result<Vec<Quest>, RemoteError> {
            self.enter("list_quests").await?;
            Ok(self.with_hall(|h| h.state.board.quests().to_vec()))
        }

        async fn create_quest(&self, draft: &QuestDraft) -> std::result::Result<Quest, RemoteError> {
            self.enter("create_quest").await?;
            Ok(self.with_hall(|h| store(h, draft)))
        }

        async fn create_quests(&self, drafts: &[QuestDraft]) -> std::result::Result<Vec<Quest>, RemoteError> {
            self.enter("create_quests").await?;
            Ok(self.with_hall(|h| drafts.iter().map(|d| store(h, d)).collect()))
        }

        async fn complete_quest(&self, id: &QuestId) -> std::result::Result<Quest, RemoteError> {
            self.enter("complete_quest").await?;
            self.with_hall(|h| {
                h.state.board.get(id).ok_or(RemoteError::NotFound)?;
                Guildmaster::new()
                    .complete_quest(&mut h.state, id)
                    .ok_or(RemoteError::AlreadyCompleted)?;
                h.state.board.get(id).cloned().ok_or(RemoteError::NotFound)
            })
        }

        async fn delete_quest(&self, id: &QuestId) -> std::result::Result<(), RemoteError> {
            self.enter("delete_quest").await?;
            self.with_hall(|h| {
                if h.state.board.delete(id) {
                    Ok(())
                } else {
                    Err(RemoteError::NotFound)
                }
            })
        }

        async fn companion(&self) -> std::result::Result<Companion, RemoteError> {
            self.enter("companion").await?;
            Ok(self.with_hall(|h| h.state.companion.clone()))
        }

        async fn feed(&self) -> std::result::Result<Companion, RemoteError> {
            self.enter("feed").await?;
            self.with_hall(|h| {
                Guildmaster::new().feed(&mut h.state).map_err(economy)?;
                Ok(h.state.companion.clone())
            })
        }

        async fn play(&self) -> std::result::Result<Companion, RemoteError> {
            self.enter("play").await?;
            Ok(self.with_hall(|h| {
                Guildmaster::new().play(&mut h.state);
                h.state.companion.clone()
            }))
        }

        async fn decorations(&self) -> std::result::Result<Vec<Decoration>, RemoteError> {
            self.enter("decorations").await?;
            Ok(self.with_hall(|h| h.state.inventory.iter().collect()))
        }

        async fn buy_decoration(&self, decoration: Decoration) -> std::result::Result<(), RemoteError> {
            self.enter("buy_decoration").await?;
            self.with_hall(|h| {
                Guildmaster::new()
                    .buy_decoration(&mut h.state, decoration)
                    .map(|_| ())
                    .map_err(economy)
            })
        }

        async fn sync(&self, _since: Option<Timestamp>) -> std::result::Result<SyncBundle, RemoteError> {
            self.enter("sync").await?;
            Ok(self.with_hall(|h| SyncBundle {
                quests: h.state.board.quests().to_vec(),
                companion: Some(h.state.companion.clone()),
                decorations: h.state.inventory.iter().collect(),
                user: None,
                synced_at: Timestamp::from_millis(42),
            }))
        }
    }

    #[derive(Clone, Default)]
    struct MemoryCache(Arc<StdMutex<Option<GuildState>>>);

    impl GuildRepository for MemoryCache {
        fn load(&self) -> std::result::Result<Option<GuildState>, RepositoryError> {
            Ok(self.0.lock().unwrap().clone())
        }

        fn save(&mut self, state: &GuildState) -> std::result::Result<(), RepositoryError> {
            *self.0.lock().unwrap() = Some(state.clone());
            Ok(())
        }

        fn clear(&mut self) -> std::result::Result<(), RepositoryError> {
            *self.0.lock().unwrap() = None;
            Ok(())
        }
    }

    #[derive(Clone, Default)]
    struct MemoryKeys(Arc<StdMutex<Option<Credentials>>>);

    impl CredentialRepository for MemoryKeys {
        fn load(&self) -> std::result::Result<Option<Credentials>, RepositoryError> {
            Ok(self.0.lock().unwrap().clone())
        }

        fn save(&mut self, credentials: &Credentials) -> std::result::Result<(), RepositoryError> {
            *self.0.lock().unwrap() = Some(credentials.clone());
            Ok(())
        }

        fn clear(&mut self) -> std::result::Result<(), RepositoryError> {
            *self.0.lock().unwrap() = None;
            Ok(())
        }
    }

    struct Harness {
        session: Session,
        remote: FakeRemote,
        cache: MemoryCache,
        keys: MemoryKeys,
    }

    fn harness(hall_state: GuildState) -> Harness {
        let remote = FakeRemote::with_state(hall_state);
        let cache = MemoryCache::default();
        let keys = MemoryKeys::default();
        let session = Session::new(
            Arc::new(remote.clone()),
            Box::new(cache.clone()),
            Box::new(keys.clone()),
            SessionSettings::default(),
        );
        Harness {
            session,
            remote,
            cache,
            keys,
        }
    }

    async fn signed_in(hall_state: GuildState) -> Harness {
        let mut h = harness(hall_state);
        h.session.login("aria@guild.example", "hunter22").await.unwrap();
        h
    }

    fn draft(title: &str, reward: u32) -> QuestDraft {
        QuestDraft::new(title, "", reward).unwrap()
    }

    // ============== Sign-in ==============

    #[tokio::test]
    async fn test_login_loads_hall_state() {
        let mut h = harness(GuildState::new().with_gold(35));

        let notice = h.session.login("aria@guild.example", "hunter22").await.unwrap();

        assert_eq!(notice.text, "Welcome, aria!");
        assert!(h.session.is_signed_in());
        assert!(h.session.is_decaying());
        assert_eq!(h.session.snapshot().await.gold(), 35);
        assert!(h.keys.load().unwrap().is_some());
        assert!(h.session.last_sync().is_none());
    }

    #[tokio::test]
    async fn test_login_requires_email() {
        let mut h = harness(GuildState::new());

        let err = h.session.login("  ", "secret").await.unwrap_err();

        assert!(matches!(err, SessionError::Domain(DomainError::Validation { field: "email", .. })));
        assert_eq!(h.remote.calls("login"), 0);
    }

    #[tokio::test]
    async fn test_actions_require_sign_in() {
        let mut h = harness(GuildState::new());

        let err = h.session.feed().await.unwrap_err();
        assert!(matches!(err, SessionError::NotSignedIn));
    }

    #[tokio::test]
    async fn test_resume_uses_stored_keys() {
        let mut h = harness(GuildState::new().with_gold(12));
        assert!(matches!(h.session.resume().await, Err(SessionError::NotSignedIn)));

        let credentials = h.remote.credentials("aria@guild.example");
        h.keys.clone().save(&credentials).unwrap();

        h.session.resume().await.unwrap();
        assert_eq!(h.session.user().unwrap().email, "aria@guild.example");
        assert_eq!(h.session.snapshot().await.gold(), 12);
    }

    #[tokio::test]
    async fn test_login_with_unreachable_hall_uses_cache() {
        let mut h = harness(GuildState::new().with_gold(5));
        let mut cached = GuildState::new();
        cached.board.upsert(Quest::new(
            QuestId::new("cached-1"),
            draft("From last time", 10),
            Timestamp::from_millis(0),
        ));
        h.cache.clone().save(&cached).unwrap();
        h.remote.break_call("list_quests");

        let notice = h.session.login("aria@guild.example", "hunter22").await.unwrap();

        assert_eq!(notice.tone, Tone::Warning);
        assert_eq!(notice.text, "Failed to connect to the Guild Hall!");
        assert!(h.session.is_signed_in());
        let state = h.session.snapshot().await;
        assert!(state.board.get(&QuestId::new("cached-1")).is_some());
        assert_eq!(state.gold(), 5);
    }

    // ============== Quests ==============

    #[tokio::test]
    async fn test_post_and_complete_quest() {
        let mut h = signed_in(GuildState::new()).await;

        let (quest, notice) = h.session.post_quest(draft("Wash dishes", 15)).await.unwrap();
        assert_eq!(notice.text, "A new quest has been posted!");

        let notice = h.session.complete_quest(quest.id()).await.unwrap().unwrap();
        assert_eq!(notice.text, "Well done, adventurer! Gold earned!");

        let state = h.session.snapshot().await;
        assert_eq!(state.gold(), 15);
        assert!(state.board.get(quest.id()).unwrap().is_completed());
        assert_eq!(h.remote.gold(), 15);
    }

    #[tokio::test]
    async fn test_complete_twice_pays_once() {
        let mut h = signed_in(GuildState::new()).await;
        let (quest, _) = h.session.post_quest(draft("Pay rent", 15)).await.unwrap();

        h.session.complete_quest(quest.id()).await.unwrap();
        let second = h.session.complete_quest(quest.id()).await.unwrap();

        assert!(second.is_none());
        assert_eq!(h.session.snapshot().await.gold(), 15);
        assert_eq!(h.remote.calls("complete_quest"), 1);
    }

    #[tokio::test]
    async fn test_complete_with_level_up() {
        let mut hall = GuildState::new();
        hall.companion = Companion::restore("dragon", 1, 95, 100.0, 100.0);
        let mut h = signed_in(hall).await;
        let (quest, _) = h.session.post_quest(draft("Slay the dragon", 15)).await.unwrap();

        let notice = h.session.complete_quest(quest.id()).await.unwrap().unwrap();

        assert_eq!(notice.text, "Quest complete! Your companion grows stronger!");
        let state = h.session.snapshot().await;
        assert_eq!(state.gold(), 15);
        assert_eq!(state.companion.level(), 2);
        assert_eq!(state.companion.exp(), 0);
    }

    #[tokio::test]
    async fn test_quest_completed_elsewhere() {
        let mut h = signed_in(GuildState::new()).await;
        let (quest, _) = h.session.post_quest(draft("Pay rent", 15)).await.unwrap();
        h.remote.with_hall(|hall| {
            Guildmaster::new().complete_quest(&mut hall.state, quest.id());
        });

        let outcome = h.session.complete_quest(quest.id()).await.unwrap();

        assert!(outcome.is_none());
        let state = h.session.snapshot().await;
        assert!(state.board.get(quest.id()).unwrap().is_completed());
        assert_eq!(state.gold(), 0);
        assert!(h.cache.load().unwrap().unwrap().board.get(quest.id()).unwrap().is_completed());

        assert!(h.session.complete_quest(quest.id()).await.unwrap().is_none());
        assert_eq!(h.remote.calls("complete_quest"), 1);
    }

    #[tokio::test]
    async fn test_complete_adopts_hall_companion() {
        let mut h = signed_in(GuildState::new()).await;
        let (quest, _) = h.session.post_quest(draft("Walk the dog", 10)).await.unwrap();
        h.session.tick().await;

        h.session.complete_quest(quest.id()).await.unwrap().unwrap();

        let hall_companion = h.remote.with_hall(|hall| hall.state.companion.clone());
        let state = h.session.snapshot().await;
        assert_eq!(state.companion, hall_companion);
        assert_eq!(state.companion.hunger(), 100.0);
        assert_eq!(state.companion.exp(), 10);
        assert_eq!(h.remote.calls("companion"), 2);
    }

    #[tokio::test]
    async fn test_complete_rewards_locally_without_companion() {
        let mut h = signed_in(GuildState::new()).await;
        let (quest, _) = h.session.post_quest(draft("Water plants", 10)).await.unwrap();
        h.remote.break_call("companion");

        let notice = h.session.complete_quest(quest.id()).await.unwrap().unwrap();

        assert_eq!(notice.text, "Well done, adventurer! Gold earned!");
        let state = h.session.snapshot().await;
        assert_eq!(state.gold(), 10);
        assert_eq!(state.companion.exp(), 10);
        assert!(state.board.get(quest.id()).unwrap().is_completed());
    }

    #[tokio::test]
    async fn test_complete_unknown_is_silent() {
        let mut h = signed_in(GuildState::new()).await;

        let outcome = h.session.complete_quest(&QuestId::new("ghost")).await.unwrap();

        assert!(outcome.is_none());
        assert_eq!(h.remote.calls("complete_quest"), 0);
    }

    #[tokio::test]
    async fn test_bulk_import() {
        let mut h = signed_in(GuildState::new()).await;

        let (quests, notice) = h
            .session
            .post_bulk("1. Wash dishes\n2. Pay rent\n")
            .await
            .unwrap();

        assert_eq!(notice.text, "2 quests added to the board!");
        let titles: Vec<&str> = quests.iter().map(|q| q.title()).collect();
        assert_eq!(titles, vec!["Wash dishes", "Pay rent"]);
        assert!(quests.iter().all(|q| q.reward() == 10 && !q.is_completed()));
        assert_eq!(h.session.snapshot().await.board.len(), 2);
    }

    #[tokio::test]
    async fn test_bulk_blank_text_rejected_locally() {
        let mut h = signed_in(GuildState::new()).await;

        let err = h.session.post_bulk("\n   \n").await.unwrap_err();

        assert!(matches!(err, SessionError::Domain(DomainError::Validation { .. })));
        assert_eq!(h.remote.calls("create_quests"), 0);
    }

    #[tokio::test]
    async fn test_delete_quest_is_idempotent() {
        let mut h = signed_in(GuildState::new()).await;
        let (quest, _) = h.session.post_quest(draft("Sweep", 10)).await.unwrap();

        assert!(h.session.delete_quest(quest.id()).await.unwrap().is_some());
        assert!(h.session.delete_quest(quest.id()).await.unwrap().is_none());
        assert!(h.session.snapshot().await.board.is_empty());
    }

    #[tokio::test]
    async fn test_transport_failure_applies_nothing() {
        let mut h = signed_in(GuildState::new()).await;
        h.remote.fail_next(RemoteError::Transport("connection reset".to_string()));

        let err = h.session.post_quest(draft("Lost in the mail", 10)).await.unwrap_err();

        assert!(matches!(err, SessionError::Transport(_)));
        assert!(h.session.snapshot().await.board.is_empty());
        assert!(h.session.is_signed_in());
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_hall_times_out() {
        let mut h = signed_in(GuildState::new()).await;
        h.remote.slow_down(Duration::from_secs(30));

        let err = h.session.post_quest(draft("Too slow", 10)).await.unwrap_err();

        assert!(matches!(err, SessionError::Transport(_)));
        assert!(h.session.snapshot().await.board.is_empty());
    }

    // ============== Economy ==============

    #[tokio::test]
    async fn test_feed_with_insufficient_gold() {
        let mut hall = GuildState::new().with_gold(10);
        hall.companion = Companion::restore("dragon", 1, 0, 40.0, 40.0);
        let mut h = signed_in(hall).await;
        let before = h.session.snapshot().await.companion;

        let err = h.session.feed().await.unwrap_err();

        assert!(matches!(
            err,
            SessionError::Domain(DomainError::InsufficientFunds { needed: 20, available: 10 })
        ));
        let state = h.session.snapshot().await;
        assert_eq!(state.gold(), 10);
        assert_eq!(state.companion, before);
        assert_eq!(h.remote.calls("feed"), 0);
    }

    #[tokio::test]
    async fn test_feed_mirrors_hall() {
        let mut hall = GuildState::new().with_gold(30);
        hall.companion = Companion::restore("dragon", 1, 0, 40.0, 40.0);
        let mut h = signed_in(hall).await;

        let notice = h.session.feed().await.unwrap();

        assert_eq!(notice.text, "Your companion is well fed!");
        let state = h.session.snapshot().await;
        assert_eq!(state.gold(), 10);
        assert_eq!(state.companion.hunger(), 70.0);
        assert_eq!(h.cache.load().unwrap().unwrap().gold(), 10);
        assert_eq!(h.keys.load().unwrap().unwrap().user.gold, 10);
    }

    #[tokio::test]
    async fn test_hall_refuses_feed() {
        let mut h = signed_in(GuildState::new().with_gold(30)).await;
        h.remote.fail_next(RemoteError::InsufficientGold);

        let err = h.session.feed().await.unwrap_err();

        assert!(matches!(
            err,
            SessionError::Domain(DomainError::InsufficientFunds { needed: 20, available: 30 })
        ));
        assert_eq!(h.session.snapshot().await.gold(), 30);
    }

    #[tokio::test]
    async fn test_play_is_free() {
        let mut hall = GuildState::new();
        hall.companion = Companion::restore("dragon", 1, 0, 50.0, 50.0);
        let mut h = signed_in(hall).await;

        h.session.play().await.unwrap();

        let state = h.session.snapshot().await;
        assert_eq!(state.companion.happiness(), 70.0);
        assert_eq!(state.companion.hunger(), 45.0);
        assert_eq!(state.gold(), 0);
    }

    #[tokio::test]
    async fn test_buy_decoration() {
        let mut h = signed_in(GuildState::new().with_gold(60)).await;

        let notice = h.session.buy_decoration(Decoration::Banner).await.unwrap();
        assert_eq!(notice.text, "Chamber decorated beautifully!");

        let err = h.session.buy_decoration(Decoration::Banner).await.unwrap_err();
        assert!(matches!(err, SessionError::Domain(DomainError::AlreadyOwned { .. })));

        let err = h.session.buy_decoration(Decoration::Torch).await.unwrap_err();
        assert!(matches!(err, SessionError::Domain(DomainError::InsufficientFunds { .. })));

        let state = h.session.snapshot().await;
        assert_eq!(state.gold(), 10);
        assert_eq!(state.inventory.len(), 1);
        assert_eq!(h.remote.calls("buy_decoration"), 1);
    }

    #[tokio::test]
    async fn test_hall_says_already_owned() {
        let mut h = signed_in(GuildState::new().with_gold(60)).await;
        h.remote.fail_next(RemoteError::AlreadyOwned);

        let err = h.session.buy_decoration(Decoration::Armor).await.unwrap_err();

        assert!(matches!(err, SessionError::Domain(DomainError::AlreadyOwned { .. })));
        let state = h.session.snapshot().await;
        assert!(state.inventory.owns(Decoration::Armor));
        assert_eq!(state.gold(), 60);
    }

    // ============== Session lifetime ==============

    #[tokio::test]
    async fn test_unauthorized_clears_session() {
        let mut h = signed_in(GuildState::new().with_gold(40)).await;
        h.session.post_quest(draft("Keep me", 10)).await.unwrap();
        h.remote.fail_next(RemoteError::Unauthorized);

        let err = h.session.play().await.unwrap_err();

        assert!(matches!(err, SessionError::Unauthorized));
        assert!(!h.session.is_signed_in());
        assert!(!h.session.is_decaying());
        assert!(h.keys.load().unwrap().is_none());
        assert!(h.cache.load().unwrap().is_none());
        let state = h.session.snapshot().await;
        assert_eq!(state.gold(), 0);
        assert!(state.board.is_empty());
        assert_eq!(state.companion, Companion::default());
    }

    #[tokio::test]
    async fn test_logout_resets_state() {
        let mut h = signed_in(GuildState::new().with_gold(40)).await;

        h.session.logout().await.unwrap();

        assert!(!h.session.is_signed_in());
        assert!(!h.session.is_decaying());
        assert_eq!(h.session.snapshot().await.gold(), 0);
        assert!(h.keys.load().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_sync_merges_hall_changes() {
        let mut h = signed_in(GuildState::new()).await;
        h.remote.with_hall(|hall| {
            store(hall, &draft("Posted elsewhere", 25));
        });

        let notice = h.session.sync().await.unwrap();

        assert!(notice.text.contains("1 quests updated"));
        assert_eq!(h.session.snapshot().await.board.len(), 1);
        assert_eq!(h.session.last_sync(), Some(Timestamp::from_millis(42)));
    }

    #[tokio::test]
    async fn test_manual_tick_decays() {
        let h = signed_in(GuildState::new()).await;

        h.session.tick().await;

        assert_eq!(h.session.snapshot().await.companion.hunger(), 99.0);
    }
}
