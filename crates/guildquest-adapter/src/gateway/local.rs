//! LocalGuild - An in-process guild hall for offline play
//!
//! Runs the same Guildmaster rules the real hall enforces, against state
//! seeded from the local cache. Tokens are issued per sign-in and checked
//! on every call, so an expired session behaves as it would online.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

use guildquest_domain::{
    Companion, Credentials, Decoration, DomainError, GuildState, Guildmaster, Quest, QuestDraft,
    QuestId, Timestamp, User,
};
use guildquest_usecase::{GuildRemote, RemoteError, SyncBundle};

struct Hall {
    state: GuildState,
    user: User,
    issued: Option<String>,
    presented: Option<String>,
}

/// Offline guild hall
pub struct LocalGuild {
    hall: Mutex<Hall>,
    guildmaster: Guildmaster,
}

impl LocalGuild {
    /// Open a hall holding `seed`
    pub fn new(seed: GuildState) -> Self {
        let user = User::new(Uuid::new_v4().to_string(), "adventurer@guild.local", seed.gold());
        Self {
            hall: Mutex::new(Hall {
                state: seed,
                user,
                issued: None,
                presented: None,
            }),
            guildmaster: Guildmaster::new(),
        }
    }

    /// Builder: keep the identity of a returning adventurer
    pub fn with_user(self, user: User) -> Self {
        if let Ok(mut hall) = self.hall.lock() {
            hall.user = user;
        }
        self
    }

    /// Invalidate the issued token; later calls answer 401
    pub fn revoke(&self) {
        if let Ok(mut hall) = self.hall.lock() {
            hall.issued = None;
        }
    }

    /// Accept the token stored from an earlier run
    pub fn honor(&self, access_token: impl Into<String>) {
        if let Ok(mut hall) = self.hall.lock() {
            hall.issued = Some(access_token.into());
        }
    }

    fn open(&self) -> Result<MutexGuard<'_, Hall>, RemoteError> {
        self.hall
            .lock()
            .map_err(|_| RemoteError::Transport("local hall poisoned".to_string()))
    }

    /// Lock the hall for an authenticated call
    fn enter(&self) -> Result<MutexGuard<'_, Hall>, RemoteError> {
        let hall = self.open()?;
        match (&hall.issued, &hall.presented) {
            (Some(issued), Some(presented)) if issued == presented => Ok(hall),
            _ => Err(RemoteError::Unauthorized),
        }
    }

    fn sign_in(&self, email: &str) -> Result<Credentials, RemoteError> {
        let mut hall = self.open()?;
        let token = format!("local-{}", Uuid::new_v4());
        hall.issued = Some(token.clone());
        hall.user.email = email.trim().to_string();
        hall.user.gold = hall.state.gold();
        debug!(email = %hall.user.email, "local hall issued token");

        Ok(Credentials {
            access_token: token,
            refresh_token: format!("local-{}", Uuid::new_v4()),
            user: hall.user.clone(),
        })
    }

    fn store(&self, hall: &mut Hall, draft: &QuestDraft) -> Quest {
        let quest = Quest::new(
            QuestId::new(Uuid::new_v4().to_string()),
            draft.clone(),
            Timestamp::now(),
        );
        self.guildmaster.post_quest(&mut hall.state, quest.clone());
        quest
    }
}

fn refused(err: DomainError) -> RemoteError {
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
impl GuildRemote for LocalGuild {
    fn authorize(&self, access_token: Option<String>) {
        if let Ok(mut hall) = self.hall.lock() {
            hall.presented = access_token;
        }
    }

    async fn login(&self, email: &str, _password: &str) -> Result<Credentials, RemoteError> {
        self.sign_in(email)
    }

    async fn register(&self, email: &str, _password: &str) -> Result<Credentials, RemoteError> {
        self.sign_in(email)
    }

    async fn me(&self) -> Result<User, RemoteError> {
        let hall = self.enter()?;
        let mut user = hall.user.clone();
        user.gold = hall.state.gold();
        Ok(user)
    }

    async fn list_quests(&self) -> Result<Vec<Quest>, RemoteError> {
        Ok(self.enter()?.state.board.quests().to_vec())
    }

    async fn create_quest(&self, draft: &QuestDraft) -> Result<Quest, RemoteError> {
        let mut hall = self.enter()?;
        Ok(self.store(&mut hall, draft))
    }

    async fn create_quests(&self, drafts: &[QuestDraft]) -> Result<Vec<Quest>, RemoteError> {
        let mut hall = self.enter()?;
        Ok(drafts.iter().map(|d| self.store(&mut hall, d)).collect())
    }

    async fn complete_quest(&self, id: &QuestId) -> Result<Quest, RemoteError> {
        let mut hall = self.enter()?;
        if hall.state.board.get(id).is_none() {
            return Err(RemoteError::NotFound);
        }
        if self.guildmaster.complete_quest(&mut hall.state, id).is_none() {
            return Err(RemoteError::AlreadyCompleted);
        }
        hall.state.board.get(id).cloned().ok_or(RemoteError::NotFound)
    }

    async fn delete_quest(&self, id: &QuestId) -> Result<(), RemoteError> {
        let mut hall = self.enter()?;
        if hall.state.board.delete(id) {
            Ok(())
        } else {
            Err(RemoteError::NotFound)
        }
    }

    async fn companion(&self) -> Result<Companion, RemoteError> {
        Ok(self.enter()?.state.companion.clone())
    }

    async fn feed(&self) -> Result<Companion, RemoteError> {
        let mut hall = self.enter()?;
        self.guildmaster.feed(&mut hall.state).map_err(refused)?;
        Ok(hall.state.companion.clone())
    }

    async fn play(&self) -> Result<Companion, RemoteError> {
        let mut hall = self.enter()?;
        self.guildmaster.play(&mut hall.state);
        Ok(hall.state.companion.clone())
    }

    async fn decorations(&self) -> Result<Vec<Decoration>, RemoteError> {
        Ok(self.enter()?.state.inventory.iter().collect())
    }

    async fn buy_decoration(&self, decoration: Decoration) -> Result<(), RemoteError> {
        let mut hall = self.enter()?;
        self.guildmaster
            .buy_decoration(&mut hall.state, decoration)
            .map_err(refused)?;
        Ok(())
    }

    async fn sync(&self, _since: Option<Timestamp>) -> Result<SyncBundle, RemoteError> {
        // Nothing changes here behind our back: hand back the whole hall
        let hall = self.enter()?;
        let mut user = hall.user.clone();
        user.gold = hall.state.gold();
        Ok(SyncBundle {
            quests: hall.state.board.quests().to_vec(),
            companion: Some(hall.state.companion.clone()),
            decorations: hall.state.inventory.iter().collect(),
            user: Some(user),
            synced_at: Timestamp::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn signed_in(seed: GuildState) -> LocalGuild {
        let hall = LocalGuild::new(seed);
        let credentials = hall.login("aria@guild.example", "pw").await.unwrap();
        assert!(credentials.access_token.starts_with("local-"));
        hall.authorize(Some(credentials.access_token));
        hall
    }

    #[tokio::test]
    async fn test_requires_token() {
        let hall = LocalGuild::new(GuildState::new());

        assert_eq!(hall.list_quests().await.unwrap_err(), RemoteError::Unauthorized);

        hall.login("aria@guild.example", "pw").await.unwrap();
        hall.authorize(Some("forged".to_string()));
        assert_eq!(hall.companion().await.unwrap_err(), RemoteError::Unauthorized);
    }

    #[tokio::test]
    async fn test_revoke_expires_session() {
        let hall = signed_in(GuildState::new()).await;
        assert!(hall.me().await.is_ok());

        hall.revoke();

        assert_eq!(hall.me().await.unwrap_err(), RemoteError::Unauthorized);
    }

    #[tokio::test]
    async fn test_honor_stored_token() {
        let hall = LocalGuild::new(GuildState::new());
        hall.honor("local-saved");
        hall.authorize(Some("local-saved".to_string()));

        assert!(hall.list_quests().await.is_ok());
    }

    #[tokio::test]
    async fn test_quest_lifecycle() {
        let hall = signed_in(GuildState::new()).await;
        let draft = QuestDraft::new("Wash dishes", "", 15).unwrap();

        let quest = hall.create_quest(&draft).await.unwrap();
        let done = hall.complete_quest(quest.id()).await.unwrap();
        assert!(done.is_completed());
        assert_eq!(hall.me().await.unwrap().gold, 15);

        let again = hall.complete_quest(quest.id()).await.unwrap_err();
        assert_eq!(again, RemoteError::AlreadyCompleted);
        assert_eq!(hall.me().await.unwrap().gold, 15);

        hall.delete_quest(quest.id()).await.unwrap();
        assert_eq!(
            hall.delete_quest(quest.id()).await.unwrap_err(),
            RemoteError::NotFound
        );
    }

    #[tokio::test]
    async fn test_economy_rules() {
        let hall = signed_in(GuildState::new().with_gold(60)).await;

        assert_eq!(hall.feed().await.unwrap().hunger(), 100.0);
        assert_eq!(
            hall.buy_decoration(Decoration::Chest).await.unwrap_err(),
            RemoteError::InsufficientGold
        );
        assert_eq!(hall.me().await.unwrap().gold, 40);

        let hall = signed_in(GuildState::new().with_gold(100)).await;
        hall.buy_decoration(Decoration::Chest).await.unwrap();
        assert_eq!(
            hall.buy_decoration(Decoration::Chest).await.unwrap_err(),
            RemoteError::AlreadyOwned
        );
        hall.feed().await.unwrap();
        hall.feed().await.unwrap();
        assert_eq!(hall.feed().await.unwrap_err(), RemoteError::InsufficientGold);
        assert_eq!(hall.me().await.unwrap().gold, 10);
        assert_eq!(hall.decorations().await.unwrap(), vec![Decoration::Chest]);
    }
}
