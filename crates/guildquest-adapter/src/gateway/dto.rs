//! Wire format of the guild hall REST API
//!
//! Field names are camelCase on the wire. Lists may arrive as `null`,
//! so every collection is optional on the way in.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use guildquest_domain::{Companion, Credentials, Decoration, Quest, QuestDraft, QuestId, Timestamp, User};
use guildquest_usecase::SyncBundle;

// ========== Requests ==========

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub struct CreateTaskRequest<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub reward: u32,
}

impl<'a> From<&'a QuestDraft> for CreateTaskRequest<'a> {
    fn from(draft: &'a QuestDraft) -> Self {
        Self {
            title: draft.title(),
            description: draft.description(),
            reward: draft.reward(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BulkTaskRequest<'a> {
    pub tasks: Vec<CreateTaskRequest<'a>>,
}

#[derive(Debug, Serialize)]
pub struct BuyDecorationRequest<'a> {
    pub decoration: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncRequest {
    pub last_sync_at: DateTime<Utc>,
}

impl SyncRequest {
    /// `None` asks for everything since the epoch
    pub fn since(since: Option<Timestamp>) -> Self {
        Self {
            last_sync_at: since.map(to_datetime).unwrap_or(DateTime::UNIX_EPOCH),
        }
    }
}

// ========== Responses ==========

#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default)]
    pub code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub gold: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl From<UserDto> for User {
    fn from(dto: UserDto) -> Self {
        User::new(dto.id, dto.email, non_negative(dto.gold))
    }
}

impl From<&User> for UserDto {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            email: user.email.clone(),
            gold: i64::try_from(user.gold).unwrap_or(i64::MAX),
            created_at: None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: String,
    pub user: UserDto,
}

impl From<AuthResponse> for Credentials {
    fn from(dto: AuthResponse) -> Self {
        Credentials {
            access_token: dto.access_token,
            refresh_token: dto.refresh_token,
            user: dto.user.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDto {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub reward: i64,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<TaskDto> for Quest {
    fn from(dto: TaskDto) -> Self {
        Quest::restore(
            QuestId::new(dto.id),
            dto.title,
            dto.description,
            u32::try_from(dto.reward.max(0)).unwrap_or(u32::MAX),
            dto.completed,
            dto.created_at.map(to_timestamp).unwrap_or_default(),
        )
    }
}

impl From<&Quest> for TaskDto {
    fn from(quest: &Quest) -> Self {
        Self {
            id: quest.id().to_string(),
            user_id: None,
            title: quest.title().to_string(),
            description: quest.description().to_string(),
            reward: i64::from(quest.reward()),
            completed: quest.is_completed(),
            created_at: Some(to_datetime(quest.created_at())),
            updated_at: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PetDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: String,
    pub level: i64,
    pub exp: i64,
    pub hunger: f64,
    pub happiness: f64,
}

impl From<PetDto> for Companion {
    fn from(dto: PetDto) -> Self {
        Companion::restore(
            dto.kind,
            u32::try_from(dto.level.max(1)).unwrap_or(u32::MAX),
            u32::try_from(dto.exp.max(0)).unwrap_or(u32::MAX),
            dto.hunger,
            dto.happiness,
        )
    }
}

impl From<&Companion> for PetDto {
    fn from(companion: &Companion) -> Self {
        Self {
            user_id: None,
            kind: companion.kind().to_string(),
            level: i64::from(companion.level()),
            exp: i64::from(companion.exp()),
            hunger: companion.hunger(),
            happiness: companion.happiness(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecorationDto {
    pub decoration: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncResponse {
    #[serde(default)]
    pub tasks: Option<Vec<TaskDto>>,
    #[serde(default)]
    pub pet: Option<PetDto>,
    #[serde(default)]
    pub decorations: Option<Vec<DecorationDto>>,
    #[serde(default)]
    pub user: Option<UserDto>,
    #[serde(default)]
    pub synced_at: Option<DateTime<Utc>>,
}

impl From<SyncResponse> for SyncBundle {
    fn from(dto: SyncResponse) -> Self {
        SyncBundle {
            quests: dto.tasks.unwrap_or_default().into_iter().map(Quest::from).collect(),
            companion: dto.pet.map(Companion::from),
            decorations: decorations(dto.decorations.unwrap_or_default()),
            user: dto.user.map(User::from),
            synced_at: dto.synced_at.map(to_timestamp).unwrap_or_else(Timestamp::now),
        }
    }
}

/// Decoration names the shop knows; unknown ones are skipped
pub fn decorations(records: Vec<DecorationDto>) -> Vec<Decoration> {
    records
        .into_iter()
        .filter_map(|record| match record.decoration.parse() {
            Ok(decoration) => Some(decoration),
            Err(_) => {
                warn!(decoration = %record.decoration, "ignoring unknown decoration");
                None
            }
        })
        .collect()
}

// ========== Conversions ==========

pub fn to_timestamp(time: DateTime<Utc>) -> Timestamp {
    Timestamp::from_millis(time.timestamp_millis())
}

pub fn to_datetime(timestamp: Timestamp) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(timestamp.as_millis())
        .single()
        .unwrap_or(DateTime::UNIX_EPOCH)
}

fn non_negative(gold: i64) -> u64 {
    u64::try_from(gold).unwrap_or(0)
}
