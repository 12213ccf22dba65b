//! JSON file persistence
//!
//! Two files under the data directory:
//!
//! ```text
//! ~/.guildquest/
//! ├── guildquest_data.json      {tasks, gold, pet, decorations}
//! └── guildquest_session.json   {accessToken, refreshToken, user}
//! ```
//!
//! Writes go to a sibling temp file first and are renamed into place.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use guildquest_domain::{
    Companion, CredentialRepository, Credentials, GuildRepository, GuildState, Inventory, Ledger,
    Quest, QuestBoard, RepositoryError,
};

use crate::gateway::dto::{self, DecorationDto, PetDto, TaskDto, UserDto};

pub const DATA_FILE: &str = "guildquest_data.json";
pub const SESSION_FILE: &str = "guildquest_session.json";

#[derive(Debug, Serialize, Deserialize)]
struct SnapshotFile {
    #[serde(default)]
    tasks: Vec<TaskDto>,
    #[serde(default)]
    gold: u64,
    #[serde(default)]
    pet: Option<PetDto>,
    #[serde(default)]
    decorations: Vec<String>,
}

impl From<&GuildState> for SnapshotFile {
    fn from(state: &GuildState) -> Self {
        Self {
            tasks: state.board.quests().iter().map(TaskDto::from).collect(),
            gold: state.gold(),
            pet: Some(PetDto::from(&state.companion)),
            decorations: state.inventory.iter().map(|d| d.as_str().to_string()).collect(),
        }
    }
}

impl From<SnapshotFile> for GuildState {
    fn from(file: SnapshotFile) -> Self {
        let records = file
            .decorations
            .into_iter()
            .map(|decoration| DecorationDto { decoration })
            .collect();

        GuildState {
            board: QuestBoard::from_quests(file.tasks.into_iter().map(Quest::from)),
            ledger: Ledger::new(file.gold),
            companion: file.pet.map(Companion::from).unwrap_or_default(),
            inventory: dto::decorations(records).into_iter().collect::<Inventory>(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionFile {
    access_token: String,
    #[serde(default)]
    refresh_token: String,
    user: UserDto,
}

// ========== Helpers ==========

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, RepositoryError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(RepositoryError::PersistenceError {
                message: format!("{}: {}", path.display(), e),
            })
        }
    };

    serde_json::from_str(&content)
        .map(Some)
        .map_err(|e| RepositoryError::Corrupted {
            message: format!("{}: {}", path.display(), e),
        })
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), RepositoryError> {
    let failed = |e: &dyn std::fmt::Display| RepositoryError::PersistenceError {
        message: format!("{}: {}", path.display(), e),
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| failed(&e))?;
    }
    let content = serde_json::to_string_pretty(value).map_err(|e| failed(&e))?;
    let staging = path.with_extension("json.tmp");
    fs::write(&staging, content).map_err(|e| failed(&e))?;
    fs::rename(&staging, path).map_err(|e| failed(&e))?;

    debug!(path = %path.display(), "wrote local file");
    Ok(())
}

fn remove(path: &Path) -> Result<(), RepositoryError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(RepositoryError::PersistenceError {
            message: format!("{}: {}", path.display(), e),
        }),
    }
}

// ========== Repositories ==========

/// Guild snapshot stored as `guildquest_data.json`
#[derive(Debug, Clone)]
pub struct FileGuildRepository {
    path: PathBuf,
}

impl FileGuildRepository {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            path: data_dir.as_ref().join(DATA_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl GuildRepository for FileGuildRepository {
    fn load(&self) -> Result<Option<GuildState>, RepositoryError> {
        Ok(read_json::<SnapshotFile>(&self.path)?.map(GuildState::from))
    }

    fn save(&mut self, state: &GuildState) -> Result<(), RepositoryError> {
        write_json(&self.path, &SnapshotFile::from(state))
    }

    fn clear(&mut self) -> Result<(), RepositoryError> {
        remove(&self.path)
    }
}

/// Session keys stored as `guildquest_session.json`
#[derive(Debug, Clone)]
pub struct FileCredentialRepository {
    path: PathBuf,
}

impl FileCredentialRepository {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            path: data_dir.as_ref().join(SESSION_FILE),
        }
    }
}

impl CredentialRepository for FileCredentialRepository {
    fn load(&self) -> Result<Option<Credentials>, RepositoryError> {
        Ok(read_json::<SessionFile>(&self.path)?.map(|file| Credentials {
            access_token: file.access_token,
            refresh_token: file.refresh_token,
            user: file.user.into(),
        }))
    }

    fn save(&mut self, credentials: &Credentials) -> Result<(), RepositoryError> {
        let file = SessionFile {
            access_token: credentials.access_token.clone(),
            refresh_token: credentials.refresh_token.clone(),
            user: UserDto::from(&credentials.user),
        };
        write_json(&self.path, &file)
    }

    fn clear(&mut self) -> Result<(), RepositoryError> {
        remove(&self.path)
    }
}
