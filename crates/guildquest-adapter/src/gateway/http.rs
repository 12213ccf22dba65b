//! HTTP client for the guild hall REST API

use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use guildquest_domain::{Companion, Credentials, Decoration, Quest, QuestDraft, QuestId, Timestamp, User};
use guildquest_usecase::{GuildRemote, RemoteError, SyncBundle};

use super::dto::{
    self, AuthResponse, BulkTaskRequest, BuyDecorationRequest, CreateTaskRequest, DecorationDto,
    ErrorBody, LoginRequest, PetDto, SyncRequest, SyncResponse, TaskDto, UserDto,
};

/// Guild hall client
///
/// # Example
///
/// ```rust,no_run
/// use std::time::Duration;
/// use guildquest_adapter::gateway::http::HttpGuildClient;
/// use guildquest_usecase::GuildRemote;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = HttpGuildClient::new("http://localhost:8080/api/v1", Duration::from_secs(10))?;
/// let credentials = client.login("aria@guild.example", "hunter22").await?;
/// client.authorize(Some(credentials.access_token));
/// let quests = client.list_quests().await?;
/// # Ok(())
/// # }
/// ```
pub struct HttpGuildClient {
    base_url: String,
    client: Client,
    token: RwLock<Option<String>>,
}

impl HttpGuildClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, RemoteError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RemoteError::Transport(e.to_string()))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
            token: RwLock::new(None),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.client.request(method, format!("{}{}", self.base_url, path));
        match self.token.read().ok().and_then(|t| t.clone()) {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, RemoteError> {
        let response = builder.send().await.map_err(transport)?;
        handle_response(response).await
    }

    async fn fetch<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, RemoteError> {
        let response = self.send(builder).await?;
        response
            .json()
            .await
            .map_err(|e| RemoteError::Decode(e.to_string()))
    }
}

#[async_trait]
impl GuildRemote for HttpGuildClient {
    fn authorize(&self, access_token: Option<String>) {
        if let Ok(mut token) = self.token.write() {
            *token = access_token;
        }
    }

    // ==================== Auth ====================

    async fn login(&self, email: &str, password: &str) -> Result<Credentials, RemoteError> {
        let request = self
            .request(Method::POST, "/auth/login")
            .json(&LoginRequest { email, password });
        let auth: AuthResponse = self.fetch(request).await?;
        Ok(auth.into())
    }

    async fn register(&self, email: &str, password: &str) -> Result<Credentials, RemoteError> {
        let request = self
            .request(Method::POST, "/auth/register")
            .json(&LoginRequest { email, password });
        let auth: AuthResponse = self.fetch(request).await?;
        Ok(auth.into())
    }

    async fn me(&self) -> Result<User, RemoteError> {
        let user: UserDto = self.fetch(self.request(Method::GET, "/me")).await?;
        Ok(user.into())
    }

    // ==================== Tasks ====================

    async fn list_quests(&self) -> Result<Vec<Quest>, RemoteError> {
        let tasks: Option<Vec<TaskDto>> = self.fetch(self.request(Method::GET, "/tasks")).await?;
        Ok(tasks.unwrap_or_default().into_iter().map(Quest::from).collect())
    }

    async fn create_quest(&self, draft: &QuestDraft) -> Result<Quest, RemoteError> {
        let request = self
            .request(Method::POST, "/tasks")
            .json(&CreateTaskRequest::from(draft));
        let task: TaskDto = self.fetch(request).await?;
        Ok(task.into())
    }

    async fn create_quests(&self, drafts: &[QuestDraft]) -> Result<Vec<Quest>, RemoteError> {
        let body = BulkTaskRequest {
            tasks: drafts.iter().map(CreateTaskRequest::from).collect(),
        };
        let request = self.request(Method::POST, "/tasks/bulk").json(&body);
        let tasks: Option<Vec<TaskDto>> = self.fetch(request).await?;
        Ok(tasks.unwrap_or_default().into_iter().map(Quest::from).collect())
    }

    async fn complete_quest(&self, id: &QuestId) -> Result<Quest, RemoteError> {
        let path = format!("/tasks/{}/complete", id);
        let task: TaskDto = self.fetch(self.request(Method::POST, &path)).await?;
        Ok(task.into())
    }

    async fn delete_quest(&self, id: &QuestId) -> Result<(), RemoteError> {
        let path = format!("/tasks/{}", id);
        self.send(self.request(Method::DELETE, &path)).await?;
        Ok(())
    }

    // ==================== Pet ====================

    async fn companion(&self) -> Result<Companion, RemoteError> {
        let pet: PetDto = self.fetch(self.request(Method::GET, "/pet")).await?;
        Ok(pet.into())
    }

    async fn feed(&self) -> Result<Companion, RemoteError> {
        let pet: PetDto = self.fetch(self.request(Method::POST, "/pet/feed")).await?;
        Ok(pet.into())
    }

    async fn play(&self) -> Result<Companion, RemoteError> {
        let pet: PetDto = self.fetch(self.request(Method::POST, "/pet/play")).await?;
        Ok(pet.into())
    }

    // ==================== Decorations ====================

    async fn decorations(&self) -> Result<Vec<Decoration>, RemoteError> {
        let records: Option<Vec<DecorationDto>> =
            self.fetch(self.request(Method::GET, "/decorations")).await?;
        Ok(dto::decorations(records.unwrap_or_default()))
    }

    async fn buy_decoration(&self, decoration: Decoration) -> Result<(), RemoteError> {
        let request = self
            .request(Method::POST, "/decorations/buy")
            .json(&BuyDecorationRequest {
                decoration: decoration.as_str(),
            });
        self.send(request).await?;
        Ok(())
    }

    // ==================== Sync ====================

    async fn sync(&self, since: Option<Timestamp>) -> Result<SyncBundle, RemoteError> {
        let request = self
            .request(Method::POST, "/sync")
            .json(&SyncRequest::since(since));
        let response: SyncResponse = self.fetch(request).await?;
        Ok(response.into())
    }
}

fn transport(err: reqwest::Error) -> RemoteError {
    if err.is_timeout() {
        RemoteError::Timeout
    } else {
        RemoteError::Transport(err.to_string())
    }
}

/// Turn a non-success status into a [`RemoteError`]
///
/// The hall reports rule violations as `{error, code}` with a 400, so the
/// message text decides between the economy errors.
async fn handle_response(response: Response) -> Result<Response, RemoteError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = match serde_json::from_str::<ErrorBody>(&body) {
        Ok(err) => {
            debug!(status = status.as_u16(), code = %err.code, "guild hall error");
            err.error
        }
        Err(_) => body,
    };

    Err(classify(status, message))
}

fn classify(status: StatusCode, message: String) -> RemoteError {
    if status == StatusCode::UNAUTHORIZED {
        return RemoteError::Unauthorized;
    }

    let lowered = message.to_ascii_lowercase();
    if lowered.contains("insufficient gold") {
        RemoteError::InsufficientGold
    } else if lowered.contains("already owned") {
        RemoteError::AlreadyOwned
    } else if lowered.contains("already completed") {
        RemoteError::AlreadyCompleted
    } else if status == StatusCode::NOT_FOUND || lowered.contains("not found") {
        RemoteError::NotFound
    } else {
        RemoteError::Server {
            status: status.as_u16(),
            message,
        }
    }
}
