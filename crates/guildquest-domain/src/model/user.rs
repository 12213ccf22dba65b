//! User - The signed-in adventurer and the keys of their session

/// A registered adventurer as the guild hall reports them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub email: String,
    pub gold: u64,
}

impl User {
    pub fn new(id: impl Into<String>, email: impl Into<String>, gold: u64) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            gold,
        }
    }

    /// Name used in greetings: the part of the email before `@`
    pub fn display_name(&self) -> &str {
        self.email.split('@').next().unwrap_or(&self.email)
    }
}

/// Tokens issued at sign-in, kept for session continuity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub access_token: String,
    pub refresh_token: String,
    pub user: User,
}
