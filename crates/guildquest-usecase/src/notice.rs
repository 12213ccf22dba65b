//! Notices - What the guildmaster tells the adventurer
//!
//! Every action ends in a short, transient message. Successes come from
//! [`GuildEvent::message`]; failures are phrased here so the UI layer
//! never has to inspect error variants.

use guildquest_domain::{DomainError, GuildEvent};

use crate::error::SessionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Success,
    Info,
    Warning,
    Error,
}

/// A transient notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub tone: Tone,
    pub text: String,
}

impl Notice {
    pub fn new(tone: Tone, text: impl Into<String>) -> Self {
        Self {
            tone,
            text: text.into(),
        }
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self::new(Tone::Success, text)
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self::new(Tone::Info, text)
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self::new(Tone::Warning, text)
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::new(Tone::Error, text)
    }

    /// Notice for a domain event, if the guildmaster comments on it
    pub fn from_event(event: &GuildEvent) -> Option<Self> {
        event.message().map(Notice::success)
    }
}

impl From<&SessionError> for Notice {
    fn from(err: &SessionError) -> Self {
        match err {
            SessionError::Domain(DomainError::InsufficientFunds { needed, available }) => {
                Notice::warning(format!(
                    "Not enough gold, adventurer! ({} needed, {} in your purse)",
                    needed, available
                ))
            }
            SessionError::Domain(DomainError::AlreadyOwned { .. }) => {
                Notice::warning("You already own this decoration!")
            }
            SessionError::Domain(DomainError::Validation { reason, .. }) => {
                Notice::warning(capitalize(reason))
            }
            SessionError::NotSignedIn => Notice::info("Sign in to enter the Guild Hall."),
            SessionError::Unauthorized => {
                Notice::error("Your session has expired. Sign in again, adventurer.")
            }
            SessionError::Transport(_) => Notice::error("Failed to connect to the Guild Hall!"),
            SessionError::Rejected(message) => Notice::error(capitalize(message)),
            SessionError::Storage(err) => Notice::error(format!("The local ledger is unreadable: {}", err)),
        }
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
