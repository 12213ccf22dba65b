//! CLI Commands
//!
//! One-shot commands. Each resumes the stored session first, performs a
//! single action and prints what the guildmaster had to say.

pub mod auth;
pub mod companion;
pub mod config;
pub mod quest;
pub mod shop;

pub use auth::LoginCommand;
pub use companion::PetCommand;
pub use config::ConfigCommand;
pub use quest::QuestCommand;
pub use shop::ShopCommand;

use guildquest_domain::{QuestBoard, QuestId};
use guildquest_usecase::Tone;

use crate::app::App;
use crate::render;

/// Resume the stored session, failing with `NotSignedIn` if there is none
pub(crate) async fn signed_in(app: &mut App) -> anyhow::Result<()> {
    let greeting = render::working("Entering the Guild Hall...", app.resume()).await?;
    if let Some(greeting) = greeting.filter(|n| n.tone == Tone::Warning) {
        render::notice(&greeting);
    }
    Ok(())
}

/// Find a quest by its 1-based position on the board, its id, or a
/// unique id prefix
pub fn resolve_quest(board: &QuestBoard, reference: &str) -> Option<QuestId> {
    let reference = reference.trim();
    if reference.is_empty() {
        return None;
    }

    if let Ok(index) = reference.parse::<usize>() {
        if let Some(quest) = index.checked_sub(1).and_then(|i| board.quests().get(i)) {
            return Some(quest.id().clone());
        }
    }

    let id = QuestId::new(reference);
    if board.get(&id).is_some() {
        return Some(id);
    }

    let mut matches = board
        .quests()
        .iter()
        .filter(|q| q.id().as_str().starts_with(reference));
    match (matches.next(), matches.next()) {
        (Some(quest), None) => Some(quest.id().clone()),
        _ => None,
    }
}
