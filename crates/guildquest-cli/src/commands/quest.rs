//! guildquest quest

use std::io::Read;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Subcommand};

use guildquest_domain::QuestDraft;
use guildquest_usecase::{Notice, SessionError};

use super::{resolve_quest, signed_in};
use crate::app::App;
use crate::render;

#[derive(Debug, Args)]
pub struct QuestCommand {
    #[command(subcommand)]
    pub command: Option<QuestSubcommand>,
}

#[derive(Debug, Subcommand)]
pub enum QuestSubcommand {
    /// Show the quest board
    List,
    /// Post a new quest
    Post {
        /// Quest title
        title: String,
        /// Longer description
        #[arg(short, long, default_value = "")]
        description: String,
        /// Gold paid on completion (anything but a whole number pays 10)
        #[arg(short, long, default_value = "10")]
        reward: String,
    },
    /// Post one quest per line of a list
    Bulk {
        /// File holding the list; `-` or nothing reads stdin
        file: Option<PathBuf>,
    },
    /// Complete a quest and collect its reward
    Done {
        /// Board position or quest id
        quest: String,
    },
    /// Remove a quest from the board
    Drop {
        /// Board position or quest id
        quest: String,
    },
}

impl QuestCommand {
    pub async fn run(&self, app: &mut App) -> anyhow::Result<()> {
        signed_in(app).await?;

        match self.command.as_ref().unwrap_or(&QuestSubcommand::List) {
            QuestSubcommand::List => {}
            QuestSubcommand::Post {
                title,
                description,
                reward,
            } => {
                let draft =
                    QuestDraft::with_reward_input(title.as_str(), description.as_str(), reward)
                        .map_err(SessionError::from)?;
                let (_, notice) =
                    render::working("Posting quest...", app.session.post_quest(draft)).await?;
                render::notice(&notice);
            }
            QuestSubcommand::Bulk { file } => {
                let text = read_list(file.as_ref())?;
                let (_, notice) =
                    render::working("Posting quests...", app.session.post_bulk(&text)).await?;
                render::notice(&notice);
            }
            QuestSubcommand::Done { quest } => {
                let board = app.session.snapshot().await.board;
                match resolve_quest(&board, quest) {
                    Some(id) => {
                        let notice = render::working(
                            "Turning in quest...",
                            app.session.complete_quest(&id),
                        )
                        .await?;
                        render::notice(
                            &notice.unwrap_or_else(|| Notice::info("That quest is already done.")),
                        );
                    }
                    None => render::notice(&unknown(quest)),
                }
            }
            QuestSubcommand::Drop { quest } => {
                let board = app.session.snapshot().await.board;
                match resolve_quest(&board, quest) {
                    Some(id) => {
                        if let Some(notice) =
                            render::working("Removing quest...", app.session.delete_quest(&id))
                                .await?
                        {
                            render::notice(&notice);
                        }
                    }
                    None => render::notice(&unknown(quest)),
                }
            }
        }

        render::board(&app.session.snapshot().await.board);
        Ok(())
    }
}

/// guildquest sync: pull what changed on the guild hall since last time
pub async fn sync(app: &mut App) -> anyhow::Result<()> {
    signed_in(app).await?;
    let notice = render::working("Consulting the guild ledger...", app.session.sync()).await?;
    render::notice(&notice);
    render::board(&app.session.snapshot().await.board);
    Ok(())
}

pub(crate) fn unknown(reference: &str) -> Notice {
    Notice::warning(format!("No quest on the board matches '{}'.", reference.trim()))
}

fn read_list(file: Option<&PathBuf>) -> anyhow::Result<String> {
    match file {
        Some(path) if path.as_os_str() != "-" => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        _ => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read quest list from stdin")?;
            Ok(text)
        }
    }
}
