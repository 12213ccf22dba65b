//! guildquest pet

use clap::{Args, Subcommand};

use super::signed_in;
use crate::app::App;
use crate::render;

#[derive(Debug, Args)]
pub struct PetCommand {
    #[command(subcommand)]
    pub command: Option<PetSubcommand>,
}

#[derive(Debug, Subcommand)]
pub enum PetSubcommand {
    /// Show your companion
    Show,
    /// Feed your companion (20 gold)
    Feed,
    /// Play with your companion
    Play,
}

impl PetCommand {
    pub async fn run(&self, app: &mut App) -> anyhow::Result<()> {
        signed_in(app).await?;

        let notice = match self.command.as_ref().unwrap_or(&PetSubcommand::Show) {
            PetSubcommand::Show => None,
            PetSubcommand::Feed => {
                Some(render::working("Fetching a meal...", app.session.feed()).await?)
            }
            PetSubcommand::Play => {
                Some(render::working("Playing...", app.session.play()).await?)
            }
        };
        if let Some(notice) = notice {
            render::notice(&notice);
        }

        render::companion(&app.session.snapshot().await.companion);
        Ok(())
    }
}
