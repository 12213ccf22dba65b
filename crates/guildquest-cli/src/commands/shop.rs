//! guildquest shop

use clap::{Args, Subcommand};

use guildquest_domain::Decoration;
use guildquest_usecase::SessionError;

use super::signed_in;
use crate::app::App;
use crate::render;

#[derive(Debug, Args)]
pub struct ShopCommand {
    #[command(subcommand)]
    pub command: Option<ShopSubcommand>,
}

#[derive(Debug, Subcommand)]
pub enum ShopSubcommand {
    /// Browse the decoration catalog
    List,
    /// Buy a decoration for the pet chamber
    Buy {
        /// Decoration name (torch, banner, shield, chest, bookshelf, armor)
        name: String,
    },
}

impl ShopCommand {
    pub async fn run(&self, app: &mut App) -> anyhow::Result<()> {
        signed_in(app).await?;

        if let Some(ShopSubcommand::Buy { name }) = &self.command {
            let decoration = name.parse::<Decoration>().map_err(SessionError::from)?;
            let notice =
                render::working("Haggling...", app.session.buy_decoration(decoration)).await?;
            render::notice(&notice);
        }

        render::shop(&app.session.snapshot().await);
        Ok(())
    }
}
