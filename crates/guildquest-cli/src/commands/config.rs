//! guildquest config

use clap::Args;

use guildquest_shared::GuildConfig;

#[derive(Debug, Args)]
pub struct ConfigCommand {
    /// Print the default configuration instead of the effective one
    #[arg(long)]
    pub defaults: bool,
}

impl ConfigCommand {
    pub fn run(&self, config: &GuildConfig) -> anyhow::Result<()> {
        let shown = if self.defaults {
            GuildConfig::default()
        } else {
            config.clone()
        };
        print!("{}", shown.to_yaml()?);
        Ok(())
    }
}
