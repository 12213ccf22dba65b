//! GuildQuest CLI - Turn chores into quests
//!
//! Usage:
//!   guildquest                      - Start interactive mode
//!   guildquest login                - Sign in to the guild hall
//!   guildquest quest post <title>   - Post a quest
//!   guildquest quest done <n>       - Complete a quest
//!   guildquest pet feed             - Feed your companion
//!   guildquest shop buy <name>      - Buy a decoration
//!   guildquest config               - Show the effective configuration

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use guildquest_cli::commands::{
    self, ConfigCommand, LoginCommand, PetCommand, QuestCommand, ShopCommand,
};
use guildquest_cli::interactive::InteractiveCli;
use guildquest_cli::{render, App};
use guildquest_shared::GuildConfig;

#[derive(Parser)]
#[command(name = "guildquest")]
#[command(about = "GuildQuest - A gamified task tracker with a companion to raise")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file (defaults to ~/.guildquest/guildquest.yaml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Guild hall API base URL
    #[arg(long, global = true)]
    api: Option<String>,

    /// Directory for the local cache and session keys
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Play against the local guild hall, no network
    #[arg(long, global = true)]
    offline: bool,

    /// Keep everything in memory; nothing is written to disk
    #[arg(long, global = true)]
    ephemeral: bool,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in to the guild hall
    Login(LoginCommand),
    /// Create an account
    Register(LoginCommand),
    /// Sign out and forget the local cache
    Logout,
    /// Show who is signed in
    Whoami,
    /// Manage the quest board
    Quest(QuestCommand),
    /// Check on your companion
    Pet(PetCommand),
    /// The decoration shop
    Shop(ShopCommand),
    /// Pull changes from the guild hall
    Sync,
    /// Show the effective configuration
    Config(ConfigCommand),
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// File, then environment, then flags
fn resolve_config(cli: &Cli) -> anyhow::Result<GuildConfig> {
    let mut config = GuildConfig::load(cli.config.as_deref())?;
    if let Some(api) = &cli.api {
        config = config.with_api_base_url(api.as_str());
    }
    if let Some(dir) = &cli.data_dir {
        config = config.with_data_dir(dir.as_path());
    }
    if cli.offline {
        config = config.with_offline(true);
    }
    config.validate()?;
    Ok(config)
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = resolve_config(&cli)?;

    if let Some(Commands::Config(cmd)) = &cli.command {
        return cmd.run(&config);
    }

    let mut app = App::connect(config, cli.ephemeral)?;

    match cli.command {
        Some(Commands::Login(cmd)) => cmd.run(&mut app, false).await,
        Some(Commands::Register(cmd)) => cmd.run(&mut app, true).await,
        Some(Commands::Logout) => commands::auth::logout(&mut app).await,
        Some(Commands::Whoami) => commands::auth::whoami(&mut app).await,
        Some(Commands::Quest(cmd)) => cmd.run(&mut app).await,
        Some(Commands::Pet(cmd)) => cmd.run(&mut app).await,
        Some(Commands::Shop(cmd)) => cmd.run(&mut app).await,
        Some(Commands::Sync) => commands::quest::sync(&mut app).await,
        Some(Commands::Config(_)) => Ok(()),
        None => {
            // No subcommand - start interactive mode
            let mut interactive = InteractiveCli::new(app);
            interactive.run().await
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            render::fatal(&err);
            ExitCode::FAILURE
        }
    }
}
