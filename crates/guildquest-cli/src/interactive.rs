//! Interactive REPL mode
//!
//! Keeps one session open for as long as the adventurer plays, so the
//! companion's decay timer keeps ticking between commands.

use std::io::{self, BufRead, Write};

use console::style;

use guildquest_domain::{Decoration, QuestDraft};
use guildquest_usecase::{Notice, SessionError};

use crate::app::App;
use crate::commands::{quest::unknown, resolve_quest, LoginCommand};
use crate::render;

/// Interactive CLI over a live session
pub struct InteractiveCli {
    app: App,
}

impl InteractiveCli {
    pub fn new(app: App) -> Self {
        Self { app }
    }

    /// Run the interactive REPL
    pub async fn run(&mut self) -> anyhow::Result<()> {
        println!("{}", style("GuildQuest Interactive Mode").bold());
        println!("Type /help for commands, /quit to exit");
        println!();

        match self.app.resume().await {
            Ok(Some(greeting)) => render::notice(&greeting),
            Ok(None) => {}
            Err(SessionError::NotSignedIn) => {
                render::notice(&Notice::info("Type /login or /register to enter the Guild Hall."))
            }
            Err(err) => render::notice(&Notice::from(&err)),
        }

        loop {
            let prompt = self.prompt().await;
            let Some(input) = read_line(prompt).await? else {
                break;
            };
            let input = input.trim();

            if input.is_empty() {
                continue;
            }

            if input.starts_with('/') {
                match self.handle_command(input).await {
                    Ok(should_exit) if should_exit => break,
                    Ok(_) => continue,
                    Err(e) => {
                        render::fatal(&e);
                        continue;
                    }
                }
            }

            println!("Commands start with '/'. Type /help for the list.");
        }

        Ok(())
    }

    async fn prompt(&self) -> String {
        if !self.app.session.is_signed_in() {
            return "[guest] > ".to_string();
        }
        let state = self.app.session.snapshot().await;
        format!(
            "[{} | Lv {}] > ",
            render::purse(state.gold()),
            state.companion.level()
        )
    }

    fn require_session(&self) -> Result<(), SessionError> {
        if self.app.session.is_signed_in() {
            Ok(())
        } else {
            Err(SessionError::NotSignedIn)
        }
    }

    async fn handle_command(&mut self, input: &str) -> anyhow::Result<bool> {
        let (cmd, rest) = match input.split_once(char::is_whitespace) {
            Some((cmd, rest)) => (cmd, rest.trim()),
            None => (input, ""),
        };

        match cmd {
            "/quit" | "/exit" | "/q" => {
                println!("Goodbye!");
                return Ok(true);
            }
            "/help" | "/h" => print_help(),
            "/login" | "/register" => {
                let register = cmd == "/register";
                let args = LoginCommand {
                    email: (!rest.is_empty()).then(|| rest.to_string()),
                    password: None,
                };
                let (email, password) =
                    tokio::task::spawn_blocking(move || args.ask(register)).await??;
                let session = &mut self.app.session;
                let greeting = if register {
                    render::working("Joining the guild...", session.register(&email, &password))
                        .await?
                } else {
                    render::working("Entering the Guild Hall...", session.login(&email, &password))
                        .await?
                };
                render::notice(&greeting);
            }
            "/logout" => {
                let farewell = self.app.session.logout().await?;
                render::notice(&farewell);
            }
            "/status" => {
                let state = self.app.session.snapshot().await;
                render::status(self.app.session.user(), &state);
                if self.app.config().offline {
                    println!("  Guild hall:  {}", style("local (offline)").dim());
                } else {
                    println!("  Guild hall:  {}", self.app.config().api_base_url);
                }
            }
            "/quests" => {
                self.require_session()?;
                render::board(&self.app.session.snapshot().await.board);
            }
            "/post" => {
                self.require_session()?;
                let Some((title, reward, description)) = parse_post_args(rest) else {
                    println!("Usage: /post <title> [| reward] [| description]");
                    return Ok(false);
                };
                let draft = QuestDraft::with_reward_input(title, description, reward)
                    .map_err(SessionError::from)?;
                let (_, notice) = self.app.session.post_quest(draft).await?;
                render::notice(&notice);
            }
            "/bulk" => {
                self.require_session()?;
                let text = if rest.is_empty() {
                    println!("Paste your list, one quest per line. Finish with an empty line.");
                    read_block().await?
                } else {
                    rest.replace(';', "\n")
                };
                let (_, notice) =
                    render::working("Posting quests...", self.app.session.post_bulk(&text)).await?;
                render::notice(&notice);
            }
            "/done" | "/drop" => {
                self.require_session()?;
                let board = self.app.session.snapshot().await.board;
                let Some(id) = resolve_quest(&board, rest) else {
                    render::notice(&unknown(rest));
                    return Ok(false);
                };
                let notice = if cmd == "/done" {
                    self.app
                        .session
                        .complete_quest(&id)
                        .await?
                        .or_else(|| Some(Notice::info("That quest is already done.")))
                } else {
                    self.app.session.delete_quest(&id).await?
                };
                if let Some(notice) = notice {
                    render::notice(&notice);
                }
            }
            "/pet" => {
                self.require_session()?;
                render::companion(&self.app.session.snapshot().await.companion);
            }
            "/feed" => {
                self.require_session()?;
                let notice = self.app.session.feed().await?;
                render::notice(&notice);
            }
            "/play" => {
                self.require_session()?;
                let notice = self.app.session.play().await?;
                render::notice(&notice);
            }
            "/shop" => {
                self.require_session()?;
                render::shop(&self.app.session.snapshot().await);
            }
            "/buy" => {
                self.require_session()?;
                let decoration = rest.parse::<Decoration>().map_err(SessionError::from)?;
                let notice = self.app.session.buy_decoration(decoration).await?;
                render::notice(&notice);
            }
            "/sync" => {
                self.require_session()?;
                let notice = render::working(
                    "Consulting the guild ledger...",
                    self.app.session.sync(),
                )
                .await?;
                render::notice(&notice);
            }
            _ => {
                println!("Unknown command: {}", cmd);
            }
        }

        Ok(false)
    }
}

fn print_help() {
    println!("Commands:");
    println!("  /login [email]     - Sign in to the guild hall");
    println!("  /register [email]  - Create an account");
    println!("  /logout            - Sign out and forget the local cache");
    println!("  /status            - Show who is playing and where");
    println!("  /quests            - Show the quest board");
    println!("  /post <title> | <reward> | <description>");
    println!("                     - Post a quest (reward defaults to 10)");
    println!("  /bulk [a; b; c]    - Post several quests at once");
    println!("  /done <n|id>       - Complete a quest");
    println!("  /drop <n|id>       - Remove a quest");
    println!("  /pet               - Check on your companion");
    println!("  /feed              - Feed your companion (20 gold)");
    println!("  /play              - Play with your companion");
    println!("  /shop              - Browse decorations");
    println!("  /buy <name>        - Buy a decoration (50 gold)");
    println!("  /sync              - Pull changes from the guild hall");
    println!("  /quit              - Exit");
}

/// Split `title | reward | description`; only the title is required
fn parse_post_args(rest: &str) -> Option<(&str, &str, &str)> {
    let mut parts = rest.splitn(3, '|').map(str::trim);
    let title = parts.next().filter(|t| !t.is_empty())?;
    let reward = parts.next().unwrap_or("");
    let description = parts.next().unwrap_or("");
    Some((title, reward, description))
}

/// Read one line off the terminal; `None` at end of input
async fn read_line(prompt: String) -> anyhow::Result<Option<String>> {
    let line = tokio::task::spawn_blocking(move || -> io::Result<Option<String>> {
        print!("{}", prompt);
        io::stdout().flush()?;

        let mut input = String::new();
        match io::stdin().read_line(&mut input)? {
            0 => Ok(None),
            _ => Ok(Some(input)),
        }
    })
    .await??;
    Ok(line)
}

/// Read lines until an empty one or end of input
async fn read_block() -> anyhow::Result<String> {
    let text = tokio::task::spawn_blocking(|| -> io::Result<String> {
        let mut text = String::new();
        for line in io::stdin().lock().lines() {
            let line = line?;
            if line.trim().is_empty() {
                break;
            }
            text.push_str(&line);
            text.push('\n');
        }
        Ok(text)
    })
    .await??;
    Ok(text)
}
