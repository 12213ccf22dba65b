//! guildquest login / register / logout / whoami

use clap::Args;
use dialoguer::{Input, Password};

use crate::app::App;
use crate::render;

#[derive(Debug, Clone, Default, Args)]
pub struct LoginCommand {
    /// Account email (prompted when omitted)
    #[arg(short, long)]
    pub email: Option<String>,

    /// Account password (prompted when omitted)
    #[arg(short, long)]
    pub password: Option<String>,
}

impl LoginCommand {
    /// Fill in whatever was not given on the command line
    ///
    /// Blocks on the terminal; call from a blocking context.
    pub fn ask(self, confirm: bool) -> anyhow::Result<(String, String)> {
        let email = match self.email {
            Some(email) => email,
            None => Input::<String>::new().with_prompt("Email").interact_text()?,
        };
        let password = match self.password {
            Some(password) => password,
            None => {
                let prompt = Password::new().with_prompt("Password");
                if confirm {
                    prompt
                        .with_confirmation("Confirm password", "Passwords do not match")
                        .interact()?
                } else {
                    prompt.interact()?
                }
            }
        };
        Ok((email, password))
    }

    pub async fn run(&self, app: &mut App, register: bool) -> anyhow::Result<()> {
        let args = self.clone();
        let (email, password) = tokio::task::spawn_blocking(move || args.ask(register)).await??;

        let greeting = if register {
            render::working("Joining the guild...", app.session.register(&email, &password)).await?
        } else {
            render::working("Entering the Guild Hall...", app.session.login(&email, &password))
                .await?
        };
        render::notice(&greeting);
        Ok(())
    }
}

pub async fn logout(app: &mut App) -> anyhow::Result<()> {
    let farewell = app.session.logout().await?;
    render::notice(&farewell);
    Ok(())
}

pub async fn whoami(app: &mut App) -> anyhow::Result<()> {
    super::signed_in(app).await?;
    let state = app.session.snapshot().await;
    render::status(app.session.user(), &state);
    Ok(())
}
