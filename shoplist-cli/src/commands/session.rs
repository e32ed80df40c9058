use std::io::{self, Write};

use anyhow::{Context, Result, bail};
use clap::Subcommand;
use rpassword::prompt_password;
use shared::models::{RegisterData, User};

use crate::app::App;

#[derive(Subcommand, Debug)]
pub enum SessionCommand {
    /// Log in and store the session tokens
    Login {
        /// Username; prompted for when omitted
        #[arg(long, short)]
        username: Option<String>,
    },
    /// Create an account and log in with it
    Register {
        #[arg(long, short)]
        username: Option<String>,
        #[arg(long, short)]
        email: Option<String>,
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
    },
    /// Forget the stored session
    Logout,
    /// Show the logged-in account
    Me,
}

pub async fn run(app: &App, command: SessionCommand) -> Result<()> {
    match command {
        SessionCommand::Login { username } => {
            let mut session = app.session().await;
            let username = username.map_or_else(|| prompt("Username: "), Ok)?;
            let password = prompt_password("Password: ")?;
            if password.trim().is_empty() {
                bail!("password must not be empty");
            }
            let user = session
                .login(&username, &password)
                .await
                .context("login failed")?;
            println!("Logged in as {}", user.display_name());
        }
        SessionCommand::Register {
            username,
            email,
            first_name,
            last_name,
        } => {
            let mut session = app.session().await;
            let data = RegisterData {
                username: username.map_or_else(|| prompt("Username: "), Ok)?,
                email: email.map_or_else(|| prompt("Email: "), Ok)?,
                password: prompt_password("Password: ")?,
                password2: prompt_password("Repeat password: ")?,
                first_name,
                last_name,
            };
            let user = session
                .register(&data)
                .await
                .context("registration failed")?;
            println!("Welcome, {}! You are now logged in.", user.display_name());
        }
        SessionCommand::Logout => {
            let mut session = app.session().await;
            session.logout();
            println!("Logged out.");
        }
        SessionCommand::Me => {
            let user = app.require_user().await?;
            print_user(&user);
            println!("api: {}", app.config().api_base_url);
        }
    }
    Ok(())
}

fn print_user(user: &User) {
    println!("Logged in as {} (#{})", user.username, user.id);
    println!("name: {}", user.display_name());
    println!("email: {}", user.email);
    if let Some(bio) = user.bio.as_deref().filter(|bio| !bio.is_empty()) {
        println!("bio: {bio}");
    }
    if let Some(joined) = user.created_at {
        println!("member since: {}", joined.short());
    }
}

fn prompt(message: &str) -> Result<String> {
    print!("{message}");
    io::stdout().flush().ok();
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let trimmed = input.trim().to_string();
    if trimmed.is_empty() {
        bail!("input must not be empty");
    }
    Ok(trimmed)
}
