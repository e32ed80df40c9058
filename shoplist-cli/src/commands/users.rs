use anyhow::Result;
use clap::Subcommand;

use crate::app::App;

#[derive(Subcommand, Debug)]
pub enum UsersCommand {
    /// Find users by username or email
    Search { query: String },
}

pub async fn run(app: &App, command: UsersCommand) -> Result<()> {
    app.require_user().await?;

    match command {
        UsersCommand::Search { query } => {
            let users = app.api().search_users(&query).await?;
            if users.is_empty() {
                println!("No users match `{query}`.");
            }
            for user in users {
                println!("{:>5}  {}  <{}>", user.id, user.username, user.email);
            }
        }
    }
    Ok(())
}
