use anyhow::Result;
use clap::Subcommand;

use crate::app::App;

#[derive(Subcommand, Debug)]
pub enum InvitationsCommand {
    /// List invitations addressed to you
    List {
        /// Include invitations that were already answered
        #[arg(long, short)]
        all: bool,
    },
    /// Accept an invitation and join its group
    Accept { id: i64 },
    /// Decline an invitation
    Decline { id: i64 },
}

pub async fn run(app: &App, command: InvitationsCommand) -> Result<()> {
    app.require_user().await?;

    match command {
        InvitationsCommand::List { all } => {
            let invitations = app.api().list_invitations().await?;
            let shown: Vec<_> = invitations
                .iter()
                .filter(|invitation| all || invitation.is_pending())
                .collect();
            if shown.is_empty() {
                println!("No pending invitations.");
            }
            for invitation in shown {
                println!(
                    "{:>5}  {} (#{})  from {}  [{}]",
                    invitation.id,
                    invitation.group_name,
                    invitation.group,
                    invitation.inviter.display_name(),
                    invitation.status
                );
            }
        }
        InvitationsCommand::Accept { id } => {
            app.api().accept_invitation(id).await?;
            println!("Accepted invitation #{id}");
        }
        InvitationsCommand::Decline { id } => {
            app.api().decline_invitation(id).await?;
            println!("Declined invitation #{id}");
        }
    }
    Ok(())
}
