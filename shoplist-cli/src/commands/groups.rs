use anyhow::{Result, bail};
use clap::Subcommand;
use shared::models::{CreateGroupRequest, Group, GroupId, UpdateGroupRequest, UserId};

use crate::app::App;

#[derive(Subcommand, Debug)]
pub enum GroupsCommand {
    /// List your groups; the selected one is marked with `*`
    List,
    /// Show a group and its members
    Show { id: GroupId },
    /// Create a group
    Create {
        name: String,
        #[arg(long, short)]
        description: Option<String>,
    },
    /// Rename a group or change its description
    Update {
        id: GroupId,
        #[arg(long, short)]
        name: Option<String>,
        #[arg(long, short)]
        description: Option<String>,
    },
    /// Delete a group
    Delete { id: GroupId },
    /// Leave a group
    Leave { id: GroupId },
    /// Remove a member from a group you administer
    RemoveMember { id: GroupId, user_id: UserId },
    /// Invite a user to a group by username
    Invite { id: GroupId, username: String },
    /// Select the group later commands default to
    Use { id: GroupId },
}

pub async fn run(app: &App, command: GroupsCommand) -> Result<()> {
    let me = app.require_user().await?;
    let mut directory = app.groups();

    match command {
        GroupsCommand::List => {
            let current = app.current_group()?;
            let groups = directory.fetch_groups().await?;
            if groups.is_empty() {
                println!("You are not in any groups yet. Create one with `shoplist groups create <name>`.");
            }
            for group in groups {
                let marker = if Some(group.id) == current { "*" } else { " " };
                println!(
                    "{marker} {:>5}  {}  ({} members)",
                    group.id, group.name, group.members_count
                );
            }
        }
        GroupsCommand::Show { id } => {
            let group = app.api().get_group(id).await?;
            print_group(&group, me.id);
            println!("tab: {}", app.tabs().get_group_tab(&group.preference_key()));
        }
        GroupsCommand::Create { name, description } => {
            let mut request = CreateGroupRequest::new(name);
            request.description = description;
            let group = directory.create_group(&request).await?;
            println!("Created group {} (#{})", group.name, group.id);
        }
        GroupsCommand::Update {
            id,
            name,
            description,
        } => {
            let patch = UpdateGroupRequest { name, description };
            if patch.is_empty() {
                bail!("nothing to update; pass --name or --description");
            }
            let group = directory.update_group(id, &patch).await?;
            println!("Updated group {} (#{})", group.name, group.id);
        }
        GroupsCommand::Delete { id } => {
            directory.delete_group(id).await?;
            forget_selection(app, id)?;
            println!("Deleted group #{id}");
        }
        GroupsCommand::Leave { id } => {
            directory.leave_group(id).await?;
            forget_selection(app, id)?;
            println!("Left group #{id}");
        }
        GroupsCommand::RemoveMember { id, user_id } => {
            app.api().remove_member(id, user_id).await?;
            println!("Removed user #{user_id} from group #{id}");
        }
        GroupsCommand::Invite { id, username } => {
            app.api().send_invitation(id, &username).await?;
            println!("Invitation sent to {username}");
        }
        GroupsCommand::Use { id } => {
            let group = app.api().get_group(id).await?;
            app.remember_group(Some(group.id))?;
            directory.set_current_group(Some(group));
            if let Some(group) = directory.current_group() {
                let tab = app.tabs().get_group_tab(&group.preference_key());
                println!("Now using {} (#{}); last viewed: {tab}", group.name, group.id);
            }
        }
    }
    Ok(())
}

fn forget_selection(app: &App, id: GroupId) -> Result<()> {
    if app.current_group()? == Some(id) {
        app.remember_group(None)?;
    }
    Ok(())
}

fn print_group(group: &Group, viewer: UserId) {
    println!("{} (#{})", group.name, group.id);
    if let Some(description) = group.description.as_deref().filter(|text| !text.is_empty()) {
        println!("{description}");
    }
    if let Some(owner) = &group.owner {
        println!("owner: {}", owner.display_name());
    }
    if group.is_admin(viewer) {
        println!("you administer this group");
    }
    println!("members ({}):", group.members_count);
    for member in &group.members_detail {
        let role = if member.is_admin { " [admin]" } else { "" };
        println!(
            "  {:>5}  {}{role}",
            member.user.id,
            member.user.display_name()
        );
    }
}
