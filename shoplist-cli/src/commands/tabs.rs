use anyhow::Result;
use clap::Subcommand;
use client::GroupTab;

use crate::app::App;

#[derive(Subcommand, Debug)]
pub enum TabCommand {
    /// Print the tab a group was last viewed on
    Get { group: String },
    /// Remember the tab for a group
    Set { group: String, tab: GroupTab },
}

/// Tab preferences live in local storage only; no login is needed.
pub fn run(app: &App, command: TabCommand) -> Result<()> {
    let mut tabs = app.tabs();
    match command {
        TabCommand::Get { group } => println!("{}", tabs.get_group_tab(&group)),
        TabCommand::Set { group, tab } => {
            tabs.set_group_tab(&group, tab)?;
            println!("{tab}");
        }
    }
    Ok(())
}
