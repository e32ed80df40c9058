use anyhow::{Result, bail};
use clap::Subcommand;
use shared::models::{
    CreateShoppingItemRequest, GroupId, ShoppingItem, ShoppingItemId, ShoppingListId,
    UpdateShoppingItemRequest, UpdateShoppingListRequest,
};

use super::pin_marker;
use crate::app::App;

#[derive(Subcommand, Debug)]
pub enum ListsCommand {
    /// List a group's shopping lists
    List {
        /// Group to list; defaults to the selected group
        #[arg(long, short)]
        group: Option<GroupId>,
    },
    /// Create a shopping list
    Create {
        name: String,
        #[arg(long, short)]
        group: Option<GroupId>,
    },
    /// Rename a shopping list
    Rename { id: ShoppingListId, name: String },
    /// Delete a shopping list and its items
    Delete { id: ShoppingListId },
    /// Pin or unpin a shopping list
    Pin { id: ShoppingListId },
}

#[derive(Subcommand, Debug)]
pub enum ItemsCommand {
    /// Show the items of a shopping list
    List { list: ShoppingListId },
    /// Add an item to a shopping list
    Add {
        list: ShoppingListId,
        name: String,
        #[arg(long, short)]
        quantity: Option<f64>,
        #[arg(long, short)]
        unit: Option<String>,
    },
    /// Change an item's name or amount
    Update {
        id: ShoppingItemId,
        #[arg(long, short)]
        name: Option<String>,
        #[arg(long, short)]
        quantity: Option<f64>,
        #[arg(long, short)]
        unit: Option<String>,
    },
    /// Check or uncheck an item
    Check { id: ShoppingItemId },
    /// Pin or unpin an item
    Pin { id: ShoppingItemId },
    /// Remove an item
    Delete { id: ShoppingItemId },
    /// Store a new item order, first id on top
    Reorder {
        #[arg(required = true, num_args = 1..)]
        ids: Vec<ShoppingItemId>,
    },
}

pub async fn run_lists(app: &App, command: ListsCommand) -> Result<()> {
    app.require_user().await?;
    let api = app.api();

    match command {
        ListsCommand::List { group } => {
            let group = app.group_or_current(group)?;
            let lists = api.list_shopping_lists(group).await?;
            if lists.is_empty() {
                println!("No shopping lists in group #{group}.");
            }
            for list in lists {
                println!(
                    "{} {:>5}  {}  {}",
                    pin_marker(list.is_pinned),
                    list.id,
                    list.name,
                    list.progress()
                );
            }
        }
        ListsCommand::Create { name, group } => {
            let group = app.group_or_current(group)?;
            let list = api.create_shopping_list(group, &name).await?;
            println!("Created list {} (#{})", list.name, list.id);
        }
        ListsCommand::Rename { id, name } => {
            let patch = UpdateShoppingListRequest {
                name: Some(name),
                is_pinned: None,
            };
            let list = api.update_shopping_list(id, &patch).await?;
            println!("Renamed list #{} to {}", list.id, list.name);
        }
        ListsCommand::Delete { id } => {
            api.delete_shopping_list(id).await?;
            println!("Deleted list #{id}");
        }
        ListsCommand::Pin { id } => {
            let list = api.toggle_list_pin(id).await?;
            let state = if list.is_pinned { "Pinned" } else { "Unpinned" };
            println!("{state} list {}", list.name);
        }
    }
    Ok(())
}

pub async fn run_items(app: &App, command: ItemsCommand) -> Result<()> {
    app.require_user().await?;
    let api = app.api();

    match command {
        ItemsCommand::List { list } => {
            let items = api.list_items(list).await?;
            if items.is_empty() {
                println!("The list is empty.");
            }
            for item in &items {
                print_item(item);
            }
        }
        ItemsCommand::Add {
            list,
            name,
            quantity,
            unit,
        } => {
            let request = CreateShoppingItemRequest {
                shopping_list: list,
                name,
                quantity,
                unit,
            };
            let item = api.add_item(&request).await?;
            println!("Added {} (#{})", item.name, item.id);
        }
        ItemsCommand::Update {
            id,
            name,
            quantity,
            unit,
        } => {
            if name.is_none() && quantity.is_none() && unit.is_none() {
                bail!("nothing to update; pass --name, --quantity or --unit");
            }
            let patch = UpdateShoppingItemRequest {
                name,
                quantity,
                unit,
                ..UpdateShoppingItemRequest::default()
            };
            let item = api.update_item(id, &patch).await?;
            print_item(&item);
        }
        ItemsCommand::Check { id } => print_item(&api.toggle_item_check(id).await?),
        ItemsCommand::Pin { id } => print_item(&api.toggle_item_pin(id).await?),
        ItemsCommand::Delete { id } => {
            api.delete_item(id).await?;
            println!("Deleted item #{id}");
        }
        ItemsCommand::Reorder { ids } => {
            api.reorder_items(&ids).await?;
            println!("Reordered {} items", ids.len());
        }
    }
    Ok(())
}

fn print_item(item: &ShoppingItem) {
    let check = if item.is_checked { "[x]" } else { "[ ]" };
    let amount = item
        .amount()
        .map(|amount| format!("  {amount}"))
        .unwrap_or_default();
    println!(
        "{} {check} {:>5}  {}{amount}",
        pin_marker(item.is_pinned),
        item.id,
        item.name
    );
}
