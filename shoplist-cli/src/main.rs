//! Entry point for the `shoplist` command-line client.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use dotenv::dotenv;
use shared::config::{ClientConfig, ConfigFormat};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, fmt};
use url::Url;

mod app;
mod commands;

use app::App;
use commands::{
    groups::GroupsCommand,
    invitations::InvitationsCommand,
    recipes::{IngredientsCommand, RecipesCommand},
    session::SessionCommand,
    shopping::{ItemsCommand, ListsCommand},
    tabs::TabCommand,
    users::UsersCommand,
};

/// ShopList CLI
#[derive(Parser, Debug)]
#[command(name = "shoplist", version)]
#[command(about = "Shared shopping lists and recipes for your groups", long_about = None)]
pub struct Cli {
    /// Path to the configuration file (YAML or JSON)
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    /// Base URL of the ShopList API, overriding the configuration
    #[arg(long, global = true)]
    api_url: Option<Url>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Log in, register, or inspect the current session
    #[command(subcommand)]
    Session(SessionCommand),

    /// Manage your groups and their members
    #[command(subcommand)]
    Groups(GroupsCommand),

    /// Review invitations to join groups
    #[command(subcommand)]
    Invitations(InvitationsCommand),

    /// Look up other users
    #[command(subcommand)]
    Users(UsersCommand),

    /// Manage a group's shopping lists
    #[command(subcommand)]
    Lists(ListsCommand),

    /// Manage the items on a shopping list
    #[command(subcommand)]
    Items(ItemsCommand),

    /// Manage a group's recipes
    #[command(subcommand)]
    Recipes(RecipesCommand),

    /// Manage the ingredients of a recipe
    #[command(subcommand)]
    Ingredients(IngredientsCommand),

    /// Read or change the remembered tab of a group
    #[command(subcommand)]
    Tab(TabCommand),

    /// Generate a configuration file
    Config {
        /// Format of the configuration file to generate (yaml or json)
        #[arg(long, short, default_value = "yaml")]
        format: ConfigFormat,
    },

    /// Generate shell completion scripts for the CLI
    Completion {
        /// The shell to generate the completion script for
        #[arg(long, short)]
        shell: Shell,
    },
}

/// Install the stderr subscriber. `RUST_LOG` wins over the configured level.
fn initialize_tracing(config: &ClientConfig) {
    let default_level = config
        .log_level
        .trim()
        .parse::<LevelFilter>()
        .unwrap_or(LevelFilter::INFO);
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::builder()
            .with_default_directive(default_level.into())
            .parse_lossy("")
    });

    fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let cli = Cli::parse();

    let command = match cli.command {
        Commands::Config { format } => return commands::config::generate_config(format),
        Commands::Completion { shell } => {
            commands::completion::generate_completion(shell);
            return Ok(());
        }
        command => command,
    };

    let config =
        ClientConfig::load_config(cli.config, cli.api_url).context("failed to load configuration")?;
    initialize_tracing(&config);
    let app = App::open(config)?;

    match command {
        Commands::Session(command) => commands::session::run(&app, command).await,
        Commands::Groups(command) => commands::groups::run(&app, command).await,
        Commands::Invitations(command) => commands::invitations::run(&app, command).await,
        Commands::Users(command) => commands::users::run(&app, command).await,
        Commands::Lists(command) => commands::shopping::run_lists(&app, command).await,
        Commands::Items(command) => commands::shopping::run_items(&app, command).await,
        Commands::Recipes(command) => commands::recipes::run_recipes(&app, command).await,
        Commands::Ingredients(command) => commands::recipes::run_ingredients(&app, command).await,
        Commands::Tab(command) => commands::tabs::run(&app, command),
        Commands::Config { .. } | Commands::Completion { .. } => Ok(()),
    }
}
