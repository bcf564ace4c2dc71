//! rbox-sl - Recipe Box shopping list client
//!
//! Shows the combined ingredient list for every recipe on the user's
//! shopping list, and changes per-recipe serving counts.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rbox_common::config::{ClientSettings, ConfigResolver};
use rbox_common::RecipeId;
use rbox_sl::render::{render_recipes, render_summary};
use rbox_sl::{
    ApiClient, FetchState, FileTokenStore, ServingsUpdate, ShoppingListView, TokenStore,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for rbox-sl
#[derive(Parser, Debug)]
#[command(name = "rbox-sl")]
#[command(about = "Shopping list client for Recipe Box")]
#[command(version)]
struct Args {
    /// Backend base URL (overrides RBOX_API_URL and config file)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Config file path (overrides RBOX_CONFIG)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Token file path (overrides RBOX_TOKEN_FILE and config file)
    #[arg(long, global = true)]
    token_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the combined summary and the per-recipe table
    Show {
        /// Print the snapshot as JSON instead of tables
        #[arg(long)]
        json: bool,
    },
    /// Set how many servings of a recipe to shop for (0 removes it)
    Servings {
        recipe_id: RecipeId,
        servings: u32,
    },
    /// Remove a recipe from the shopping list
    Remove { recipe_id: RecipeId },
    /// Manage the stored bearer token
    Token {
        #[command(subcommand)]
        action: TokenCommand,
    },
}

#[derive(Subcommand, Debug)]
enum TokenCommand {
    /// Store a bearer token issued by the backend
    Set { token: String },
    /// Forget the stored token
    Clear,
    /// Report whether a token is stored
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let resolver = ConfigResolver::new(args.config.as_deref());
    let settings = resolver.resolve(args.api_url.as_deref(), args.token_file.as_deref());

    // Logs go to stderr so stdout stays clean for tables and JSON
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("rbox_sl={0},rbox_common={0}", settings.log_level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!(
        "Starting rbox-sl v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    resolver.log_source();
    info!("API base URL: {}", settings.api_base_url);

    let tokens: Arc<dyn TokenStore> = Arc::new(FileTokenStore::new(&settings.token_file));

    match args.command {
        Command::Show { json } => show(&settings, tokens, json).await,
        Command::Servings {
            recipe_id,
            servings,
        } => update_servings(&settings, tokens, recipe_id, servings).await,
        Command::Remove { recipe_id } => update_servings(&settings, tokens, recipe_id, 0).await,
        Command::Token { action } => token(&settings, tokens.as_ref(), action),
    }
}

async fn show(settings: &ClientSettings, tokens: Arc<dyn TokenStore>, json: bool) -> Result<()> {
    let client = ApiClient::new(settings, tokens).context("Failed to create API client")?;
    let mut view = ShoppingListView::new(client);

    view.refresh()
        .await
        .context("Failed to load shopping list")?;

    if let FetchState::Ready(snapshot) = view.state() {
        if json {
            let text = serde_json::to_string_pretty(snapshot)
                .context("Failed to serialize shopping list")?;
            println!("{}", text);
        } else {
            println!("Summary\n");
            print!("{}", render_summary(&snapshot.summary));
            if !snapshot.entries.is_empty() {
                println!("\nRecipes\n");
                print!("{}", render_recipes(snapshot.table()));
            }
        }
    }

    Ok(())
}

async fn update_servings(
    settings: &ClientSettings,
    tokens: Arc<dyn TokenStore>,
    recipe_id: RecipeId,
    servings: u32,
) -> Result<()> {
    let client = ApiClient::new(settings, tokens).context("Failed to create API client")?;

    let update = client
        .set_servings(recipe_id, servings)
        .await
        .with_context(|| format!("Failed to update recipe {}", recipe_id))?;

    if update.is_removal() {
        println!("Recipe #{} removed from the list", recipe_id);
    } else if let ServingsUpdate::Updated(entry) = &update {
        println!(
            "{} (#{}) now on the list for {} servings",
            entry.recipe_name, entry.recipe_id, entry.servings
        );
    }

    Ok(())
}

fn token(settings: &ClientSettings, tokens: &dyn TokenStore, action: TokenCommand) -> Result<()> {
    let location = settings.token_file.display();

    match action {
        TokenCommand::Set { token } => {
            tokens
                .set_token(Some(&token))
                .with_context(|| format!("Failed to save token to {}", location))?;
            println!("Token saved to {}", location);
        }
        TokenCommand::Clear => {
            tokens
                .set_token(None)
                .with_context(|| format!("Failed to remove {}", location))?;
            println!("Token cleared");
        }
        TokenCommand::Status => match tokens.token() {
            Some(_) => println!("Logged in (token at {})", location),
            None => println!("Not logged in"),
        },
    }

    Ok(())
}
