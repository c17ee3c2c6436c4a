use anyhow::{Context, Result};
use chrono::{Datelike, Utc};
use foodgram::cli::{parse_args, Command};
use foodgram::config::Config;
use foodgram::ingredient_loader::load_ingredients;
use foodgram::models::NewUser;
use foodgram::server::start_server;
use foodgram::shopping_list::{export_shopping_list, shopping_list_for_user, FontSource, RenderOptions};
use foodgram::storage::Store;
use tokio::fs;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

fn open_store(config: &Config) -> Result<Store> {
    Store::open(&config.database_path)
        .with_context(|| format!("Failed to open database '{}'", config.database_path.display()))
}

async fn write_shopping_list(config: &Config, username: &str, output: Option<std::path::PathBuf>) -> Result<()> {
    let store = open_store(config)?;
    let user = store
        .user_by_username(username)
        .with_context(|| format!("Unknown user '{}'", username))?;
    let list = shopping_list_for_user(&store, user.id)?;

    let fonts = FontSource::new(config.font_dir.clone());
    let options = RenderOptions {
        title: &config.list_title,
        font: &config.font,
        font_size: config.font_size,
        year: Utc::now().year(),
    };
    let export = export_shopping_list(&list, &fonts, &options).context("Failed to render shopping list")?;

    let path = output.unwrap_or_else(|| export.filename.clone().into());
    fs::write(&path, &export.bytes)
        .await
        .with_context(|| format!("Failed to write '{}'", path.display()))?;
    println!("Wrote {} ingredient(s) to {}", list.len(), path.display());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok(); // Load .env file for configuration
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let cli_args = parse_args();
    let config = Config::load()?;

    match cli_args.command {
        Command::Serve => start_server(config).await?,
        Command::LoadIngredients { file } => {
            let store = open_store(&config)?;
            let report = load_ingredients(&store, &file)?;
            info!("Loaded ingredients from {}", file.display());
            println!("Inserted {} ingredient(s), skipped {} existing", report.inserted, report.skipped);
        }
        Command::CreateUser {
            username,
            email,
            first_name,
            last_name,
        } => {
            let store = open_store(&config)?;
            let (user, token) = store.create_user(&NewUser {
                username,
                email,
                first_name,
                last_name,
            })?;
            println!("Created user {} (id {})", user.username, user.id);
            println!("Token: {}", token);
        }
        Command::CreateTag { name, color, slug } => {
            let store = open_store(&config)?;
            let tag = store.create_tag(&name, &color, &slug)?;
            println!("Created tag {} (id {})", tag.name, tag.id);
        }
        Command::ShoppingList { username, output } => {
            write_shopping_list(&config, &username, output).await?;
        }
    }

    Ok(())
}
