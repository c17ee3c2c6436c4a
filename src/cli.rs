use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Recipe sharing backend with shopping list export", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP API
    Serve,

    /// Import ingredients from a `name,unit` CSV file
    LoadIngredients {
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Create a user and print its API token
    CreateUser {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long, default_value = "")]
        first_name: String,
        #[arg(long, default_value = "")]
        last_name: String,
    },

    /// Create a recipe tag
    CreateTag {
        #[arg(long)]
        name: String,
        /// Hex color, e.g. #E26C2D
        #[arg(long)]
        color: String,
        #[arg(long)]
        slug: String,
    },

    /// Render a user's shopping list to a PDF file
    ShoppingList {
        #[arg(short, long)]
        username: String,
        /// Output path; defaults to the generated shopping_list_<hash>.pdf name
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

pub fn parse_args() -> Cli {
    Cli::parse()
}
