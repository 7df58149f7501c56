//! Shop Console CLI - command-line client for the catalog API.
//!
//! # Usage
//!
//! ```bash
//! # List shops on vacation, sorted by name
//! shop-console shops list --sort name --in-vacations true
//!
//! # Products of one shop in one category
//! shop-console products list --shop 3 --category 2
//!
//! # Create a category
//! shop-console categories create "Boulangerie"
//! ```
//!
//! Results are printed as JSON. The API origin is read from `--api-url` or
//! `CATALOG_API_URL` (a `.env` file is honoured).

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Args, Parser, Subcommand};

mod commands;

use commands::{CliError, Context};

#[derive(Parser)]
#[command(name = "shop-console")]
#[command(author, version, about = "Shop catalog command-line client")]
struct Cli {
    /// Catalog API origin, e.g. `http://localhost:8080/api/v1`
    #[arg(long, env = "CATALOG_API_URL", global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage shops
    Shops {
        #[command(subcommand)]
        action: ShopAction,
    },
    /// Browse products
    Products {
        #[command(subcommand)]
        action: ProductAction,
    },
    /// Manage categories
    Categories {
        #[command(subcommand)]
        action: CategoryAction,
    },
}

/// Paging, sorting and search shared by every list command.
#[derive(Args, Debug, Clone)]
pub struct ListArgs {
    /// 1-based page number
    #[arg(long, default_value_t = 1)]
    pub page: u32,

    /// Page size
    #[arg(long, default_value_t = 9)]
    pub size: u32,

    /// Sort key (ignores filters when set)
    #[arg(long)]
    pub sort: Option<String>,

    /// Name search
    #[arg(long)]
    pub search: Option<String>,
}

#[derive(Subcommand)]
enum ShopAction {
    /// List shops
    List {
        #[command(flatten)]
        list: ListArgs,

        /// Only shops on vacation (`true`) or open (`false`)
        #[arg(long)]
        in_vacations: Option<bool>,

        /// Created on or after (YYYY-MM-DD)
        #[arg(long)]
        created_after: Option<chrono::NaiveDate>,

        /// Created on or before (YYYY-MM-DD)
        #[arg(long)]
        created_before: Option<chrono::NaiveDate>,
    },
    /// Show one shop
    Show { id: i64 },
    /// Delete a shop
    Delete { id: i64 },
}

#[derive(Subcommand)]
enum ProductAction {
    /// List products
    List {
        #[command(flatten)]
        list: ListArgs,

        /// Only products of this shop
        #[arg(long)]
        shop: Option<i64>,

        /// Only products in this category
        #[arg(long)]
        category: Option<i64>,
    },
    /// Show one product
    Show { id: i64 },
}

#[derive(Subcommand)]
enum CategoryAction {
    /// List categories
    List {
        #[command(flatten)]
        list: ListArgs,
    },
    /// Create a category
    Create { name: String },
    /// Delete a category
    Delete { id: i64 },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shop_console_cli=info,shop_console_admin=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let ctx = Context::connect(cli.api_url.as_deref())?;

    match cli.command {
        Commands::Shops { action } => match action {
            ShopAction::List {
                list,
                in_vacations,
                created_after,
                created_before,
            } => {
                let filter = shop_console_admin::services::ShopFilter {
                    in_vacations,
                    created_after,
                    created_before,
                };
                commands::shops::list(&ctx, &list, filter).await?;
            }
            ShopAction::Show { id } => commands::shops::show(&ctx, id.into()).await?,
            ShopAction::Delete { id } => commands::shops::delete(&ctx, id.into()).await?,
        },
        Commands::Products { action } => match action {
            ProductAction::List {
                list,
                shop,
                category,
            } => {
                let filter = shop_console_admin::services::ProductFilter {
                    shop_id: shop.map(Into::into),
                    category_id: category.map(Into::into),
                };
                commands::products::list(&ctx, &list, filter).await?;
            }
            ProductAction::Show { id } => commands::products::show(&ctx, id.into()).await?,
        },
        Commands::Categories { action } => match action {
            CategoryAction::List { list } => commands::categories::list(&ctx, &list).await?,
            CategoryAction::Create { name } => commands::categories::create(&ctx, &name).await?,
            CategoryAction::Delete { id } => commands::categories::delete(&ctx, id.into()).await?,
        },
    }
    Ok(())
}
