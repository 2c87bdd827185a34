//! # Boutique CLI Entry Point
//!
//! Drives the storefront state container from the command line.
//!
//! ## Application Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        boutique (CLI)                                   │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  main.rs ────► parse args, load AppConfig, open Storefront       │  │
//! │  │                                                                  │  │
//! │  │  commands/ ──► catalog refresh, bag add, checkout place, ...     │  │
//! │  │                                                                  │  │
//! │  │  state/ ─────► StorefrontState (restored from last snapshot)     │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                   │                                 │                   │
//! │                   ▼                                 ▼                   │
//! │  ┌────────────────────────────┐     ┌──────────────────────────────┐   │
//! │  │  SQLite (storefront.db)    │     │  Firestore / --catalog-file  │   │
//! │  │  one JSON state blob       │     │  categories, products        │   │
//! │  └────────────────────────────┘     └──────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Startup Sequence
//! 1. Initialize tracing (stderr)
//! 2. Load configuration (file, environment)
//! 3. Open the database and restore the saved state
//! 4. Run one command, print its JSON result on stdout
//! 5. Flush the pending snapshot and close the database
//!
//! Errors are printed as `{"code": .., "message": ..}` on stderr with exit
//! status 1.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use boutique_core::{DeliveryDetailsPatch, Money};
use boutique_storefront::commands::{bag, catalog, checkout};
use boutique_storefront::error::{AppError, AppResult};
use boutique_storefront::state::{AppConfig, StorefrontState, TracingSink};
use boutique_storefront::{init_tracing, CatalogBackend, Storefront};

#[derive(Debug, Parser)]
#[command(name = "boutique", version, about = "Boutique storefront catalog, bag and checkout")]
struct Cli {
    /// Config file (default: storefront.toml in the platform config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Serve the catalog from a local JSON file instead of Firestore
    #[arg(long, global = true)]
    catalog_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Browse and refresh the catalog cache
    #[command(subcommand)]
    Catalog(CatalogCommand),

    /// Manage the shopping bag
    #[command(subcommand)]
    Bag(BagCommand),

    /// Delivery details and order placement
    #[command(subcommand)]
    Checkout(CheckoutCommand),
}

#[derive(Debug, Subcommand)]
enum CatalogCommand {
    /// Fetch categories and products from the catalog source
    Refresh,
    /// List cached categories
    Categories,
    /// Show one category and its products
    Category { id: String },
    /// Show one product (falls back to the catalog source)
    Product { category: String, id: String },
}

#[derive(Debug, Args)]
struct Variation {
    product_id: String,
    #[arg(long)]
    color: String,
    #[arg(long)]
    size: String,
}

#[derive(Debug, Subcommand)]
enum BagCommand {
    /// Show bag contents and totals
    Show,
    /// Add a product variation
    Add {
        #[command(flatten)]
        variation: Variation,
        #[arg(long, default_value_t = 1)]
        quantity: u32,
    },
    /// Remove some of a product variation
    Remove {
        #[command(flatten)]
        variation: Variation,
        #[arg(long, default_value_t = 1)]
        quantity: u32,
    },
    /// Current quantity of a product variation
    Quantity {
        #[command(flatten)]
        variation: Variation,
    },
    /// Empty the bag
    Clear,
}

#[derive(Debug, Subcommand)]
enum CheckoutCommand {
    /// Show or update delivery details
    Details(DetailsArgs),
    /// Price the bag and assign an order number
    Place,
    /// Record whether the confirmation email was sent
    EmailStatus {
        #[arg(long, action = clap::ArgAction::Set)]
        sent: bool,
    },
    /// Reset the order status flags
    Reset,
}

#[derive(Debug, Default, Args)]
struct DetailsArgs {
    #[arg(long)]
    first_name: Option<String>,
    #[arg(long)]
    last_name: Option<String>,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    phone: Option<String>,
    #[arg(long)]
    address_line1: Option<String>,
    #[arg(long)]
    address_line2: Option<String>,
    #[arg(long)]
    city: Option<String>,
    #[arg(long)]
    postal_code: Option<String>,
    #[arg(long)]
    country: Option<String>,
    /// Delivery fee as a decimal amount, e.g. 4.95; 0 means free delivery.
    /// Without one, `checkout place` charges the configured default.
    #[arg(long)]
    delivery_fee: Option<String>,
}

impl DetailsArgs {
    fn into_patch(self) -> AppResult<DeliveryDetailsPatch> {
        let delivery_fee = self
            .delivery_fee
            .as_deref()
            .map(Money::parse_decimal)
            .transpose()?;

        Ok(DeliveryDetailsPatch {
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            phone: self.phone,
            address_line1: self.address_line1,
            address_line2: self.address_line2,
            city: self.city,
            postal_code: self.postal_code,
            country: self.country,
            delivery_fee,
            ..Default::default()
        })
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let cli = Cli::parse();
    debug!(?cli, "Parsed arguments");

    match run(cli).await {
        Ok(output) => match serde_json::to_string_pretty(&output) {
            Ok(text) => {
                println!("{}", text);
                ExitCode::SUCCESS
            }
            Err(e) => report(AppError::from(e)),
        },
        Err(e) => report(e),
    }
}

fn report(err: AppError) -> ExitCode {
    match serde_json::to_string(&err) {
        Ok(text) => eprintln!("{}", text),
        Err(_) => eprintln!("{}", err),
    }
    ExitCode::FAILURE
}

async fn run(cli: Cli) -> AppResult<Value> {
    let config = AppConfig::load(cli.config)?;

    let mut storefront = Storefront::open(&config, Arc::new(TracingSink)).await?;
    info!("Storefront ready");

    let output = dispatch(
        cli.command,
        storefront.state_mut(),
        &config,
        cli.catalog_file.as_deref(),
    )
    .await;

    // Flush even when the command failed; earlier mutations still count
    let writes = storefront.shutdown().await?;
    debug!(writes, "Snapshots written");

    output
}

async fn dispatch(
    command: Command,
    state: &mut StorefrontState,
    config: &AppConfig,
    catalog_file: Option<&Path>,
) -> AppResult<Value> {
    match command {
        Command::Catalog(command) => match command {
            CatalogCommand::Refresh => {
                let source = CatalogBackend::from_config(config, catalog_file)?;
                to_json(catalog::refresh_catalog(state, &source).await?)
            }
            CatalogCommand::Categories => to_json(catalog::list_categories(state)),
            CatalogCommand::Category { id } => to_json(catalog::get_category(state, &id)?),
            CatalogCommand::Product { category, id } => {
                let source = CatalogBackend::from_config(config, catalog_file)?;
                to_json(catalog::get_product(state, &source, &category, &id).await?)
            }
        },
        Command::Bag(command) => match command {
            BagCommand::Show => to_json(bag::get_bag(state)?),
            BagCommand::Add {
                variation,
                quantity,
            } => to_json(bag::add_to_bag(
                state,
                &variation.product_id,
                &variation.color,
                &variation.size,
                quantity,
            )?),
            BagCommand::Remove {
                variation,
                quantity,
            } => to_json(bag::remove_from_bag(
                state,
                &variation.product_id,
                &variation.color,
                &variation.size,
                quantity,
            )?),
            BagCommand::Quantity { variation } => to_json(bag::quantity_of(
                state,
                &variation.product_id,
                &variation.color,
                &variation.size,
            )),
            BagCommand::Clear => to_json(bag::clear_bag(state)?),
        },
        Command::Checkout(command) => match command {
            CheckoutCommand::Details(args) => {
                let patch = args.into_patch()?;
                if patch.is_empty() {
                    to_json(state.delivery_details())
                } else {
                    to_json(checkout::set_delivery_details(state, patch)?)
                }
            }
            CheckoutCommand::Place => to_json(checkout::place_order(state, config)?),
            CheckoutCommand::EmailStatus { sent } => {
                to_json(checkout::set_email_status(state, sent))
            }
            CheckoutCommand::Reset => to_json(checkout::reset_order_status(state)),
        },
    }
}

fn to_json<T: Serialize>(value: T) -> AppResult<Value> {
    Ok(serde_json::to_value(value)?)
}
