//! Tavola CLI - the food-ordering storefront for terminals.
//!
//! # Usage
//!
//! ```bash
//! # Browse the menu
//! tavola menu list
//! tavola menu list --category dessert
//!
//! # Manage the cart (works signed out; syncs to the backend once signed in)
//! tavola cart add 3 --quantity 2
//! tavola cart show
//! tavola cart checkout
//!
//! # Sign in and track orders
//! tavola auth login -e ada@example.com -p <password>
//! tavola order list
//!
//! # Admin: manage dishes and order statuses
//! tavola admin dish add --name "Margherita" --price 11.50 --category main
//! tavola admin order set-status 17 preparing
//! ```
//!
//! # Environment Variables
//!
//! - `TAVOLA_API_BASE_URL` - Base URL of the ordering backend (required)
//! - `TAVOLA_DATA_DIR` - Override for the local cart/session directory

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;

use tavola_client::error::ApiError;
use tavola_core::{DishCategory, DishId, OrderId, OrderStatus};

mod commands;

use commands::Context;

#[derive(Parser)]
#[command(name = "tavola")]
#[command(author, version, about = "Tavola food-ordering storefront")]
struct Cli {
    /// Wait out a rate-limit window and retry once instead of failing
    #[arg(long, global = true)]
    wait: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the signed-in session
    Auth {
        #[command(subcommand)]
        action: AuthAction,
    },
    /// Browse the menu
    Menu {
        #[command(subcommand)]
        action: MenuAction,
    },
    /// Manage the cart and check out
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Track placed orders
    Order {
        #[command(subcommand)]
        action: OrderAction,
    },
    /// Manage dishes and order statuses (admin)
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum AuthAction {
    /// Create an account and sign in
    Register {
        /// Email address
        #[arg(short, long)]
        email: String,

        /// Display name
        #[arg(short, long)]
        name: String,

        /// Password
        #[arg(short, long)]
        password: String,
    },
    /// Sign in
    Login {
        /// Email address
        #[arg(short, long)]
        email: String,

        /// Password
        #[arg(short, long)]
        password: String,
    },
    /// Sign out
    Logout,
    /// Show the signed-in user
    Whoami,
}

#[derive(Subcommand)]
enum MenuAction {
    /// List dishes, optionally by category
    List {
        /// Filter by category (starter, main, side, dessert, drink)
        #[arg(short, long)]
        category: Option<DishCategory>,
    },
    /// Show one dish
    Show {
        /// Dish id
        dish_id: DishId,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show the cart
    Show,
    /// Add a dish to the cart
    Add {
        /// Dish id
        dish_id: DishId,

        /// How many to add
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Remove a dish from the cart
    Remove {
        /// Dish id
        dish_id: DishId,
    },
    /// Set the quantity for a dish (0 removes it)
    Update {
        /// Dish id
        dish_id: DishId,

        /// New quantity
        quantity: i64,
    },
    /// Empty the cart
    Clear,
    /// Turn the cart into an order
    Checkout,
}

#[derive(Subcommand)]
enum OrderAction {
    /// List your orders
    List,
    /// Show one order
    Show {
        /// Order id
        order_id: OrderId,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Manage menu dishes
    Dish {
        #[command(subcommand)]
        action: AdminDishAction,
    },
    /// Manage orders
    Order {
        #[command(subcommand)]
        action: AdminOrderAction,
    },
}

#[derive(Subcommand)]
enum AdminDishAction {
    /// Add a dish to the menu
    Add {
        /// Dish name
        #[arg(long)]
        name: String,

        /// Price in the store currency (e.g., 11.50)
        #[arg(long)]
        price: Decimal,

        /// Category (starter, main, side, dessert, drink)
        #[arg(long, default_value = "main")]
        category: DishCategory,

        /// Description shown on the menu
        #[arg(long)]
        description: Option<String>,

        /// Image URL
        #[arg(long)]
        image_url: Option<String>,

        /// Start the dish as unavailable
        #[arg(long)]
        unavailable: bool,
    },
    /// Replace a dish's menu entry
    Update {
        /// Dish id
        dish_id: DishId,

        #[arg(long)]
        name: String,

        #[arg(long)]
        price: Decimal,

        #[arg(long, default_value = "main")]
        category: DishCategory,

        #[arg(long)]
        description: Option<String>,

        #[arg(long)]
        image_url: Option<String>,

        #[arg(long)]
        unavailable: bool,
    },
    /// Remove a dish from the menu
    Remove {
        /// Dish id
        dish_id: DishId,
    },
    /// Mark a dish available or sold out
    Availability {
        /// Dish id
        dish_id: DishId,

        /// `true` to offer the dish, `false` to mark it sold out
        available: bool,
    },
}

#[derive(Subcommand)]
enum AdminOrderAction {
    /// Move an order to a new status
    SetStatus {
        /// Order id
        order_id: OrderId,

        /// New status (placed, confirmed, preparing, out_for_delivery,
        /// delivered, cancelled)
        status: OrderStatus,
    },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        if let Some(api_err) = e.downcast_ref::<ApiError>() {
            commands::report_error(api_err);
        } else {
            tracing::error!("Command failed: {e}");
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut ctx = Context::from_env()?;
    let wait = cli.wait;

    match cli.command {
        Commands::Auth { action } => match action {
            AuthAction::Register {
                email,
                name,
                password,
            } => commands::auth::register(&mut ctx, &email, &password, &name).await?,
            AuthAction::Login { email, password } => {
                commands::auth::login(&mut ctx, &email, &password).await?;
            }
            AuthAction::Logout => commands::auth::logout(&mut ctx).await?,
            AuthAction::Whoami => commands::auth::whoami(&ctx).await?,
        },
        Commands::Menu { action } => match action {
            MenuAction::List { category } => commands::menu::list(&ctx, category).await?,
            MenuAction::Show { dish_id } => commands::menu::show(&ctx, dish_id).await?,
        },
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(&ctx).await,
            CartAction::Add { dish_id, quantity } => {
                commands::cart::add(&ctx, dish_id, quantity, wait).await?;
            }
            CartAction::Remove { dish_id } => {
                commands::cart::remove(&ctx, dish_id, wait).await?;
            }
            CartAction::Update { dish_id, quantity } => {
                commands::cart::update(&ctx, dish_id, quantity, wait).await?;
            }
            CartAction::Clear => commands::cart::clear(&ctx).await,
            CartAction::Checkout => commands::cart::checkout(&ctx).await?,
        },
        Commands::Order { action } => match action {
            OrderAction::List => commands::order::list(&ctx).await?,
            OrderAction::Show { order_id } => commands::order::show(&ctx, order_id).await?,
        },
        Commands::Admin { action } => match action {
            AdminAction::Dish { action } => match action {
                AdminDishAction::Add {
                    name,
                    price,
                    category,
                    description,
                    image_url,
                    unavailable,
                } => {
                    commands::admin::add_dish(
                        &ctx,
                        name,
                        price,
                        category,
                        description,
                        image_url,
                        !unavailable,
                    )
                    .await?;
                }
                AdminDishAction::Update {
                    dish_id,
                    name,
                    price,
                    category,
                    description,
                    image_url,
                    unavailable,
                } => {
                    commands::admin::update_dish(
                        &ctx,
                        dish_id,
                        name,
                        price,
                        category,
                        description,
                        image_url,
                        !unavailable,
                    )
                    .await?;
                }
                AdminDishAction::Remove { dish_id } => {
                    commands::admin::remove_dish(&ctx, dish_id).await?;
                }
                AdminDishAction::Availability { dish_id, available } => {
                    commands::admin::set_dish_availability(&ctx, dish_id, available).await?;
                }
            },
            AdminAction::Order { action } => match action {
                AdminOrderAction::SetStatus { order_id, status } => {
                    commands::admin::set_order_status(&ctx, order_id, status).await?;
                }
            },
        },
    }
    Ok(())
}
