pub mod commands;
pub mod logging;
pub mod render;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use pricebook_core::config::{AppConfig, LoadOptions};

use crate::commands::add_price::AddPriceArgs;
use crate::commands::add_product::AddProductArgs;
use crate::commands::prices::ListPricesArgs;
use crate::commands::products::ListProductsArgs;
use crate::commands::CommandResult;

#[derive(Debug, Parser)]
#[command(
    name = "pricebook",
    about = "Pricebook catalog CLI",
    long_about = "Browse, register, and remove products and market prices held by the catalog service.",
    after_help = "Examples:\n  pricebook products --name milk --sort brand\n  pricebook add-price --product-id p-1 --market Atacadão --price 4,99\n  pricebook smoke"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Path to a pricebook.toml config file")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "List products, optionally filtered by name and sorted")]
    Products {
        #[arg(long, help = "Case-insensitive product name filter")]
        name: Option<String>,
        #[arg(long, help = "created_at|productName|brand|weight|status")]
        sort: Option<String>,
        #[arg(long, help = "asc|desc")]
        direction: Option<String>,
    },
    #[command(about = "List prices, optionally filtered by product name and market")]
    Prices {
        #[arg(long, help = "Case-insensitive product name filter")]
        name: Option<String>,
        #[arg(long, help = "Case-insensitive market filter")]
        market: Option<String>,
        #[arg(long, help = "created_at|productRelName|brandRelName|market|price")]
        sort: Option<String>,
        #[arg(long, help = "asc|desc")]
        direction: Option<String>,
    },
    #[command(about = "List preset markets plus markets seen in the price history")]
    Markets,
    #[command(about = "Register a product")]
    AddProduct {
        #[arg(long)]
        name: String,
        #[arg(long)]
        brand: String,
        #[arg(long, help = "Accepts `,` or `.` as the decimal separator")]
        weight: String,
        #[arg(long, help = "Register the product as inactive")]
        inactive: bool,
    },
    #[command(about = "Register a price for a product at a market")]
    AddPrice {
        #[arg(long)]
        product_id: String,
        #[arg(long)]
        market: String,
        #[arg(long, help = "Accepts `,` or `.` as the decimal separator")]
        price: String,
    },
    #[command(about = "Remove a product by id")]
    DeleteProduct {
        #[arg(long)]
        id: String,
    },
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
    #[command(about = "Run config, backend, and catalog round-trip checks with timings")]
    Smoke,
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    let options = load_options(cli.config.clone());

    if let Ok(config) = AppConfig::load(options.clone()) {
        if let Err(error) = logging::init_logging(&config.logging) {
            eprintln!("{error:#}");
        }
    }

    let result = execute(cli.command, &options);
    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

pub fn run_from<I, T>(args: I) -> Result<CommandResult, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = Cli::try_parse_from(args)?;
    let options = load_options(cli.config);
    Ok(execute(cli.command, &options))
}

/// An explicit `--config` path must exist; otherwise the default search applies.
fn load_options(config_path: Option<PathBuf>) -> LoadOptions {
    LoadOptions {
        require_file: config_path.is_some(),
        config_path,
        ..LoadOptions::default()
    }
}

fn execute(command: Command, options: &LoadOptions) -> CommandResult {
    match command {
        Command::Products { name, sort, direction } => {
            commands::products::run(options, &ListProductsArgs { name, sort, direction })
        }
        Command::Prices { name, market, sort, direction } => {
            commands::prices::run(options, &ListPricesArgs { name, market, sort, direction })
        }
        Command::Markets => commands::markets::run(options),
        Command::AddProduct { name, brand, weight, inactive } => commands::add_product::run(
            options,
            &AddProductArgs { name, brand, weight, active: !inactive },
        ),
        Command::AddPrice { product_id, market, price } => {
            commands::add_price::run(options, &AddPriceArgs { product_id, market, price })
        }
        Command::DeleteProduct { id } => commands::delete_product::run(options, &id),
        Command::Config => commands::config::run(options),
        Command::Smoke => commands::smoke::run(options),
    }
}
