//! Stall CLI - a terminal storefront over the stall core.
//!
//! Commands:
//! - `stall run` - Play a shopping script against the catalog
//! - `stall shop` - Shop interactively
//! - `stall catalog` - List the catalog
//! - `stall config` - Manage configuration

mod commands;
mod config;
mod context;
mod output;
mod runtime;
mod terminal;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{CatalogArgs, ConfigArgs, RunArgs, ShopArgs};

/// Stall CLI - Browse the catalog and place orders from the terminal
#[derive(Parser)]
#[command(name = "stall")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Increase log verbosity (repeat for more)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Use JSON output format
    #[arg(long, global = true)]
    json: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a shopping script
    Run(RunArgs),

    /// Shop interactively
    Shop(ShopArgs),

    /// List the catalog
    Catalog(CatalogArgs),

    /// Manage configuration
    Config(ConfigArgs),
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let output = output::Output::new(cli.verbose > 0, cli.json);
    let ctx = match context::Context::load(cli.config.as_deref(), output.clone()) {
        Ok(ctx) => ctx,
        Err(e) => {
            output.error(&format!("{:#}", e));
            std::process::exit(1);
        }
    };

    let logging = ctx.config.logging;
    stall_observability::init_logging(&logging.with_level(logging.level.raised(cli.verbose)));

    let result = match cli.command {
        Commands::Run(args) => commands::run::run(args, &ctx).await,
        Commands::Shop(args) => commands::shop::run(args, &ctx).await,
        Commands::Catalog(args) => commands::catalog::run(args, &ctx).await,
        Commands::Config(args) => commands::config::run(args, &ctx).await,
    };

    if let Err(e) = result {
        ctx.output.error(&format!("{:#}", e));
        std::process::exit(1);
    }

    Ok(())
}
