//! CLI command implementations.

pub mod catalog;
pub mod config;
pub mod run;
pub mod shop;

use std::rc::Rc;

use anyhow::{Context as _, Result};
use clap::{Args, Subcommand};
use stall_checkout::{AppSession, CheckoutCoordinator};
use stall_data::{FixtureApi, ShopApi};

use crate::context::Context;
use crate::runtime::LocalTaskSpawner;
use crate::terminal::TerminalView;

/// Product list shipped with the CLI.
const BUNDLED_CATALOG: &str = include_str!("../../fixtures/catalog.json");

/// Arguments for the run command.
#[derive(Args)]
pub struct RunArgs {
    /// Script file, or `-` for stdin.
    pub script: String,

    /// Product list file (overrides `api.catalog_path`).
    #[arg(long)]
    pub catalog: Option<String>,

    /// Fail unless the script ends on the success screen.
    #[arg(long)]
    pub expect_success: bool,
}

/// Arguments for the shop command.
#[derive(Args)]
pub struct ShopArgs {
    /// Product list file (overrides `api.catalog_path`).
    #[arg(long)]
    pub catalog: Option<String>,
}

/// Arguments for the catalog command.
#[derive(Args)]
pub struct CatalogArgs {
    /// Product list file (overrides `api.catalog_path`).
    #[arg(long)]
    pub catalog: Option<String>,

    /// Only list products that can be bought.
    #[arg(long)]
    pub for_sale: bool,
}

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration.
    Show,
    /// Initialize a new config file.
    Init {
        /// Force overwrite existing config.
        #[arg(short, long)]
        force: bool,
    },
    /// Validate the config file.
    Validate,
}

/// Build the shop API described by the `[api]` section.
pub fn build_api(ctx: &Context, catalog: Option<&str>) -> Result<Rc<dyn ShopApi>> {
    let api = &ctx.config.api;

    let fixture = if api.fail_catalog {
        FixtureApi::unavailable("catalog fetch disabled by configuration")
    } else {
        match catalog.or(api.catalog_path.as_deref()) {
            Some(path) => FixtureApi::from_path(ctx.resolve_path(path)),
            None => FixtureApi::from_json(BUNDLED_CATALOG).context("Bundled catalog is invalid")?,
        }
    };

    let fixture = if api.reject_orders {
        fixture.rejecting_orders(api.reject_message.clone())
    } else {
        fixture
    };

    let api: Rc<dyn ShopApi> = Rc::new(fixture);
    Ok(api)
}

/// Open a storefront session that prints to the terminal.
///
/// Must be called from inside a `LocalSet`.
pub fn open_storefront(ctx: &Context, catalog: Option<&str>) -> Result<Rc<CheckoutCoordinator>> {
    let api = build_api(ctx, catalog)?;
    Ok(CheckoutCoordinator::attach(
        Rc::new(AppSession::new()),
        api,
        Rc::new(LocalTaskSpawner),
        TerminalView::views(ctx.output.clone()),
        ctx.config.session.clone(),
    ))
}

/// Let spawned tasks run until no order submission is in flight.
pub async fn wait_for_submission(coordinator: &CheckoutCoordinator) {
    while coordinator.is_submitting() {
        tokio::task::yield_now().await;
    }
}
