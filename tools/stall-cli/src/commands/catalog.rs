//! List the catalog.

use anyhow::{Context as _, Result};
use stall_checkout::CardData;
use stall_commerce::Product;
use tracing::warn;

use super::{build_api, CatalogArgs};
use crate::context::Context;

/// Run the catalog command.
pub async fn run(args: CatalogArgs, ctx: &Context) -> Result<()> {
    let api = build_api(ctx, args.catalog.as_deref())?;
    let session = &ctx.config.session;

    let spinner = ctx.output.spinner("Fetching catalog...");
    let fetched = api.fetch_catalog().await;
    spinner.finish_and_clear();

    let (items, degraded) = match (fetched, &session.fallback_catalog) {
        (Ok(items), _) => (items, false),
        (Err(e), Some(fallback)) => {
            warn!(error = %e, "catalog fetch failed, listing fallback");
            (fallback.clone(), true)
        }
        (Err(e), None) => return Err(e).context("Failed to fetch catalog"),
    };

    let items: Vec<Product> = items
        .into_iter()
        .filter(|product| !args.for_sale || product.is_for_sale())
        .collect();

    if ctx.output.is_json() {
        ctx.output.json(&serde_json::json!({
            "degraded": degraded,
            "total": items.len(),
            "items": items,
        }));
        return Ok(());
    }

    ctx.output.header(&format!("Catalog ({} products)", items.len()));
    if degraded {
        ctx.output.warn("Catalog unavailable, showing fallback list");
    }
    if items.is_empty() {
        ctx.output.info("No products");
        return Ok(());
    }

    let widths = [36, 28, 12, 16];
    ctx.output.table_row(&["ID", "TITLE", "CATEGORY", "PRICE"], &widths);
    for product in &items {
        let card = CardData::new(product, session);
        ctx.output.table_row(
            &[
                card.id.as_str(),
                card.title.as_str(),
                card.category.as_str(),
                card.price_label.as_str(),
            ],
            &widths,
        );
    }

    if ctx.output.is_verbose() {
        let priceless = items.iter().filter(|p| !p.is_for_sale()).count();
        ctx.output.debug(&format!("{} not for sale", priceless));
    }

    Ok(())
}
