//! Play a shopping script against the storefront.
//!
//! One action per line, `#` starts a comment line:
//!
//! ```text
//! select 854cef69-976d-4c2a-a18c-2aa45046c390
//! buy
//! basket
//! checkout
//! field payment card
//! field address 1 Main St
//! next
//! field email me@example.com
//! field phone +71234567890
//! pay
//! wait
//! ```

use std::io::Read;

use anyhow::{bail, Context as _, Result};
use stall_checkout::{CheckoutCoordinator, CheckoutStep};
use stall_commerce::buyer::BuyerField;
use stall_commerce::events::ShopEvent;
use stall_commerce::ProductId;
use thiserror::Error;
use tokio::task::LocalSet;
use tracing::debug;

use super::{open_storefront, wait_for_submission, RunArgs};
use crate::context::Context;
use crate::output::step_badge;

/// One script line.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Emit an intent on the session bus.
    Emit(ShopEvent),
    /// Add whatever product is being previewed.
    BuyPreviewed,
    /// Block until the pending order submission settles.
    Wait,
}

/// A script line that could not be understood.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("line {line}: {message}")]
pub struct ScriptError {
    pub line: usize,
    pub message: String,
}

/// Parse a whole script.
pub fn parse_script(text: &str) -> Result<Vec<Action>, ScriptError> {
    let mut actions = Vec::new();
    for (index, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let action = parse_line(line).map_err(|message| ScriptError {
            line: index + 1,
            message,
        })?;
        actions.push(action);
    }
    Ok(actions)
}

fn parse_line(line: &str) -> Result<Action, String> {
    let (verb, rest) = line
        .split_once(char::is_whitespace)
        .map(|(verb, rest)| (verb, rest.trim()))
        .unwrap_or((line, ""));

    let event = match verb {
        "select" => ShopEvent::ItemSelect {
            id: product_id(verb, rest)?,
        },
        "buy" if rest.is_empty() => return Ok(Action::BuyPreviewed),
        "buy" => ShopEvent::BasketAdd {
            id: product_id(verb, rest)?,
        },
        "remove" => ShopEvent::BasketRemove {
            id: product_id(verb, rest)?,
        },
        "clear" => ShopEvent::BasketClear,
        "basket" => ShopEvent::BasketOpen,
        "checkout" => ShopEvent::CheckoutBegin,
        "field" => {
            let (name, value) = rest
                .split_once(char::is_whitespace)
                .map(|(name, value)| (name, value.trim()))
                .unwrap_or((rest, ""));
            if name.is_empty() {
                return Err("field needs a name".to_string());
            }
            let field: BuyerField = name.parse().map_err(|e| format!("{}", e))?;
            ShopEvent::FieldChange {
                field,
                value: value.to_string(),
            }
        }
        "next" => ShopEvent::OrderSubmit,
        "pay" => ShopEvent::ContactsSubmit,
        "close" => ShopEvent::ModalClose,
        "wait" => return Ok(Action::Wait),
        other => return Err(format!("unknown action '{}'", other)),
    };
    Ok(Action::Emit(event))
}

fn product_id(verb: &str, rest: &str) -> Result<ProductId, String> {
    match rest.split_whitespace().collect::<Vec<_>>().as_slice() {
        [id] => Ok(ProductId::new(*id)),
        [] => Err(format!("{} needs a product id", verb)),
        _ => Err(format!("{} takes a single product id", verb)),
    }
}

/// Run the run command.
pub async fn run(args: RunArgs, ctx: &Context) -> Result<()> {
    let text = read_script(&args.script, ctx)?;
    let actions = parse_script(&text).with_context(|| format!("Invalid script: {}", args.script))?;
    debug!(actions = actions.len(), script = %args.script, "script parsed");

    LocalSet::new().run_until(play(actions, &args, ctx)).await
}

fn read_script(script: &str, ctx: &Context) -> Result<String> {
    if script == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read script from stdin")?;
        return Ok(text);
    }

    let path = ctx.resolve_path(script);
    std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read script: {}", path.display()))
}

async fn play(actions: Vec<Action>, args: &RunArgs, ctx: &Context) -> Result<()> {
    let coordinator = open_storefront(ctx, args.catalog.as_deref())?;

    let spinner = ctx.output.spinner("Loading catalog...");
    let loaded = coordinator.load_catalog().await;
    spinner.finish_and_clear();
    let count = loaded.context("Catalog could not be loaded")?;
    if coordinator.is_degraded() {
        ctx.output.warn(&format!("Using fallback catalog ({} products)", count));
    } else {
        ctx.output.debug(&format!("Loaded {} products", count));
    }

    for action in actions {
        match action {
            Action::Emit(event) => {
                ctx.output.debug(&format!("→ {}", event_label(&event)));
                coordinator.session().emit(event);
            }
            Action::BuyPreviewed => match coordinator.session().catalog().preview() {
                Some(product) => {
                    ctx.output.debug(&format!("→ buy {}", product.id));
                    coordinator.session().emit(ShopEvent::BasketAdd { id: product.id });
                }
                None => ctx.output.warn("Nothing is being previewed"),
            },
            Action::Wait => wait_for_submission(&coordinator).await,
        }
    }
    wait_for_submission(&coordinator).await;

    print_summary(&coordinator, ctx);

    if args.expect_success && coordinator.step() != CheckoutStep::Success {
        bail!(
            "Script ended on '{}' instead of the success screen",
            coordinator.step().display_name()
        );
    }
    Ok(())
}

fn event_label(event: &ShopEvent) -> String {
    match event {
        ShopEvent::ItemSelect { id }
        | ShopEvent::BasketAdd { id }
        | ShopEvent::BasketRemove { id } => format!("{} {}", event.name(), id),
        ShopEvent::FieldChange { field, value } => {
            format!("{} {}={}", event.name(), field, value)
        }
        _ => event.name().to_string(),
    }
}

fn print_summary(coordinator: &CheckoutCoordinator, ctx: &Context) {
    let session = coordinator.session();
    let stats = session.bus().stats();

    if ctx.output.is_json() {
        ctx.output.json_line(&serde_json::json!({
            "summary": {
                "step": coordinator.step(),
                "basket": session.cart().count(),
                "total": session.cart().total(),
                "notice": coordinator.notice(),
                "bus": {
                    "emitted": stats.emitted,
                    "delivered": stats.delivered,
                    "dropped": stats.dropped,
                    "max_depth": stats.max_depth,
                },
            }
        }));
        return;
    }

    ctx.output.header("Summary");
    ctx.output.kv("step", &step_badge(coordinator.step()));
    ctx.output.kv("basket", &session.cart().count().to_string());
    ctx.output
        .kv("total", &coordinator.config().amount_label(session.cart().total()));
    if let Some(notice) = coordinator.notice() {
        ctx.output.kv("notice", &notice);
    }
    ctx.output.kv(
        "bus",
        &format!(
            "{} emitted, {} delivered, {} dropped, depth {}",
            stats.emitted, stats.delivered, stats.dropped, stats.max_depth
        ),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_purchase_script() {
        let script = "\
# pick something
select p-1
buy

basket
checkout
field payment card
field address 1 Main St
next
field email me@example.com
pay
wait
";
        let actions = parse_script(script).unwrap();
        assert_eq!(actions.len(), 10);
        assert_eq!(
            actions[0],
            Action::Emit(ShopEvent::ItemSelect {
                id: ProductId::new("p-1")
            })
        );
        assert_eq!(actions[1], Action::BuyPreviewed);
        assert_eq!(actions[2], Action::Emit(ShopEvent::BasketOpen));
        assert_eq!(
            actions[5],
            Action::Emit(ShopEvent::FieldChange {
                field: BuyerField::Address,
                value: "1 Main St".to_string(),
            })
        );
        assert_eq!(actions[8], Action::Emit(ShopEvent::ContactsSubmit));
        assert_eq!(actions[9], Action::Wait);
    }

    #[test]
    fn test_field_without_value_clears() {
        let actions = parse_script("field phone").unwrap();
        assert_eq!(
            actions,
            vec![Action::Emit(ShopEvent::FieldChange {
                field: BuyerField::Phone,
                value: String::new(),
            })]
        );
    }

    #[test]
    fn test_errors_carry_line_numbers() {
        let err = parse_script("basket\n\ndance").unwrap_err();
        assert_eq!(err.line, 3);
        assert_eq!(err.to_string(), "line 3: unknown action 'dance'");

        let err = parse_script("field shoe_size 42").unwrap_err();
        assert_eq!(err.line, 1);

        let err = parse_script("remove").unwrap_err();
        assert_eq!(err.message, "remove needs a product id");

        let err = parse_script("select a b").unwrap_err();
        assert_eq!(err.message, "select takes a single product id");
    }

    #[test]
    fn test_event_label() {
        let event = ShopEvent::BasketAdd {
            id: ProductId::new("p-1"),
        };
        assert_eq!(event_label(&event), format!("{} p-1", event.name()));
        assert_eq!(event_label(&ShopEvent::BasketClear), ShopEvent::BasketClear.name());
    }
}
