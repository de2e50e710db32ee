//! Interactive shopping.

use anyhow::{bail, Context as _, Result};
use dialoguer::{Input, Select};
use stall_checkout::{CheckoutCoordinator, CheckoutStep};
use stall_commerce::buyer::{BuyerField, PAYMENT_CARD, PAYMENT_CASH};
use stall_commerce::events::ShopEvent;
use stall_commerce::ProductId;
use tokio::task::LocalSet;
use tracing::debug;

use super::{open_storefront, wait_for_submission, ShopArgs};
use crate::context::Context;

/// An entry in the per-step menu.
#[derive(Debug, Clone, PartialEq, Eq)]
enum MenuChoice {
    Browse,
    OpenBasket,
    Buy(ProductId),
    Remove(ProductId),
    RemoveFromBasket,
    Clear,
    Checkout,
    Edit(BuyerField),
    Next,
    Pay,
    Close,
    Quit,
}

impl MenuChoice {
    fn label(&self) -> String {
        match self {
            MenuChoice::Browse => "Look at a product".to_string(),
            MenuChoice::OpenBasket => "Open basket".to_string(),
            MenuChoice::Buy(_) => "Buy".to_string(),
            MenuChoice::Remove(_) => "Remove from basket".to_string(),
            MenuChoice::RemoveFromBasket => "Remove an item".to_string(),
            MenuChoice::Clear => "Empty basket".to_string(),
            MenuChoice::Checkout => "Checkout".to_string(),
            MenuChoice::Edit(field) => format!("Set {}", field),
            MenuChoice::Next => "Next".to_string(),
            MenuChoice::Pay => "Pay".to_string(),
            MenuChoice::Close => "Close".to_string(),
            MenuChoice::Quit => "Quit".to_string(),
        }
    }
}

/// Menu entries for a step. `previewed` is the product on screen and
/// whether it is already in the basket.
fn menu(step: CheckoutStep, previewed: Option<(ProductId, bool)>) -> Vec<MenuChoice> {
    let mut choices = match step {
        CheckoutStep::Browsing => vec![MenuChoice::Browse, MenuChoice::OpenBasket],
        CheckoutStep::Previewing => {
            let mut choices = Vec::new();
            match previewed {
                Some((id, true)) => choices.push(MenuChoice::Remove(id)),
                Some((id, false)) => choices.push(MenuChoice::Buy(id)),
                None => {}
            }
            choices.extend([MenuChoice::Browse, MenuChoice::OpenBasket, MenuChoice::Close]);
            choices
        }
        CheckoutStep::CartOpen => vec![
            MenuChoice::Checkout,
            MenuChoice::RemoveFromBasket,
            MenuChoice::Clear,
            MenuChoice::Close,
        ],
        CheckoutStep::OrderForm => vec![
            MenuChoice::Edit(BuyerField::Payment),
            MenuChoice::Edit(BuyerField::Address),
            MenuChoice::Next,
            MenuChoice::Close,
        ],
        CheckoutStep::ContactsForm => vec![
            MenuChoice::Edit(BuyerField::Email),
            MenuChoice::Edit(BuyerField::Phone),
            MenuChoice::Pay,
            MenuChoice::Close,
        ],
        CheckoutStep::Success => vec![MenuChoice::Close],
    };
    choices.push(MenuChoice::Quit);
    choices
}

/// Run the shop command.
pub async fn run(args: ShopArgs, ctx: &Context) -> Result<()> {
    if ctx.output.is_json() {
        bail!("Interactive shopping is not available with --json");
    }

    LocalSet::new().run_until(shop(args, ctx)).await
}

async fn shop(args: ShopArgs, ctx: &Context) -> Result<()> {
    let coordinator = open_storefront(ctx, args.catalog.as_deref())?;

    let spinner = ctx.output.spinner("Loading catalog...");
    let loaded = coordinator.load_catalog().await;
    spinner.finish_and_clear();
    loaded.context("Catalog could not be loaded")?;

    loop {
        let step = coordinator.step();
        let session = coordinator.session();
        let previewed = session
            .catalog()
            .preview()
            .map(|product| {
                let in_cart = session.cart().contains(&product.id);
                (product.id, in_cart)
            });
        let choices = menu(step, previewed);
        let labels: Vec<String> = choices.iter().map(MenuChoice::label).collect();

        let selection = Select::new()
            .with_prompt(format!(
                "{} | basket: {}",
                step.display_name(),
                session.cart().count()
            ))
            .items(&labels)
            .default(0)
            .interact()?;

        let choice = &choices[selection];
        if *choice == MenuChoice::Quit {
            break;
        }

        if let Some(event) = intent_for(choice, &coordinator)? {
            debug!(intent = event.name(), "menu choice");
            session.emit(event);
        }
        wait_for_submission(&coordinator).await;
    }

    ctx.output.info(&format!(
        "Leaving with {} item(s) in the basket",
        coordinator.session().cart().count()
    ));
    Ok(())
}

/// Ask for whatever the choice needs and build the intent.
fn intent_for(choice: &MenuChoice, coordinator: &CheckoutCoordinator) -> Result<Option<ShopEvent>> {
    let session = coordinator.session();
    let event = match choice {
        MenuChoice::Browse => {
            let items = session.catalog().items();
            if items.is_empty() {
                return Ok(None);
            }
            let labels: Vec<String> = items
                .iter()
                .map(|p| format!("{}  {}", p.title, coordinator.config().price_label(p.price)))
                .collect();
            let index = Select::new()
                .with_prompt("Product")
                .items(&labels)
                .default(0)
                .interact()?;
            ShopEvent::ItemSelect {
                id: items[index].id.clone(),
            }
        }
        MenuChoice::OpenBasket => ShopEvent::BasketOpen,
        MenuChoice::Buy(id) => ShopEvent::BasketAdd { id: id.clone() },
        MenuChoice::Remove(id) => ShopEvent::BasketRemove { id: id.clone() },
        MenuChoice::RemoveFromBasket => {
            let items = session.cart().items();
            if items.is_empty() {
                return Ok(None);
            }
            let labels: Vec<&str> = items.iter().map(|p| p.title.as_str()).collect();
            let index = Select::new()
                .with_prompt("Remove")
                .items(&labels)
                .default(0)
                .interact()?;
            ShopEvent::BasketRemove {
                id: items[index].id.clone(),
            }
        }
        MenuChoice::Clear => ShopEvent::BasketClear,
        MenuChoice::Checkout => ShopEvent::CheckoutBegin,
        MenuChoice::Edit(BuyerField::Payment) => {
            let methods = [PAYMENT_CARD, PAYMENT_CASH];
            let index = Select::new()
                .with_prompt("Payment")
                .items(&methods)
                .default(0)
                .interact()?;
            ShopEvent::FieldChange {
                field: BuyerField::Payment,
                value: methods[index].to_string(),
            }
        }
        MenuChoice::Edit(field) => {
            let current = session.buyer().state().get(*field).to_string();
            let value: String = Input::new()
                .with_prompt(field.as_str())
                .with_initial_text(current)
                .allow_empty(true)
                .interact_text()?;
            ShopEvent::FieldChange {
                field: *field,
                value,
            }
        }
        MenuChoice::Next => ShopEvent::OrderSubmit,
        MenuChoice::Pay => ShopEvent::ContactsSubmit,
        MenuChoice::Close => ShopEvent::ModalClose,
        MenuChoice::Quit => return Ok(None),
    };
    Ok(Some(event))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_menu_can_quit() {
        let steps = [
            CheckoutStep::Browsing,
            CheckoutStep::Previewing,
            CheckoutStep::CartOpen,
            CheckoutStep::OrderForm,
            CheckoutStep::ContactsForm,
            CheckoutStep::Success,
        ];
        for step in steps {
            assert_eq!(menu(step, None).last(), Some(&MenuChoice::Quit));
        }
    }

    #[test]
    fn test_preview_menu_offers_buy_or_remove() {
        let id = ProductId::new("p-1");

        let choices = menu(CheckoutStep::Previewing, Some((id.clone(), false)));
        assert_eq!(choices[0], MenuChoice::Buy(id.clone()));

        let choices = menu(CheckoutStep::Previewing, Some((id.clone(), true)));
        assert_eq!(choices[0], MenuChoice::Remove(id));
    }

    #[test]
    fn test_form_menus_edit_their_own_fields() {
        let order = menu(CheckoutStep::OrderForm, None);
        assert!(order.contains(&MenuChoice::Edit(BuyerField::Payment)));
        assert!(!order.contains(&MenuChoice::Edit(BuyerField::Email)));

        let contacts = menu(CheckoutStep::ContactsForm, None);
        assert!(contacts.contains(&MenuChoice::Edit(BuyerField::Phone)));
        assert!(contacts.contains(&MenuChoice::Pay));
    }

    #[test]
    fn test_labels() {
        assert_eq!(MenuChoice::Edit(BuyerField::Email).label(), "Set email");
        assert_eq!(MenuChoice::Quit.label(), "Quit");
    }
}
