//! Checkout step state machine.

use serde::{Deserialize, Serialize};
use stall_commerce::events::ShopEventKind;

/// Where the shopper is in the storefront.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutStep {
    /// Catalog visible, no modal open.
    #[default]
    Browsing,
    /// A product preview is open.
    Previewing,
    /// The basket is open.
    CartOpen,
    /// Payment method and address form.
    OrderForm,
    /// Email and phone form.
    ContactsForm,
    /// Order placed.
    Success,
}

impl CheckoutStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckoutStep::Browsing => "browsing",
            CheckoutStep::Previewing => "previewing",
            CheckoutStep::CartOpen => "cart_open",
            CheckoutStep::OrderForm => "order_form",
            CheckoutStep::ContactsForm => "contacts_form",
            CheckoutStep::Success => "success",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            CheckoutStep::Browsing => "Catalog",
            CheckoutStep::Previewing => "Preview",
            CheckoutStep::CartOpen => "Basket",
            CheckoutStep::OrderForm => "Order",
            CheckoutStep::ContactsForm => "Contacts",
            CheckoutStep::Success => "Success",
        }
    }

    /// Check if a modal is shown in this step.
    pub fn is_modal(&self) -> bool {
        *self != CheckoutStep::Browsing
    }

    /// Step an intent leads to, before any gate is checked.
    ///
    /// Intents that edit data without navigating keep the current step.
    /// `None` means the intent is not available in this step.
    pub fn target(self, intent: ShopEventKind) -> Option<CheckoutStep> {
        use CheckoutStep::*;
        use ShopEventKind as K;

        match (self, intent) {
            (Browsing | Previewing, K::ItemSelect) => Some(Previewing),
            (_, K::BasketOpen) => Some(CartOpen),
            (Previewing, K::BasketAdd | K::BasketRemove) => Some(Browsing),
            (step, K::BasketAdd | K::BasketRemove | K::BasketClear | K::FieldChange) => Some(step),
            (CartOpen, K::CheckoutBegin) => Some(OrderForm),
            (OrderForm, K::OrderSubmit) => Some(ContactsForm),
            (ContactsForm, K::ContactsSubmit) => Some(Success),
            (Browsing, K::ModalClose) => None,
            (_, K::ModalClose) => Some(Browsing),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use CheckoutStep::*;

    const ALL_STEPS: [CheckoutStep; 6] =
        [Browsing, Previewing, CartOpen, OrderForm, ContactsForm, Success];

    #[test]
    fn test_happy_path() {
        let mut step = Browsing;
        for intent in [
            ShopEventKind::ItemSelect,
            ShopEventKind::BasketAdd,
            ShopEventKind::BasketOpen,
            ShopEventKind::CheckoutBegin,
            ShopEventKind::OrderSubmit,
            ShopEventKind::ContactsSubmit,
            ShopEventKind::ModalClose,
        ] {
            step = step.target(intent).unwrap();
        }
        assert_eq!(step, Browsing);
    }

    #[test]
    fn test_basket_open_from_anywhere() {
        for step in ALL_STEPS {
            assert_eq!(step.target(ShopEventKind::BasketOpen), Some(CartOpen));
        }
    }

    #[test]
    fn test_forms_are_only_reachable_in_order() {
        for step in ALL_STEPS {
            if step != CartOpen {
                assert_eq!(step.target(ShopEventKind::CheckoutBegin), None);
            }
            if step != OrderForm {
                assert_eq!(step.target(ShopEventKind::OrderSubmit), None);
            }
            if step != ContactsForm {
                assert_eq!(step.target(ShopEventKind::ContactsSubmit), None);
            }
        }
    }

    #[test]
    fn test_modal_close() {
        assert_eq!(Browsing.target(ShopEventKind::ModalClose), None);
        for step in ALL_STEPS.into_iter().filter(|s| s.is_modal()) {
            assert_eq!(step.target(ShopEventKind::ModalClose), Some(Browsing));
        }
    }

    #[test]
    fn test_editing_keeps_step() {
        assert_eq!(ContactsForm.target(ShopEventKind::BasketRemove), Some(ContactsForm));
        assert_eq!(OrderForm.target(ShopEventKind::FieldChange), Some(OrderForm));
        assert_eq!(CartOpen.target(ShopEventKind::BasketClear), Some(CartOpen));
        assert_eq!(Previewing.target(ShopEventKind::BasketAdd), Some(Browsing));
    }

    #[test]
    fn test_change_events_are_not_intents() {
        for step in ALL_STEPS {
            assert_eq!(step.target(ShopEventKind::CartChanged), None);
            assert_eq!(step.target(ShopEventKind::BuyerChanged), None);
        }
    }
}
