//! The closed catalog of storefront bus messages.
//!
//! | Event | Payload | Emitted by |
//! |---|---|---|
//! | `catalog:changed` | `items` | `CatalogModel` |
//! | `preview:changed` | `item` | `CatalogModel` |
//! | `cart:changed` | `items`, `action`, `item?` | `CartModel` |
//! | `buyer:changed` | full `BuyerState` | `BuyerModel` |
//! | `intent:*` | see [`ShopEvent`] | views |

use serde::{Deserialize, Serialize};
use stall_bus::{BusEvent, EventKind};

use crate::buyer::{BuyerField, BuyerState};
use crate::ids::ProductId;
use crate::product::Product;

/// What happened to the cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CartAction {
    Add,
    Remove,
    Clear,
}

impl CartAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            CartAction::Add => "add",
            CartAction::Remove => "remove",
            CartAction::Clear => "clear",
        }
    }
}

/// A storefront bus message: either a model change or a view intent.
#[derive(Debug, Clone, PartialEq)]
pub enum ShopEvent {
    /// The catalog was replaced.
    CatalogChanged { items: Vec<Product> },
    /// A product was selected for preview.
    PreviewChanged { item: Product },
    /// The cart changed; `items` is the full snapshot after the change.
    CartChanged {
        items: Vec<Product>,
        action: CartAction,
        item: Option<Product>,
    },
    /// Buyer fields changed; carries the full current state.
    BuyerChanged(BuyerState),

    /// A catalog card was clicked.
    ItemSelect { id: ProductId },
    /// The basket button was clicked.
    BasketOpen,
    /// "Buy" was clicked in the preview.
    BasketAdd { id: ProductId },
    /// "Remove" was clicked in the preview or basket.
    BasketRemove { id: ProductId },
    /// The user emptied the basket.
    BasketClear,
    /// A checkout form field was edited.
    FieldChange { field: BuyerField, value: String },
    /// "Checkout" was clicked in the basket.
    CheckoutBegin,
    /// "Next" was clicked on the payment/address form.
    OrderSubmit,
    /// "Pay" was clicked on the contacts form.
    ContactsSubmit,
    /// The modal was closed.
    ModalClose,
}

/// Discriminant of [`ShopEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShopEventKind {
    CatalogChanged,
    PreviewChanged,
    CartChanged,
    BuyerChanged,
    ItemSelect,
    BasketOpen,
    BasketAdd,
    BasketRemove,
    BasketClear,
    FieldChange,
    CheckoutBegin,
    OrderSubmit,
    ContactsSubmit,
    ModalClose,
}

/// Groups of related events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventFamily {
    /// `catalog:changed`, `preview:changed`.
    Catalog,
    /// `cart:changed`.
    Cart,
    /// `buyer:changed`.
    Buyer,
    /// Every `intent:*` event.
    Intent,
}

impl ShopEventKind {
    /// Every kind, in table order.
    pub const ALL: [ShopEventKind; 14] = [
        ShopEventKind::CatalogChanged,
        ShopEventKind::PreviewChanged,
        ShopEventKind::CartChanged,
        ShopEventKind::BuyerChanged,
        ShopEventKind::ItemSelect,
        ShopEventKind::BasketOpen,
        ShopEventKind::BasketAdd,
        ShopEventKind::BasketRemove,
        ShopEventKind::BasketClear,
        ShopEventKind::FieldChange,
        ShopEventKind::CheckoutBegin,
        ShopEventKind::OrderSubmit,
        ShopEventKind::ContactsSubmit,
        ShopEventKind::ModalClose,
    ];

    /// Look a kind up by its wire name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }

    /// Check if this kind originates from a view.
    pub fn is_intent(&self) -> bool {
        self.family() == EventFamily::Intent
    }
}

impl EventKind for ShopEventKind {
    type Family = EventFamily;

    fn family(&self) -> EventFamily {
        match self {
            ShopEventKind::CatalogChanged | ShopEventKind::PreviewChanged => EventFamily::Catalog,
            ShopEventKind::CartChanged => EventFamily::Cart,
            ShopEventKind::BuyerChanged => EventFamily::Buyer,
            _ => EventFamily::Intent,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            ShopEventKind::CatalogChanged => "catalog:changed",
            ShopEventKind::PreviewChanged => "preview:changed",
            ShopEventKind::CartChanged => "cart:changed",
            ShopEventKind::BuyerChanged => "buyer:changed",
            ShopEventKind::ItemSelect => "intent:item-select",
            ShopEventKind::BasketOpen => "intent:basket-open",
            ShopEventKind::BasketAdd => "intent:basket-add",
            ShopEventKind::BasketRemove => "intent:basket-remove",
            ShopEventKind::BasketClear => "intent:basket-clear",
            ShopEventKind::FieldChange => "intent:field-change",
            ShopEventKind::CheckoutBegin => "intent:checkout-begin",
            ShopEventKind::OrderSubmit => "intent:order-submit",
            ShopEventKind::ContactsSubmit => "intent:contacts-submit",
            ShopEventKind::ModalClose => "intent:modal-close",
        }
    }
}

impl BusEvent for ShopEvent {
    type Kind = ShopEventKind;

    fn kind(&self) -> ShopEventKind {
        match self {
            ShopEvent::CatalogChanged { .. } => ShopEventKind::CatalogChanged,
            ShopEvent::PreviewChanged { .. } => ShopEventKind::PreviewChanged,
            ShopEvent::CartChanged { .. } => ShopEventKind::CartChanged,
            ShopEvent::BuyerChanged(_) => ShopEventKind::BuyerChanged,
            ShopEvent::ItemSelect { .. } => ShopEventKind::ItemSelect,
            ShopEvent::BasketOpen => ShopEventKind::BasketOpen,
            ShopEvent::BasketAdd { .. } => ShopEventKind::BasketAdd,
            ShopEvent::BasketRemove { .. } => ShopEventKind::BasketRemove,
            ShopEvent::BasketClear => ShopEventKind::BasketClear,
            ShopEvent::FieldChange { .. } => ShopEventKind::FieldChange,
            ShopEvent::CheckoutBegin => ShopEventKind::CheckoutBegin,
            ShopEvent::OrderSubmit => ShopEventKind::OrderSubmit,
            ShopEvent::ContactsSubmit => ShopEventKind::ContactsSubmit,
            ShopEvent::ModalClose => ShopEventKind::ModalClose,
        }
    }
}

impl ShopEvent {
    /// Wire name of this event.
    pub fn name(&self) -> &'static str {
        self.kind().name()
    }
}
