//! View capability and the data pushed into views.
//!
//! Views never read models. The coordinator builds one of the plain structs
//! below and hands it to the matching [`Render`] implementation.

use std::fmt;
use std::rc::Rc;

use serde::Serialize;
use stall_commerce::buyer::{BuyerField, FieldGroup};
use stall_commerce::{Product, ProductId};

use crate::config::SessionConfig;
use crate::step::CheckoutStep;

/// Something that can display a `D`.
pub trait Render<D> {
    fn render(&self, data: &D);
}

/// A view that ignores everything it is given.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopView;

impl<D> Render<D> for NoopView {
    fn render(&self, _data: &D) {}
}

/// A product as shown on a catalog card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardData {
    pub id: ProductId,
    pub title: String,
    pub category: String,
    pub image_url: String,
    pub price_label: String,
}

impl CardData {
    pub fn new(product: &Product, config: &SessionConfig) -> Self {
        Self {
            id: product.id.clone(),
            title: product.title.clone(),
            category: product.category.clone(),
            image_url: config.image_url(&product.image),
            price_label: config.price_label(product.price),
        }
    }
}

/// The catalog grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GalleryData {
    pub cards: Vec<CardData>,
    /// The cards come from the fallback catalog.
    pub degraded: bool,
    /// Why the catalog could not be loaded.
    pub error: Option<String>,
}

/// What the preview button does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PreviewAction {
    Buy,
    Remove,
    Unavailable,
}

impl PreviewAction {
    pub fn label(&self) -> &'static str {
        match self {
            PreviewAction::Buy => "Buy",
            PreviewAction::Remove => "Remove",
            PreviewAction::Unavailable => "Unavailable",
        }
    }

    /// Check if the button is clickable.
    pub fn is_enabled(&self) -> bool {
        *self != PreviewAction::Unavailable
    }
}

impl fmt::Display for PreviewAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The product preview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreviewData {
    pub card: CardData,
    pub description: String,
    pub in_cart: bool,
    pub action: PreviewAction,
}

impl PreviewData {
    pub fn new(product: &Product, in_cart: bool, config: &SessionConfig) -> Self {
        let action = if in_cart {
            PreviewAction::Remove
        } else if product.is_for_sale() {
            PreviewAction::Buy
        } else {
            PreviewAction::Unavailable
        };
        Self {
            card: CardData::new(product, config),
            description: product.description.clone(),
            in_cart,
            action,
        }
    }
}

/// One row of the basket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BasketLine {
    /// Position in the basket, starting at 1.
    pub index: usize,
    pub id: ProductId,
    pub title: String,
    pub price_label: String,
}

/// The basket contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BasketData {
    pub lines: Vec<BasketLine>,
    pub total: u64,
    pub total_label: String,
    pub checkout_enabled: bool,
}

impl BasketData {
    pub fn new(items: &[Product], total: u64, config: &SessionConfig) -> Self {
        let lines = items
            .iter()
            .enumerate()
            .map(|(i, product)| BasketLine {
                index: i + 1,
                id: product.id.clone(),
                title: product.title.clone(),
                price_label: config.price_label(product.price),
            })
            .collect::<Vec<_>>();
        Self {
            checkout_enabled: !lines.is_empty(),
            lines,
            total,
            total_label: config.amount_label(total),
        }
    }
}

/// The page header basket counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HeaderData {
    pub count: usize,
}

/// One of the two checkout forms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormData {
    pub group: FieldGroup,
    /// Current values of the fields this form owns.
    pub values: Vec<(BuyerField, String)>,
    /// Every owned field is valid.
    pub valid: bool,
    /// Owned field messages joined with ", ".
    pub errors: String,
    /// Submission outcome message, contacts form only.
    pub notice: Option<String>,
    /// An order submission is in flight.
    pub submitting: bool,
}

impl FormData {
    /// Value of an owned field.
    pub fn value(&self, field: BuyerField) -> Option<&str> {
        self.values
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, v)| v.as_str())
    }
}

/// The order confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuccessData {
    pub total: u64,
    pub message: String,
}

impl SuccessData {
    pub fn new(total: u64, config: &SessionConfig) -> Self {
        Self {
            total,
            message: format!("Charged {}", config.amount_label(total)),
        }
    }
}

/// Which modal content is open. `Browsing` means the modal is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ModalData {
    pub step: CheckoutStep,
}

impl ModalData {
    pub fn is_open(&self) -> bool {
        self.step.is_modal()
    }
}

/// The set of views a coordinator pushes into.
#[derive(Clone)]
pub struct Views {
    pub gallery: Rc<dyn Render<GalleryData>>,
    pub preview: Rc<dyn Render<PreviewData>>,
    pub basket: Rc<dyn Render<BasketData>>,
    pub header: Rc<dyn Render<HeaderData>>,
    pub order_form: Rc<dyn Render<FormData>>,
    pub contacts_form: Rc<dyn Render<FormData>>,
    pub success: Rc<dyn Render<SuccessData>>,
    pub modal: Rc<dyn Render<ModalData>>,
}

impl Default for Views {
    fn default() -> Self {
        let noop = Rc::new(NoopView);
        Self {
            gallery: noop.clone(),
            preview: noop.clone(),
            basket: noop.clone(),
            header: noop.clone(),
            order_form: noop.clone(),
            contacts_form: noop.clone(),
            success: noop.clone(),
            modal: noop,
        }
    }
}

impl Views {
    /// Form view for a field group.
    pub fn form(&self, group: FieldGroup) -> &Rc<dyn Render<FormData>> {
        match group {
            FieldGroup::Order => &self.order_form,
            FieldGroup::Contacts => &self.contacts_form,
        }
    }
}

impl fmt::Debug for Views {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Views").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_action() {
        let config = SessionConfig::default();
        let sellable = Product::new("a", "Alpha").with_price(Some(100));
        let priceless = Product::new("b", "Beta");

        assert_eq!(PreviewData::new(&sellable, false, &config).action, PreviewAction::Buy);
        assert_eq!(PreviewData::new(&sellable, true, &config).action, PreviewAction::Remove);

        let preview = PreviewData::new(&priceless, false, &config);
        assert_eq!(preview.action.label(), "Unavailable");
        assert!(!preview.action.is_enabled());
        assert_eq!(preview.card.price_label, "Priceless");
    }

    #[test]
    fn test_basket_numbering() {
        let config = SessionConfig::default();
        let items = vec![
            Product::new("a", "Alpha").with_price(Some(100)),
            Product::new("b", "Beta"),
        ];
        let basket = BasketData::new(&items, 100, &config);

        let indices: Vec<usize> = basket.lines.iter().map(|l| l.index).collect();
        assert_eq!(indices, vec![1, 2]);
        assert_eq!(basket.total_label, "100 synapses");
        assert!(basket.checkout_enabled);

        let empty = BasketData::new(&[], 0, &config);
        assert!(!empty.checkout_enabled);
    }

    #[test]
    fn test_success_message() {
        let success = SuccessData::new(2600, &SessionConfig::default());
        assert_eq!(success.message, "Charged 2600 synapses");
    }
}
