//! Product catalog with a single preview slot.

use std::cell::RefCell;

use tracing::debug;

use crate::error::CommerceError;
use crate::events::ShopEvent;
use crate::ids::ProductId;
use crate::product::Product;
use crate::ShopBus;

/// Holds the product list in server order and the previewed product.
///
/// The preview is stored as an id into the list, never as a copy, so it can
/// only ever point at a product the catalog actually holds.
pub struct CatalogModel {
    items: RefCell<Vec<Product>>,
    preview: RefCell<Option<ProductId>>,
    bus: ShopBus,
}

impl CatalogModel {
    /// Create an empty catalog announcing changes on `bus`.
    pub fn new(bus: ShopBus) -> Self {
        Self {
            items: RefCell::new(Vec::new()),
            preview: RefCell::new(None),
            bus,
        }
    }

    /// Replace the whole catalog and emit `catalog:changed`.
    ///
    /// A preview pointing at a product missing from the new list is dropped.
    pub fn set_items(&self, items: Vec<Product>) {
        let stale = match self.preview.borrow().as_ref() {
            Some(id) => !items.iter().any(|p| &p.id == id),
            None => false,
        };
        if stale {
            debug!("previewed product left the catalog");
            *self.preview.borrow_mut() = None;
        }

        debug!(count = items.len(), "catalog replaced");
        *self.items.borrow_mut() = items.clone();
        self.bus.emit(ShopEvent::CatalogChanged { items });
    }

    /// All products in server order.
    pub fn items(&self) -> Vec<Product> {
        self.items.borrow().clone()
    }

    /// Number of products.
    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    /// Check if the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }

    /// Look a product up by id.
    pub fn get_item(&self, id: &ProductId) -> Result<Product, CommerceError> {
        self.items
            .borrow()
            .iter()
            .find(|p| &p.id == id)
            .cloned()
            .ok_or_else(|| CommerceError::ProductNotFound(id.to_string()))
    }

    /// Point the preview at a catalog product and emit `preview:changed`.
    pub fn set_preview(&self, id: &ProductId) -> Result<Product, CommerceError> {
        let product = self.get_item(id)?;
        *self.preview.borrow_mut() = Some(product.id.clone());
        debug!(product_id = %product.id, "preview set");
        self.bus.emit(ShopEvent::PreviewChanged {
            item: product.clone(),
        });
        Ok(product)
    }

    /// The previewed product, if any.
    pub fn preview(&self) -> Option<Product> {
        let preview = self.preview.borrow();
        let id = preview.as_ref()?;
        self.items.borrow().iter().find(|p| &p.id == id).cloned()
    }
}
