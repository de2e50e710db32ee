//! Shopping cart model.

use std::cell::RefCell;

use tracing::debug;

use crate::events::{CartAction, ShopEvent};
use crate::ids::ProductId;
use crate::product::{total_price, Product};
use crate::ShopBus;

/// The basket: a set of products keyed by id, in insertion order.
///
/// Every mutation emits `cart:changed` with the full snapshot after the
/// change plus the delta, so views can either diff or redraw.
pub struct CartModel {
    items: RefCell<Vec<Product>>,
    bus: ShopBus,
}

impl CartModel {
    /// Create an empty cart announcing changes on `bus`.
    pub fn new(bus: ShopBus) -> Self {
        Self {
            items: RefCell::new(Vec::new()),
            bus,
        }
    }

    /// Add a product to the cart.
    ///
    /// Adding a product whose id is already present is a no-op and emits
    /// nothing. Returns whether the cart changed.
    pub fn add(&self, product: Product) -> bool {
        let items = {
            let mut items = self.items.borrow_mut();
            if items.iter().any(|p| p.id == product.id) {
                debug!(product_id = %product.id, "already in cart");
                return false;
            }
            items.push(product.clone());
            items.clone()
        };

        debug!(product_id = %product.id, count = items.len(), "added to cart");
        self.bus.emit(ShopEvent::CartChanged {
            items,
            action: CartAction::Add,
            item: Some(product),
        });
        true
    }

    /// Remove a product from the cart.
    ///
    /// Removing an absent product is a no-op. Returns whether the cart changed.
    pub fn remove(&self, id: &ProductId) -> bool {
        let (removed, items) = {
            let mut items = self.items.borrow_mut();
            let Some(index) = items.iter().position(|p| &p.id == id) else {
                debug!(product_id = %id, "not in cart");
                return false;
            };
            let removed = items.remove(index);
            (removed, items.clone())
        };

        debug!(product_id = %id, count = items.len(), "removed from cart");
        self.bus.emit(ShopEvent::CartChanged {
            items,
            action: CartAction::Remove,
            item: Some(removed),
        });
        true
    }

    /// Empty the cart. Always emits `cart:changed`.
    pub fn clear(&self) {
        self.items.borrow_mut().clear();
        debug!("cart cleared");
        self.bus.emit(ShopEvent::CartChanged {
            items: Vec::new(),
            action: CartAction::Clear,
            item: None,
        });
    }

    /// Check if a product is in the cart.
    pub fn contains(&self, id: &ProductId) -> bool {
        self.items.borrow().iter().any(|p| &p.id == id)
    }

    /// Number of products in the cart.
    pub fn count(&self) -> usize {
        self.items.borrow().len()
    }

    /// Check if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }

    /// Sum of item prices; products without a price count as zero.
    pub fn total(&self) -> u64 {
        total_price(self.items.borrow().iter())
    }

    /// Snapshot of the items in insertion order.
    pub fn items(&self) -> Vec<Product> {
        self.items.borrow().clone()
    }

    /// Ids of the items in insertion order.
    pub fn item_ids(&self) -> Vec<ProductId> {
        self.items.borrow().iter().map(|p| p.id.clone()).collect()
    }
}
