//! The application session: one bus and the three models.

use stall_commerce::buyer::BuyerModel;
use stall_commerce::cart::CartModel;
use stall_commerce::catalog::CatalogModel;
use stall_commerce::events::ShopEvent;
use stall_commerce::ShopBus;

/// Everything one storefront session owns.
///
/// Built once at startup and shared by handle. Views only talk to the
/// session through [`AppSession::emit`].
pub struct AppSession {
    bus: ShopBus,
    catalog: CatalogModel,
    cart: CartModel,
    buyer: BuyerModel,
}

impl AppSession {
    /// Create a session with an empty catalog, cart and buyer.
    pub fn new() -> Self {
        let bus = ShopBus::new();
        Self {
            catalog: CatalogModel::new(bus.clone()),
            cart: CartModel::new(bus.clone()),
            buyer: BuyerModel::new(bus.clone()),
            bus,
        }
    }

    pub fn bus(&self) -> &ShopBus {
        &self.bus
    }

    pub fn catalog(&self) -> &CatalogModel {
        &self.catalog
    }

    pub fn cart(&self) -> &CartModel {
        &self.cart
    }

    pub fn buyer(&self) -> &BuyerModel {
        &self.buyer
    }

    /// Put an event on the session bus. Returns the number of handlers run.
    pub fn emit(&self, event: ShopEvent) -> usize {
        self.bus.emit(event)
    }
}

impl Default for AppSession {
    fn default() -> Self {
        Self::new()
    }
}
