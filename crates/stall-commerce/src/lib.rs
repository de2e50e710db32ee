//! Storefront domain types and observable models.
//!
//! This crate provides the state side of the storefront:
//!
//! - **Products**: `Product`, `ProductId`, price helpers
//! - **Events**: `ShopEvent`, the closed catalog of bus messages
//! - **Models**: `CatalogModel`, `CartModel`, `BuyerModel`
//! - **Validation**: `BuyerField`, `ValidationErrors`
//!
//! Models own their state behind `RefCell`s and announce every mutation on
//! the shared [`ShopBus`]. No model borrow is held while an event is being
//! emitted, so handlers are free to query any model.
//!
//! # Example
//!
//! ```rust,ignore
//! use stall_commerce::prelude::*;
//!
//! let bus = ShopBus::new();
//! let cart = CartModel::new(bus.clone());
//!
//! bus.subscribe(ShopEventKind::CartChanged, |event| println!("{:?}", event));
//!
//! let product = Product::new("a", "Sticker").with_price(Some(100));
//! cart.add(product.clone());
//! cart.add(product);
//! assert_eq!(cart.count(), 1);
//! ```

pub mod buyer;
pub mod cart;
pub mod catalog;
pub mod error;
pub mod events;
pub mod ids;
pub mod product;

pub use error::CommerceError;
pub use ids::*;
pub use product::Product;

/// Bus type shared by every storefront component.
pub type ShopBus = stall_bus::EventBus<events::ShopEvent>;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::CommerceError;
    pub use crate::ids::*;
    pub use crate::product::Product;
    pub use crate::ShopBus;

    // Events
    pub use crate::events::{CartAction, EventFamily, ShopEvent, ShopEventKind};

    // Models
    pub use crate::buyer::{
        validate, BuyerField, BuyerModel, BuyerPatch, BuyerState, FieldGroup, ValidationErrors,
        PAYMENT_CARD, PAYMENT_CASH,
    };
    pub use crate::cart::CartModel;
    pub use crate::catalog::CatalogModel;
}
