//! Catalog and order API contract for the storefront.
//!
//! Transport is out of scope here: this crate defines what the storefront
//! needs from the remote shop service and a local implementation of it.
//!
//! - `ShopApi` - `fetch_catalog` and `submit_order`
//! - `ApiError` - network, malformed response, rejected order
//! - Wire types - `ProductListResponse`, `OrderRequest`, `Receipt`
//! - `FixtureApi` - inline or file-backed catalog for the CLI and tests
//!
//! # Example
//!
//! ```rust,ignore
//! use stall_data::{FixtureApi, ShopApi};
//!
//! let api = FixtureApi::from_path("catalog.json");
//! let items = api.fetch_catalog().await?;
//! ```

mod api;
mod error;
mod fixture;
mod wire;

pub use api::ShopApi;
pub use error::{ApiError, ApiResult};
pub use fixture::FixtureApi;
pub use wire::{parse_catalog, OrderRequest, ProductListResponse, Receipt};
