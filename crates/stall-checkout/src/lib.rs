//! Checkout coordination for the storefront core.
//!
//! This crate ties the bus and the models together:
//!
//! - `CheckoutStep` - Browsing, Previewing, CartOpen, OrderForm, ContactsForm, Success
//! - `CheckoutCoordinator` - reacts to intents and model changes, enforces gates
//! - `Render` / `Views` - what the coordinator pushes to the outside world
//! - `AppSession` - the bus and the three models for one session
//! - `SubmissionGuard` - at most one order submission in flight
//!
//! # Example
//!
//! ```rust,ignore
//! use std::rc::Rc;
//! use futures::executor::LocalPool;
//! use stall_checkout::{AppSession, CheckoutCoordinator, SessionConfig, Views};
//!
//! let mut pool = LocalPool::new();
//! let session = Rc::new(AppSession::new());
//! let coordinator = CheckoutCoordinator::attach(
//!     session.clone(),
//!     Rc::new(api),
//!     Rc::new(pool.spawner()),
//!     Views::default(),
//!     SessionConfig::default(),
//! );
//! pool.run_until(coordinator.load_catalog())?;
//! session.emit(ShopEvent::BasketOpen);
//! ```

mod config;
mod coordinator;
mod error;
mod session;
mod step;
mod submission;
mod views;

pub mod testing;

pub use config::SessionConfig;
pub use coordinator::{CheckoutCoordinator, EMPTY_BASKET_MESSAGE};
pub use error::{CheckoutError, CheckoutResult};
pub use session::AppSession;
pub use step::CheckoutStep;
pub use submission::{Fingerprint, SubmissionGuard, SubmissionTicket};
pub use views::*;
