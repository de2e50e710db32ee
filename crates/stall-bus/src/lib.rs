//! Synchronous publish/subscribe bus.
//!
//! This crate provides:
//! - `EventBus` - single-threaded, re-entrant event dispatch
//! - `Selector` - exact, family, prefix, or catch-all subscriptions
//! - `BusEvent` / `EventKind` - the traits a closed event enum implements
//! - `testing::EventRecorder` - records deliveries with their nesting depth
//!
//! Emission is synchronous: `emit` returns only after every matching handler
//! has run. A handler may emit further events; those are delivered
//! depth-first, before the outer emission moves on to its next handler.

mod bus;
mod selector;
pub mod testing;

pub use bus::*;
pub use selector::*;
