//! Event bus and subscription bookkeeping.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::{error, trace};

use crate::selector::{BusEvent, EventKind, Selector};

/// Maximum nesting of re-entrant emissions before events are dropped.
pub const MAX_EMIT_DEPTH: usize = 32;

/// Handle returned by [`EventBus::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// Delivery counters for a bus.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BusStats {
    /// Events accepted for delivery (including those nobody listened to).
    pub emitted: u64,
    /// Handler invocations.
    pub delivered: u64,
    /// Events dropped because the nesting limit was reached.
    pub dropped: u64,
    /// Deepest emission nesting observed (1 = top-level emit).
    pub max_depth: usize,
}

type Handler<E> = Rc<dyn Fn(&E)>;

struct Subscription<E: BusEvent> {
    id: SubscriptionId,
    selector: Selector<E::Kind>,
    handler: Handler<E>,
}

struct BusInner<E: BusEvent> {
    subscriptions: RefCell<Vec<Subscription<E>>>,
    next_id: Cell<u64>,
    depth: Cell<usize>,
    stats: Cell<BusStats>,
}

/// Single-threaded publish/subscribe bus.
///
/// Cloning is cheap and yields a handle to the same bus. Handlers are
/// invoked in subscription order. The set of handlers is snapshotted when an
/// emission starts, so subscribing or unsubscribing from inside a handler
/// only affects later emissions.
pub struct EventBus<E: BusEvent> {
    inner: Rc<BusInner<E>>,
}

/// Non-owning handle to an [`EventBus`].
pub struct WeakEventBus<E: BusEvent> {
    inner: Weak<BusInner<E>>,
}

impl<E: BusEvent> EventBus<E> {
    /// Create an empty bus.
    pub fn new() -> Self {
        Self {
            inner: Rc::new(BusInner {
                subscriptions: RefCell::new(Vec::new()),
                next_id: Cell::new(1),
                depth: Cell::new(0),
                stats: Cell::new(BusStats::default()),
            }),
        }
    }

    /// Register a handler for every event matching `selector`.
    pub fn subscribe<S, F>(&self, selector: S, handler: F) -> SubscriptionId
    where
        S: Into<Selector<E::Kind>>,
        F: Fn(&E) + 'static,
    {
        let id = SubscriptionId(self.inner.next_id.get());
        self.inner.next_id.set(id.0 + 1);

        let selector = selector.into();
        trace!(subscription = %id, ?selector, "subscribed");

        self.inner.subscriptions.borrow_mut().push(Subscription {
            id,
            selector,
            handler: Rc::new(handler),
        });
        id
    }

    /// Remove a registration. Returns `false` if it was already gone.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscriptions = self.inner.subscriptions.borrow_mut();
        let len_before = subscriptions.len();
        subscriptions.retain(|s| s.id != id);
        let removed = subscriptions.len() < len_before;
        if removed {
            trace!(subscription = %id, "unsubscribed");
        }
        removed
    }

    /// Deliver an event to every matching handler and return how many ran.
    ///
    /// Emitting with no subscribers is a no-op. Emissions nested deeper than
    /// [`MAX_EMIT_DEPTH`] are dropped and counted in [`BusStats::dropped`].
    pub fn emit(&self, event: E) -> usize {
        let kind = event.kind();
        let depth = self.inner.depth.get();

        if depth >= MAX_EMIT_DEPTH {
            error!(
                event = kind.name(),
                depth, "re-entrant emission limit reached, dropping event"
            );
            self.update_stats(|stats| stats.dropped += 1);
            return 0;
        }

        // Release the registry borrow before any handler runs so handlers
        // can subscribe, unsubscribe, or emit.
        let handlers: Vec<Handler<E>> = self
            .inner
            .subscriptions
            .borrow()
            .iter()
            .filter(|s| s.selector.matches(kind))
            .map(|s| Rc::clone(&s.handler))
            .collect();

        self.update_stats(|stats| {
            stats.emitted += 1;
            stats.max_depth = stats.max_depth.max(depth + 1);
        });

        if handlers.is_empty() {
            trace!(event = kind.name(), "no subscribers");
            return 0;
        }

        trace!(event = kind.name(), depth, handlers = handlers.len(), "emit");

        self.inner.depth.set(depth + 1);
        let _restore = DepthGuard {
            depth: &self.inner.depth,
            restore: depth,
        };

        for handler in &handlers {
            handler(&event);
        }

        let delivered = handlers.len();
        self.update_stats(|stats| stats.delivered += delivered as u64);
        delivered
    }

    /// Current emission nesting (0 outside any handler).
    pub fn depth(&self) -> usize {
        self.inner.depth.get()
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.inner.subscriptions.borrow().len()
    }

    /// Check whether any subscription would receive an event of this kind.
    pub fn has_subscribers(&self, kind: E::Kind) -> bool {
        self.inner
            .subscriptions
            .borrow()
            .iter()
            .any(|s| s.selector.matches(kind))
    }

    /// Snapshot of the delivery counters.
    pub fn stats(&self) -> BusStats {
        self.inner.stats.get()
    }

    /// Create a non-owning handle, for handlers that need to reach the bus
    /// without keeping it alive.
    pub fn downgrade(&self) -> WeakEventBus<E> {
        WeakEventBus {
            inner: Rc::downgrade(&self.inner),
        }
    }

    fn update_stats(&self, f: impl FnOnce(&mut BusStats)) {
        let mut stats = self.inner.stats.get();
        f(&mut stats);
        self.inner.stats.set(stats);
    }
}

impl<E: BusEvent> WeakEventBus<E> {
    /// Upgrade to a strong handle if the bus is still alive.
    pub fn upgrade(&self) -> Option<EventBus<E>> {
        self.inner.upgrade().map(|inner| EventBus { inner })
    }
}

impl<E: BusEvent> Clone for EventBus<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<E: BusEvent> Clone for WeakEventBus<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Weak::clone(&self.inner),
        }
    }
}

impl<E: BusEvent> Default for EventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: BusEvent> fmt::Debug for EventBus<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscriber_count())
            .field("depth", &self.depth())
            .field("stats", &self.stats())
            .finish()
    }
}

/// Restores the nesting counter even if a handler panics.
struct DepthGuard<'a> {
    depth: &'a Cell<usize>,
    restore: usize,
}

impl Drop for DepthGuard<'_> {
    fn drop(&mut self) {
        self.depth.set(self.restore);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Kind {
        Ping,
        Pong,
        Note,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Family {
        Game,
        Log,
    }

    impl EventKind for Kind {
        type Family = Family;

        fn family(&self) -> Family {
            match self {
                Kind::Ping | Kind::Pong => Family::Game,
                Kind::Note => Family::Log,
            }
        }

        fn name(&self) -> &'static str {
            match self {
                Kind::Ping => "game:ping",
                Kind::Pong => "game:pong",
                Kind::Note => "log:note",
            }
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    enum Event {
        Ping(u32),
        Pong(u32),
        Note(&'static str),
    }

    impl BusEvent for Event {
        type Kind = Kind;

        fn kind(&self) -> Kind {
            match self {
                Event::Ping(_) => Kind::Ping,
                Event::Pong(_) => Kind::Pong,
                Event::Note(_) => Kind::Note,
            }
        }
    }

    fn log() -> Rc<RefCell<Vec<String>>> {
        Rc::new(RefCell::new(Vec::new()))
    }

    #[test]
    fn test_emit_without_subscribers_is_noop() {
        let bus: EventBus<Event> = EventBus::new();
        assert_eq!(bus.emit(Event::Ping(1)), 0);
        assert_eq!(bus.stats().emitted, 1);
        assert_eq!(bus.stats().delivered, 0);
    }

    #[test]
    fn test_handlers_run_in_subscription_order() {
        let bus: EventBus<Event> = EventBus::new();
        let seen = log();

        for name in ["first", "second", "third"] {
            let seen = Rc::clone(&seen);
            bus.subscribe(Kind::Ping, move |_| seen.borrow_mut().push(name.to_string()));
        }

        assert_eq!(bus.emit(Event::Ping(1)), 3);
        assert_eq!(*seen.borrow(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_exact_and_family_selectors() {
        let bus: EventBus<Event> = EventBus::new();
        let seen = log();

        let exact = Rc::clone(&seen);
        bus.subscribe(Kind::Pong, move |e| exact.borrow_mut().push(format!("exact {:?}", e)));
        let family = Rc::clone(&seen);
        bus.subscribe(Selector::<Kind>::Family(Family::Game), move |e| {
            family.borrow_mut().push(format!("family {:?}", e))
        });

        bus.emit(Event::Ping(1));
        bus.emit(Event::Pong(2));
        bus.emit(Event::Note("ignored"));

        assert_eq!(
            *seen.borrow(),
            vec!["family Ping(1)", "exact Pong(2)", "family Pong(2)"]
        );
    }

    #[test]
    fn test_unsubscribe() {
        let bus: EventBus<Event> = EventBus::new();
        let seen = log();

        let sink = Rc::clone(&seen);
        let id = bus.subscribe(Selector::<Kind>::Any, move |e| sink.borrow_mut().push(format!("{:?}", e)));

        bus.emit(Event::Note("one"));
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        bus.emit(Event::Note("two"));

        assert_eq!(*seen.borrow(), vec!["Note(\"one\")"]);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_reentrant_emission_is_depth_first() {
        let bus: EventBus<Event> = EventBus::new();
        let seen = log();

        // Ping handler #1 answers with a Pong before Ping handler #2 runs.
        let weak = bus.downgrade();
        let first = Rc::clone(&seen);
        bus.subscribe(Kind::Ping, move |e| {
            first.borrow_mut().push(format!("ping-1 {:?}", e));
            if let (Event::Ping(n), Some(bus)) = (e, weak.upgrade()) {
                bus.emit(Event::Pong(*n));
            }
        });
        let second = Rc::clone(&seen);
        bus.subscribe(Kind::Ping, move |e| second.borrow_mut().push(format!("ping-2 {:?}", e)));
        let pong = Rc::clone(&seen);
        bus.subscribe(Kind::Pong, move |e| pong.borrow_mut().push(format!("pong {:?}", e)));

        bus.emit(Event::Ping(7));

        assert_eq!(
            *seen.borrow(),
            vec!["ping-1 Ping(7)", "pong Pong(7)", "ping-2 Ping(7)"]
        );
        assert_eq!(bus.stats().max_depth, 2);
        assert_eq!(bus.depth(), 0);
    }

    #[test]
    fn test_subscribe_during_emission_affects_next_emission_only() {
        let bus: EventBus<Event> = EventBus::new();
        let seen = log();

        let weak = bus.downgrade();
        let sink = Rc::clone(&seen);
        bus.subscribe(Kind::Note, move |_| {
            if let Some(bus) = weak.upgrade() {
                let late = Rc::clone(&sink);
                bus.subscribe(Kind::Note, move |_| late.borrow_mut().push("late".to_string()));
            }
        });

        assert_eq!(bus.emit(Event::Note("a")), 1);
        assert!(seen.borrow().is_empty());
        assert_eq!(bus.emit(Event::Note("b")), 2);
        assert_eq!(*seen.borrow(), vec!["late"]);
    }

    #[test]
    fn test_runaway_reentrancy_is_cut_off() {
        let bus: EventBus<Event> = EventBus::new();

        let weak = bus.downgrade();
        bus.subscribe(Kind::Ping, move |e| {
            if let (Event::Ping(n), Some(bus)) = (e, weak.upgrade()) {
                bus.emit(Event::Ping(n + 1));
            }
        });

        bus.emit(Event::Ping(0));

        let stats = bus.stats();
        assert_eq!(stats.max_depth, MAX_EMIT_DEPTH);
        assert_eq!(stats.dropped, 1);
        assert_eq!(bus.depth(), 0);
    }

    #[test]
    fn test_has_subscribers() {
        let bus: EventBus<Event> = EventBus::new();
        bus.subscribe(Selector::<Kind>::Prefix("game:"), |_| {});
        assert!(bus.has_subscribers(Kind::Pong));
        assert!(!bus.has_subscribers(Kind::Note));
    }
}
