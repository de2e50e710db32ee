//! Test helpers for asserting on bus traffic.

use std::cell::RefCell;
use std::rc::Rc;

use crate::bus::{EventBus, SubscriptionId};
use crate::selector::{BusEvent, Selector};

/// One delivery seen by an [`EventRecorder`].
#[derive(Debug, Clone, PartialEq)]
pub struct Recorded<E> {
    /// The delivered event.
    pub event: E,
    /// Emission nesting at delivery (1 = top-level emit).
    pub depth: usize,
}

/// Subscribes to a bus and keeps a copy of every matching event.
///
/// Unsubscribes itself on drop.
pub struct EventRecorder<E: BusEvent + Clone> {
    bus: EventBus<E>,
    subscription: SubscriptionId,
    records: Rc<RefCell<Vec<Recorded<E>>>>,
}

impl<E: BusEvent + Clone> EventRecorder<E> {
    /// Record every event on the bus.
    pub fn attach(bus: &EventBus<E>) -> Self {
        Self::attach_to(bus, Selector::Any)
    }

    /// Record events matching a selector.
    pub fn attach_to(bus: &EventBus<E>, selector: impl Into<Selector<E::Kind>>) -> Self {
        let records = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&records);
        let weak = bus.downgrade();

        let subscription = bus.subscribe(selector, move |event: &E| {
            let depth = weak.upgrade().map(|bus| bus.depth()).unwrap_or_default();
            sink.borrow_mut().push(Recorded {
                event: event.clone(),
                depth,
            });
        });

        Self {
            bus: bus.clone(),
            subscription,
            records,
        }
    }

    /// All recorded deliveries, oldest first.
    pub fn records(&self) -> Vec<Recorded<E>> {
        self.records.borrow().clone()
    }

    /// All recorded events, oldest first.
    pub fn events(&self) -> Vec<E> {
        self.records.borrow().iter().map(|r| r.event.clone()).collect()
    }

    /// Kinds of the recorded events, oldest first.
    pub fn kinds(&self) -> Vec<E::Kind> {
        self.records.borrow().iter().map(|r| r.event.kind()).collect()
    }

    /// Number of recorded events of a kind.
    pub fn count(&self, kind: E::Kind) -> usize {
        self.records
            .borrow()
            .iter()
            .filter(|r| r.event.kind() == kind)
            .count()
    }

    /// Deepest nesting at which any recorded event was delivered.
    pub fn max_depth(&self) -> usize {
        self.records
            .borrow()
            .iter()
            .map(|r| r.depth)
            .max()
            .unwrap_or_default()
    }

    /// Forget everything recorded so far.
    pub fn clear(&self) {
        self.records.borrow_mut().clear();
    }
}

impl<E: BusEvent + Clone> Drop for EventRecorder<E> {
    fn drop(&mut self) {
        self.bus.unsubscribe(self.subscription);
    }
}
