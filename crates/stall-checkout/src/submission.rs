//! Single-flight guard for order submission.

use std::cell::Cell;
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use stall_data::OrderRequest;

/// Hash of an order's contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint(u64);

impl Fingerprint {
    pub fn of(order: &OrderRequest) -> Self {
        let mut hasher = DefaultHasher::new();
        order.hash(&mut hasher);
        Self(hasher.finish())
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Allows at most one submission in flight.
#[derive(Debug, Default)]
pub struct SubmissionGuard {
    in_flight: Rc<Cell<Option<Fingerprint>>>,
}

/// Proof that a submission holds the guard. Releases it on drop.
#[derive(Debug)]
#[must_use = "the guard is released as soon as the ticket is dropped"]
pub struct SubmissionTicket {
    slot: Rc<Cell<Option<Fingerprint>>>,
    fingerprint: Fingerprint,
}

impl SubmissionGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the guard for an order.
    ///
    /// Fails with the fingerprint of the submission already in flight.
    pub fn try_acquire(&self, fingerprint: Fingerprint) -> Result<SubmissionTicket, Fingerprint> {
        if let Some(current) = self.in_flight.get() {
            return Err(current);
        }
        self.in_flight.set(Some(fingerprint));
        Ok(SubmissionTicket {
            slot: Rc::clone(&self.in_flight),
            fingerprint,
        })
    }

    /// Fingerprint of the submission in flight.
    pub fn in_flight(&self) -> Option<Fingerprint> {
        self.in_flight.get()
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.get().is_some()
    }
}

impl SubmissionTicket {
    pub fn fingerprint(&self) -> Fingerprint {
        self.fingerprint
    }
}

impl Drop for SubmissionTicket {
    fn drop(&mut self) {
        self.slot.set(None);
    }
}
