//! Event kinds and subscription selectors.

use std::fmt::Debug;

/// Discriminant of a bus event, used for routing.
pub trait EventKind: Copy + Eq + Debug + 'static {
    /// Group of related kinds a subscriber can listen to as a whole.
    type Family: Copy + Eq + Debug + 'static;

    /// Family this kind belongs to.
    fn family(&self) -> Self::Family;

    /// Stable wire name (e.g. `"cart:changed"`).
    fn name(&self) -> &'static str;
}

/// An event that can travel over an [`EventBus`](crate::EventBus).
///
/// Each variant carries at most one payload.
pub trait BusEvent: Debug + 'static {
    /// Kind enum for this event type.
    type Kind: EventKind;

    /// Kind of this event.
    fn kind(&self) -> Self::Kind;
}

/// Which events a subscription receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selector<K: EventKind> {
    /// Exactly one kind.
    Exact(K),
    /// Every kind in a family.
    Family(K::Family),
    /// Every kind whose name starts with the prefix (e.g. `"intent:"`).
    Prefix(&'static str),
    /// Every event.
    Any,
}

impl<K: EventKind> Selector<K> {
    /// Check whether an event kind matches this selector.
    pub fn matches(&self, kind: K) -> bool {
        match self {
            Self::Exact(k) => *k == kind,
            Self::Family(family) => *family == kind.family(),
            Self::Prefix(prefix) => kind.name().starts_with(prefix),
            Self::Any => true,
        }
    }
}

impl<K: EventKind> From<K> for Selector<K> {
    fn from(kind: K) -> Self {
        Self::Exact(kind)
    }
}
