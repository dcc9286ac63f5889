//! Min/max change notification.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::axis::Axis;
use crate::view::Range;

static LISTENER_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

impl ListenerId {
    fn next() -> Self {
        Self(LISTENER_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

/// Range change delivered to a listener.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinMaxChange {
    /// Axis whose range changed.
    pub axis: Axis,
    /// Range before the call.
    pub previous: Range,
    /// Range after the call.
    pub current: Range,
}

type Callback = Box<dyn FnMut(&MinMaxChange)>;

/// Listeners registered for one axis.
#[derive(Default)]
pub(crate) struct ListenerSet {
    listeners: Vec<(ListenerId, Callback)>,
}

impl ListenerSet {
    pub(crate) fn add(&mut self, listener: impl FnMut(&MinMaxChange) + 'static) -> ListenerId {
        let id = ListenerId::next();
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub(crate) fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    pub(crate) fn clear(&mut self) {
        self.listeners.clear();
    }

    /// Invoke every listener if the range moved.
    pub(crate) fn notify(&mut self, axis: Axis, previous: Range, current: Range) {
        if previous == current {
            return;
        }
        let change = MinMaxChange {
            axis,
            previous,
            current,
        };
        for (_, listener) in &mut self.listeners {
            listener(&change);
        }
    }
}

impl std::fmt::Debug for ListenerSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerSet")
            .field("len", &self.listeners.len())
            .finish()
    }
}
