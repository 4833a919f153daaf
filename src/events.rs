// ============================================================================
// corral - Emitter
// Explicit publish/subscribe with handle-based teardown
// ============================================================================
//
// The emitter is deliberately not a host-runtime event system: ordering
// and reentrancy semantics are fully owned here.
//
// Guarantees:
// - Listeners fire synchronously, in registration order.
// - emit() runs against a snapshot of the listener list taken at call
//   time. Listeners registered during an emission do not see it;
//   listeners removed during an emission that were already snapshotted
//   still run. Nothing is queued or deferred.
// - off() removes exactly the listener named by its handle.
// ============================================================================

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use tracing::trace;

use crate::core::types::{EventName, ListenerFn, ListenerId};

// =============================================================================
// LISTENER ENTRY
// =============================================================================

struct Entry<P> {
    id: ListenerId,
    event: EventName,
    callback: ListenerFn<P>,
}

// =============================================================================
// EMITTER<P>
// =============================================================================

/// A synchronous, name-keyed event emitter with payload type `P`.
///
/// Each holder owns its emitter outright; there is no global event
/// bus. Registration returns a [`ListenerId`] which is the only way to
/// unregister, so teardown is always precise.
///
/// # Example
///
/// ```
/// use corral::Emitter;
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// let emitter: Emitter<i32> = Emitter::new();
/// let seen = Rc::new(Cell::new(0));
///
/// let handle = emitter.on("tick", {
///     let seen = seen.clone();
///     move |n| seen.set(seen.get() + n)
/// });
///
/// emitter.emit("tick", &2);
/// emitter.emit("tock", &100); // different event, not delivered
/// assert_eq!(seen.get(), 2);
///
/// assert!(emitter.off(handle));
/// emitter.emit("tick", &2);
/// assert_eq!(seen.get(), 2);
/// ```
pub struct Emitter<P> {
    entries: RefCell<Vec<Entry<P>>>,
    next_id: Cell<u64>,
}

impl<P> Emitter<P> {
    /// Create an emitter with no listeners.
    pub fn new() -> Self {
        Self {
            entries: RefCell::new(Vec::new()),
            next_id: Cell::new(1),
        }
    }

    /// Register `callback` for `event`.
    ///
    /// Returns a handle unique to this emitter; handles are never
    /// reused, even after removal.
    pub fn on(&self, event: impl Into<EventName>, callback: impl Fn(&P) + 'static) -> ListenerId {
        let id = ListenerId(self.next_id.get());
        self.next_id.set(self.next_id.get() + 1);
        self.entries.borrow_mut().push(Entry {
            id,
            event: event.into(),
            callback: Rc::new(callback),
        });
        id
    }

    /// Unregister the listener behind `id`.
    ///
    /// Returns `false` if the handle is unknown (already removed or
    /// issued by another emitter).
    pub fn off(&self, id: ListenerId) -> bool {
        let mut entries = self.entries.borrow_mut();
        let before = entries.len();
        entries.retain(|entry| entry.id != id);
        entries.len() != before
    }

    /// Synchronously invoke every listener registered for `event`, in
    /// registration order, with `payload`.
    ///
    /// Listener panics are not caught; they propagate to the caller.
    pub fn emit(&self, event: &str, payload: &P) {
        // Snapshot before calling out so listeners may call on()/off()
        // on this emitter without poisoning the borrow.
        let snapshot: Vec<ListenerFn<P>> = self
            .entries
            .borrow()
            .iter()
            .filter(|entry| entry.event == event)
            .map(|entry| Rc::clone(&entry.callback))
            .collect();

        if !snapshot.is_empty() {
            trace!(event, listeners = snapshot.len(), "emit");
        }
        for callback in snapshot {
            callback(payload);
        }
    }

    /// Number of listeners currently registered for `event`.
    pub fn listener_count(&self, event: &str) -> usize {
        self.entries
            .borrow()
            .iter()
            .filter(|entry| entry.event == event)
            .count()
    }

    /// Total number of listeners across all events.
    pub fn total_listeners(&self) -> usize {
        self.entries.borrow().len()
    }
}

impl Emitter<()> {
    /// Payload-free emission, for emitters that only signal "something
    /// happened" (the model-side notification capability).
    pub fn notify(&self, event: &str) {
        self.emit(event, &());
    }
}

impl<P> Default for Emitter<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> std::fmt::Debug for Emitter<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Emitter")
            .field("listeners", &self.entries.borrow().len())
            .finish()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn delivers_to_matching_event_only() {
        let emitter: Emitter<i32> = Emitter::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        let log_a = log.clone();
        emitter.on("a", move |n| log_a.borrow_mut().push(*n));
        let log_b = log.clone();
        emitter.on("b", move |n| log_b.borrow_mut().push(*n * 10));

        emitter.emit("a", &1);
        emitter.emit("b", &2);
        emitter.emit("c", &3);

        assert_eq!(*log.borrow(), vec![1, 20]);
    }

    #[test]
    fn listeners_fire_in_registration_order() {
        let emitter: Emitter<()> = Emitter::new();
        let order = Rc::new(RefCell::new(Vec::new()));

        for tag in ["first", "second", "third"] {
            let order = order.clone();
            emitter.on("go", move |_| order.borrow_mut().push(tag));
        }
        emitter.notify("go");

        assert_eq!(*order.borrow(), vec!["first", "second", "third"]);
    }

    #[test]
    fn off_removes_exactly_one_listener() {
        let emitter: Emitter<()> = Emitter::new();
        let count = Rc::new(Cell::new(0));

        let c1 = count.clone();
        let keep = emitter.on("go", move |_| c1.set(c1.get() + 1));
        let c2 = count.clone();
        let doomed = emitter.on("go", move |_| c2.set(c2.get() + 100));

        assert!(emitter.off(doomed));
        assert!(!emitter.off(doomed), "second off on same handle is a no-op");
        emitter.notify("go");

        assert_eq!(count.get(), 1);
        assert_eq!(emitter.listener_count("go"), 1);
        assert!(emitter.off(keep));
        assert_eq!(emitter.total_listeners(), 0);
    }

    #[test]
    fn listener_added_during_emit_does_not_fire_for_it() {
        let emitter: Rc<Emitter<()>> = Rc::new(Emitter::new());
        let count = Rc::new(Cell::new(0));

        let inner_emitter = emitter.clone();
        let inner_count = count.clone();
        emitter.on("go", move |_| {
            let c = inner_count.clone();
            inner_emitter.on("go", move |_| c.set(c.get() + 1));
        });

        emitter.notify("go");
        assert_eq!(count.get(), 0, "freshly added listener sees later emits only");

        emitter.notify("go");
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn listener_removed_during_emit_still_runs_if_snapshotted() {
        let emitter: Rc<Emitter<()>> = Rc::new(Emitter::new());
        let count = Rc::new(Cell::new(0));

        let handle_cell: Rc<Cell<Option<ListenerId>>> = Rc::new(Cell::new(None));

        let inner_emitter = emitter.clone();
        let inner_handle = handle_cell.clone();
        emitter.on("go", move |_| {
            if let Some(id) = inner_handle.take() {
                inner_emitter.off(id);
            }
        });
        let c = count.clone();
        let second = emitter.on("go", move |_| c.set(c.get() + 1));
        handle_cell.set(Some(second));

        // First listener removes the second mid-emission, but the
        // snapshot was already taken: the second still runs once.
        emitter.notify("go");
        assert_eq!(count.get(), 1);

        emitter.notify("go");
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn handles_are_not_reused() {
        let emitter: Emitter<()> = Emitter::new();
        let first = emitter.on("go", |_| {});
        assert!(emitter.off(first));
        let second = emitter.on("go", |_| {});
        assert_ne!(first, second);
        assert!(!emitter.off(first));
        assert_eq!(emitter.listener_count("go"), 1);
        let _ = second;
    }
}
