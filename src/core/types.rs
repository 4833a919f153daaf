// ============================================================================
// corral - Type Definitions
// Shared aliases and handles for the event layer
// ============================================================================

use std::rc::Rc;

// =============================================================================
// EVENT NAMES
// =============================================================================

/// Event names are plain owned strings. Lookups take `&str`; storage
/// owns its copy so listener entries are self-contained.
pub type EventName = String;

// =============================================================================
// LISTENER HANDLE
// =============================================================================

/// Opaque handle returned by [`Emitter::on`](crate::events::Emitter::on).
///
/// Handles are unique per emitter and never reused, so a stale handle
/// passed to `off` is a no-op rather than a misfire against a newer
/// listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub(crate) u64);

// =============================================================================
// LISTENER CALLBACKS
// =============================================================================

/// Listener callback stored by an emitter.
///
/// `Rc` rather than `Box` so emission can run against a snapshot of
/// the listener list while the list itself stays borrowable for
/// reentrant `on`/`off` calls.
pub type ListenerFn<P> = Rc<dyn Fn(&P)>;
