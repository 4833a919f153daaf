// ============================================================================
// corral - Model Contract
// The external collaborator a collection holds and observes
// ============================================================================
//
// A collection never constructs or destroys models; it tracks
// references and subscription bookkeeping. Anything satisfying this
// trait can be a member. Violating the contract (unstable cid,
// emitter that drops registrations) is the caller's bug, not a
// handled error.
// ============================================================================

use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde_json::Value;

use crate::events::Emitter;

// =============================================================================
// MODEL TRAIT
// =============================================================================

/// A uniquely-identified, observable record.
///
/// Identity:
/// - `cid` is client-generated at construction, always present,
///   unique within the process, and stable for the model's lifetime.
///   See [`next_cid`].
/// - `id` is the persistent identifier, assigned externally (for
///   example by a backing store). It may be absent until assigned and
///   must be stable once set.
///
/// Notification: a model owns an [`Emitter<()>`] and raises its
/// lifecycle events (`"change"`, `"reset"`, ...) through it. The
/// payload carries no arguments; collections identify the originating
/// model themselves.
///
/// Serialization: [`Model::to_json`] is an optional hook probed per
/// call. When it returns `None`, projections fall back to
/// [`Model::attributes`], a detached snapshot. Both return owned
/// [`Value`] trees, so a projection never aliases live model state.
pub trait Model {
    /// Client identifier. Required, process-unique, stable.
    fn cid(&self) -> String;

    /// Persistent identifier, if one has been assigned yet.
    fn id(&self) -> Option<String> {
        None
    }

    /// The model's notification capability.
    fn events(&self) -> &Emitter<()>;

    /// Optional serialization hook. Models that implement it control
    /// their own JSON projection.
    fn to_json(&self) -> Option<Value> {
        None
    }

    /// Structural snapshot of the model's attribute state, used by
    /// [`Collection::to_json`](crate::Collection::to_json) when
    /// [`Model::to_json`] declines.
    fn attributes(&self) -> Value;
}

/// Shared handle to a model. Collections store these; ownership of the
/// underlying model stays with the caller.
pub type SharedModel = Rc<dyn Model>;

// =============================================================================
// CLIENT ID ALLOCATION
// =============================================================================

static NEXT_CID: AtomicU64 = AtomicU64::new(1);

/// Allocate a process-unique client identifier: `"c1"`, `"c2"`, ...
///
/// Model constructors call this once and keep the result for the
/// model's lifetime.
pub fn next_cid() -> String {
    let n = NEXT_CID.fetch_add(1, Ordering::Relaxed);
    format!("c{n}")
}

// =============================================================================
// TESTS
// =============================================================================
