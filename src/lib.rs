// ============================================================================
// corral - An Observable Model Collection for Rust
// ============================================================================
//
// An ordered, identity-keyed collection of externally-owned "model"
// objects for single-threaded UI/state layers. The collection keeps
// the sequence, enforces id/cid uniqueness on add, and forwards
// selected model lifecycle events under the `model:` namespace for
// exactly as long as a model is a member - one subscription per
// (member, event), torn down precisely when the member leaves.
// ============================================================================

pub mod collection;
pub mod core;
pub mod events;
pub mod model;

// Re-export the public surface at the crate root for ergonomic access
// (`crate::` prefix: a module named `core` is otherwise ambiguous with
// the built-in crate in a `use` path)
pub use crate::core::constants::{
    ADD_EVENT, CHANGE_EVENT, DEFAULT_PROPAGATED_EVENTS, MODEL_EVENT_PREFIX, MODEL_RESET_EVENT,
    REMOVE_EVENT, RESET_EVENT, propagated_event_name,
};
pub use crate::core::types::{EventName, ListenerId};

// Re-export the event layer
pub use events::Emitter;

// Re-export the model contract
pub use model::{Model, SharedModel, next_cid};

// Re-export the collection
pub use collection::{Collection, Event};
