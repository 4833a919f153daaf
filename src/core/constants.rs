// ============================================================================
// corral - Constants
// Event names and the propagation namespace
// ============================================================================

// =============================================================================
// COLLECTION EVENTS
// =============================================================================

/// Raised after a model is successfully appended.
pub const ADD_EVENT: &str = "add";

/// Raised after a model is removed by identifier.
pub const REMOVE_EVENT: &str = "remove";

/// Raised after the whole sequence is replaced.
pub const RESET_EVENT: &str = "reset";

// =============================================================================
// MODEL EVENTS
// =============================================================================

/// A model's "my attributes changed" notification.
pub const CHANGE_EVENT: &str = "change";

/// A model's "my attributes were replaced wholesale" notification.
pub const MODEL_RESET_EVENT: &str = "reset";

/// Model events re-emitted by a collection when no explicit set is
/// given at construction. This constant is the only process-wide
/// default; everything else is constructor input.
pub const DEFAULT_PROPAGATED_EVENTS: &[&str] = &[CHANGE_EVENT, MODEL_RESET_EVENT];

// =============================================================================
// NAMESPACING
// =============================================================================

/// Prefix under which member-model events reappear on the collection.
pub const MODEL_EVENT_PREFIX: &str = "model:";

/// The collection-side name for a propagated model event,
/// e.g. `"change"` -> `"model:change"`.
pub fn propagated_event_name(event: &str) -> String {
    format!("{MODEL_EVENT_PREFIX}{event}")
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_propagated_events() {
        assert_eq!(DEFAULT_PROPAGATED_EVENTS, &["change", "reset"]);
    }

    #[test]
    fn namespacing() {
        assert_eq!(propagated_event_name("change"), "model:change");
        assert_eq!(propagated_event_name("reset"), "model:reset");
    }
}
