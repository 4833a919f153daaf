// ============================================================================
// corral - Collection
// Ordered, identity-keyed, observable sequence of models
// ============================================================================
//
// The collection holds shared references to externally-owned models,
// rejects duplicate identities on add, and keeps a binding registry so
// that member-model events are re-emitted under the `model:` namespace
// for exactly as long as the model is a member: subscribe-on-add,
// unsubscribe-on-remove, nothing leaked, nothing fired twice.
//
// Single-threaded by design: interior mutability is Cell/RefCell, all
// operations are synchronous, and emission happens after borrows are
// released so listeners may mutate the collection reentrantly (and may
// observe it mid-transition - events are never queued or deferred).
// ============================================================================

use std::cell::RefCell;
use std::ops::Range;
use std::rc::{Rc, Weak};

use serde_json::Value;
use tracing::trace;

use crate::core::constants::{
    ADD_EVENT, DEFAULT_PROPAGATED_EVENTS, REMOVE_EVENT, RESET_EVENT, propagated_event_name,
};
use crate::core::types::{EventName, ListenerId};
use crate::events::Emitter;
use crate::model::{Model, SharedModel};

// =============================================================================
// COLLECTION EVENTS
// =============================================================================

/// Payload delivered to collection listeners.
///
/// The emitter is name-keyed (`"add"`, `"remove"`, `"reset"`,
/// `"model:<name>"`); the payload enum carries the data for the
/// matching event.
#[derive(Clone)]
pub enum Event {
    /// A model was appended.
    Add(SharedModel),
    /// A model was removed by identifier.
    Remove(SharedModel),
    /// The sequence was replaced. `previous` is the sequence as it was
    /// before replacement.
    Reset {
        models: Vec<SharedModel>,
        previous: Vec<SharedModel>,
    },
    /// A member model raised `event`; re-emitted by the collection as
    /// `model:<event>` with the originating model.
    Propagated { event: EventName, model: SharedModel },
}

impl std::fmt::Debug for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Event::Add(model) => f.debug_tuple("Add").field(&model.cid()).finish(),
            Event::Remove(model) => f.debug_tuple("Remove").field(&model.cid()).finish(),
            Event::Reset { models, previous } => f
                .debug_struct("Reset")
                .field("models", &models.len())
                .field("previous", &previous.len())
                .finish(),
            Event::Propagated { event, model } => f
                .debug_struct("Propagated")
                .field("event", event)
                .field("model", &model.cid())
                .finish(),
        }
    }
}

// =============================================================================
// BINDING REGISTRY
// =============================================================================

/// One propagation subscription: the (model, event, listener) triple
/// recorded when a model joins, reversed exactly when it leaves.
struct Binding {
    model: SharedModel,
    event: EventName,
    listener: ListenerId,
}

/// Allocation identity, not id/cid equality: two distinct models may
/// carry equal identifiers without sharing bindings.
fn same_model(a: &SharedModel, b: &SharedModel) -> bool {
    std::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b))
}

/// Per-model key match. `id` is compared before `cid`; the scan over
/// the sequence is in insertion order and the first model matching on
/// either field wins.
fn key_matches(model: &SharedModel, key: &str) -> bool {
    model.id().is_some_and(|id| id == key) || model.cid() == key
}

// =============================================================================
// COLLECTION INNER
// =============================================================================

struct CollectionInner {
    /// The ordered sequence. Insertion order is significant and
    /// preserved by every operation except `reset`.
    models: RefCell<Vec<SharedModel>>,

    /// Model events re-emitted under the `model:` namespace. Fixed at
    /// construction.
    propagated: Vec<EventName>,

    /// Active propagation subscriptions, one per (member, event name).
    bindings: RefCell<Vec<Binding>>,

    /// The collection's own event surface.
    emitter: Emitter<Event>,

    /// Weak self-reference so forwarding closures never keep the
    /// collection alive (set once after Rc creation).
    self_weak: RefCell<Weak<CollectionInner>>,
}

impl CollectionInner {
    /// Subscribe forwarding listeners on `model` for every propagated
    /// event and record the bindings.
    fn start_propagation(&self, model: &SharedModel) {
        let weak_inner = self.self_weak.borrow().clone();
        for event in &self.propagated {
            let forward = {
                let weak_inner = weak_inner.clone();
                let weak_model = Rc::downgrade(model);
                let event = event.clone();
                let namespaced = propagated_event_name(&event);
                move |_: &()| {
                    let Some(inner) = weak_inner.upgrade() else {
                        return;
                    };
                    let Some(model) = weak_model.upgrade() else {
                        return;
                    };
                    inner.emitter.emit(
                        &namespaced,
                        &Event::Propagated {
                            event: event.clone(),
                            model,
                        },
                    );
                }
            };
            let listener = model.events().on(event.clone(), forward);
            trace!(cid = %model.cid(), event = %event, "propagation started");
            self.bindings.borrow_mut().push(Binding {
                model: Rc::clone(model),
                event: event.clone(),
                listener,
            });
        }
    }

    /// Reverse every binding recorded for exactly this model (by
    /// allocation identity). Bindings of other models are untouched.
    fn stop_propagation(&self, model: &SharedModel) {
        let drained: Vec<Binding> = {
            let mut bindings = self.bindings.borrow_mut();
            let (ours, keep) = bindings
                .drain(..)
                .partition(|binding| same_model(&binding.model, model));
            *bindings = keep;
            ours
        };
        for binding in drained {
            binding.model.events().off(binding.listener);
            trace!(cid = %binding.model.cid(), event = %binding.event, "propagation stopped");
        }
    }
}

impl Drop for CollectionInner {
    /// Last handle gone: reverse the remaining bindings so member
    /// models are not left holding dead forwarding listeners.
    fn drop(&mut self) {
        for binding in self.bindings.get_mut().drain(..) {
            binding.model.events().off(binding.listener);
        }
    }
}

// =============================================================================
// COLLECTION
// =============================================================================

/// An ordered, observable collection of [`Model`](crate::Model)s.
///
/// `Collection` is a cheap clonable handle over shared state: clones
/// observe one underlying sequence, registry, and listener list.
///
/// Identity rules: no two members share a `cid`, and no two members
/// share a non-empty `id`. [`Collection::add`] enforces both;
/// [`Collection::reset`] deliberately does not (see its docs).
#[derive(Clone)]
pub struct Collection {
    inner: Rc<CollectionInner>,
}

impl Collection {
    /// Empty collection propagating the default model events
    /// ([`DEFAULT_PROPAGATED_EVENTS`]).
    pub fn new() -> Self {
        Self::with_options(Vec::new(), default_propagated())
    }

    /// Collection seeded with `models`, propagating the default model
    /// events. Subscriptions are established for every initial model,
    /// exactly as if each had been added one at a time.
    pub fn with_models(models: Vec<SharedModel>) -> Self {
        Self::with_options(models, default_propagated())
    }

    /// Collection seeded with `models`, propagating `propagated`
    /// instead of the defaults.
    pub fn with_options(models: Vec<SharedModel>, propagated: Vec<EventName>) -> Self {
        let inner = Rc::new(CollectionInner {
            models: RefCell::new(models),
            propagated,
            bindings: RefCell::new(Vec::new()),
            emitter: Emitter::new(),
            self_weak: RefCell::new(Weak::new()),
        });
        *inner.self_weak.borrow_mut() = Rc::downgrade(&inner);

        let initial = inner.models.borrow().clone();
        for model in &initial {
            inner.start_propagation(model);
        }
        Self { inner }
    }

    // =========================================================================
    // MUTATION
    // =========================================================================

    /// Append `model` to the end of the sequence.
    ///
    /// Rejected (returns `false`, no side effect, no event) when a
    /// member already matches the candidate's `cid`, or when the
    /// candidate carries a non-empty `id` that already matches a
    /// member. Either identity field of a member can produce the
    /// match, because rejection is defined in terms of [`Collection::get`].
    ///
    /// On success: appends, starts event propagation for the model,
    /// emits `"add"` with [`Event::Add`], returns `true`.
    pub fn add(&self, model: SharedModel) -> bool {
        if self.get(&model.cid()).is_some() {
            return false;
        }
        if let Some(id) = model.id() {
            if !id.is_empty() && self.get(&id).is_some() {
                return false;
            }
        }

        self.inner.models.borrow_mut().push(Rc::clone(&model));
        self.inner.start_propagation(&model);
        trace!(cid = %model.cid(), "model added");
        self.inner.emitter.emit(ADD_EVENT, &Event::Add(model));
        true
    }

    /// Remove the first model whose `id` or `cid` equals `key`.
    ///
    /// An empty `key` means "no identifier": `None`, no side effect.
    /// The scan is in insertion order, comparing `id` before `cid`
    /// within each model; the first match on either field wins (so a
    /// model's `id` earlier in the sequence beats a later model's
    /// `cid`). No match: `None`.
    ///
    /// On match: the model is spliced out (remaining order preserved),
    /// exactly its propagation subscriptions are torn down, `"remove"`
    /// is emitted with [`Event::Remove`], and the model is returned.
    pub fn remove(&self, key: &str) -> Option<SharedModel> {
        if key.is_empty() {
            return None;
        }
        let removed = {
            let mut models = self.inner.models.borrow_mut();
            let index = models.iter().position(|model| key_matches(model, key))?;
            models.remove(index)
        };
        self.inner.stop_propagation(&removed);
        trace!(cid = %removed.cid(), "model removed");
        self.inner
            .emitter
            .emit(REMOVE_EVENT, &Event::Remove(Rc::clone(&removed)));
        Some(removed)
    }

    /// Replace the entire sequence with `models` (pass `vec![]` to
    /// clear).
    ///
    /// Every current member's propagation subscriptions are torn down
    /// unconditionally, the new sequence is installed, fresh
    /// subscriptions are established for every incoming model, and
    /// `"reset"` is emitted carrying both the new sequence and the
    /// previous one (captured before replacement).
    ///
    /// Unlike [`Collection::add`], `reset` performs no deduplication:
    /// duplicate ids or cids in `models` are installed verbatim and
    /// are the caller's responsibility.
    pub fn reset(&self, models: Vec<SharedModel>) {
        let previous = self.inner.models.borrow().clone();
        for model in &previous {
            self.inner.stop_propagation(model);
        }
        *self.inner.models.borrow_mut() = models.clone();
        for model in &models {
            self.inner.start_propagation(model);
        }
        trace!(incoming = models.len(), outgoing = previous.len(), "reset");
        self.inner
            .emitter
            .emit(RESET_EVENT, &Event::Reset { models, previous });
    }

    // =========================================================================
    // LOOKUP
    // =========================================================================

    /// First model whose `id` or `cid` equals `key`, or `None`.
    ///
    /// Same matching rules as [`Collection::remove`]: empty `key` is
    /// "no identifier", the scan is in insertion order, `id` is
    /// compared before `cid` within each model, first match wins.
    pub fn get(&self, key: &str) -> Option<SharedModel> {
        if key.is_empty() {
            return None;
        }
        self.inner
            .models
            .borrow()
            .iter()
            .find(|model| key_matches(model, key))
            .cloned()
    }

    /// Model at `index`, or `None` when out of range.
    pub fn at(&self, index: usize) -> Option<SharedModel> {
        self.inner.models.borrow().get(index).cloned()
    }

    /// Live member count, read at call time.
    pub fn len(&self) -> usize {
        self.inner.models.borrow().len()
    }

    /// `true` when the collection holds no models.
    pub fn is_empty(&self) -> bool {
        self.inner.models.borrow().is_empty()
    }

    // =========================================================================
    // JSON PROJECTION
    // =========================================================================

    /// Project every member to a plain value, in sequence order.
    ///
    /// Models exposing a [`to_json`](crate::Model::to_json) hook
    /// control their own projection; the rest contribute their
    /// [`attributes`](crate::Model::attributes) snapshot. Either way
    /// the result owns its structure outright - mutating it never
    /// affects a live model.
    pub fn to_json(&self) -> Vec<Value> {
        self.inner
            .models
            .borrow()
            .iter()
            .map(|model| model.to_json().unwrap_or_else(|| model.attributes()))
            .collect()
    }

    // =========================================================================
    // PASS-THROUGH READS
    // =========================================================================
    //
    // All of these operate on a snapshot of the sequence with standard
    // iterator semantics: order preserved, collection state untouched.
    // Snapshotting also keeps user callbacks free to mutate the
    // collection mid-iteration without poisoning a borrow.

    /// Snapshot of the current sequence.
    pub fn models(&self) -> Vec<SharedModel> {
        self.inner.models.borrow().clone()
    }

    /// Visit each model in order.
    pub fn for_each(&self, mut f: impl FnMut(&SharedModel)) {
        for model in &self.models() {
            f(model);
        }
    }

    /// Transform each model in order.
    pub fn map<R>(&self, f: impl FnMut(&SharedModel) -> R) -> Vec<R> {
        self.models().iter().map(f).collect()
    }

    /// Models satisfying `predicate`, in order.
    pub fn filter(&self, mut predicate: impl FnMut(&SharedModel) -> bool) -> Vec<SharedModel> {
        self.models()
            .into_iter()
            .filter(|model| predicate(model))
            .collect()
    }

    /// Left-to-right reduction.
    pub fn fold<A>(&self, init: A, mut f: impl FnMut(A, &SharedModel) -> A) -> A {
        self.models()
            .iter()
            .fold(init, |acc, model| f(acc, model))
    }

    /// Right-to-left reduction.
    pub fn rfold<A>(&self, init: A, mut f: impl FnMut(A, &SharedModel) -> A) -> A {
        self.models()
            .iter()
            .rfold(init, |acc, model| f(acc, model))
    }

    /// `true` when every model satisfies `predicate` (vacuously `true`
    /// when empty).
    pub fn all(&self, mut predicate: impl FnMut(&SharedModel) -> bool) -> bool {
        self.models().iter().all(|model| predicate(model))
    }

    /// `true` when any model satisfies `predicate`.
    pub fn any(&self, mut predicate: impl FnMut(&SharedModel) -> bool) -> bool {
        self.models().iter().any(|model| predicate(model))
    }

    /// The sequence followed by `others`, as a new vector. The
    /// collection itself is unchanged.
    pub fn concat(&self, others: &[SharedModel]) -> Vec<SharedModel> {
        let mut result = self.models();
        result.extend(others.iter().cloned());
        result
    }

    /// Copy of the sub-range, clamped to the current length.
    pub fn slice(&self, range: Range<usize>) -> Vec<SharedModel> {
        let models = self.inner.models.borrow();
        let start = range.start.min(models.len());
        let end = range.end.clamp(start, models.len());
        models[start..end].to_vec()
    }

    // =========================================================================
    // EVENT SURFACE
    // =========================================================================

    /// Listen for a collection event: `"add"`, `"remove"`, `"reset"`,
    /// or a namespaced `"model:<name>"` for each propagated model
    /// event.
    pub fn on(&self, event: impl Into<EventName>, callback: impl Fn(&Event) + 'static) -> ListenerId {
        self.inner.emitter.on(event, callback)
    }

    /// Remove the listener behind `id`. Returns `false` for unknown
    /// handles.
    pub fn off(&self, id: ListenerId) -> bool {
        self.inner.emitter.off(id)
    }

    /// Listeners currently registered for `event`.
    pub fn listener_count(&self, event: &str) -> usize {
        self.inner.emitter.listener_count(event)
    }
}

impl Default for Collection {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collection")
            .field("len", &self.len())
            .field("propagated", &self.inner.propagated)
            .field("bindings", &self.inner.bindings.borrow().len())
            .finish()
    }
}

fn default_propagated() -> Vec<EventName> {
    DEFAULT_PROPAGATED_EVENTS
        .iter()
        .map(|event| (*event).to_string())
        .collect()
}

// =============================================================================
// TESTS
// =============================================================================
