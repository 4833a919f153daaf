// ============================================================================
// corral - Test Harness Model
// A conforming collaborator for integration tests
// ============================================================================

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use corral::{Emitter, Model, next_cid};
use serde_json::{Map, Value};

/// A mutable, observable record: string-keyed attributes, a
/// process-unique cid, an optionally-assigned persistent id, and the
/// standard "change"/"reset" notifications.
pub struct Record {
    cid: String,
    id: RefCell<Option<String>>,
    attributes: RefCell<Map<String, Value>>,
    events: Emitter<()>,
}

impl Record {
    pub fn new(id: Option<&str>) -> Rc<Self> {
        Self::with_attributes(id, Map::new())
    }

    pub fn with_attributes(id: Option<&str>, attributes: Map<String, Value>) -> Rc<Self> {
        Rc::new(Self {
            cid: next_cid(),
            id: RefCell::new(id.map(str::to_string)),
            attributes: RefCell::new(attributes),
            events: Emitter::new(),
        })
    }

    /// Set one attribute and raise "change".
    pub fn set(&self, key: &str, value: Value) {
        self.attributes.borrow_mut().insert(key.to_string(), value);
        self.events.notify("change");
    }

    /// Drop all attributes and raise "reset".
    pub fn clear(&self) {
        self.attributes.borrow_mut().clear();
        self.events.notify("reset");
    }

    /// Late id assignment, as a backing store would do after a save.
    pub fn assign_id(&self, id: &str) {
        *self.id.borrow_mut() = Some(id.to_string());
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.attributes.borrow().get(key).cloned()
    }
}

impl Model for Record {
    fn cid(&self) -> String {
        self.cid.clone()
    }

    fn id(&self) -> Option<String> {
        self.id.borrow().clone()
    }

    fn events(&self) -> &Emitter<()> {
        &self.events
    }

    fn attributes(&self) -> Value {
        Value::Object(self.attributes.borrow().clone())
    }
}
