use std::{cell::RefCell, collections::HashMap, rc::Rc};

use super::object::Object;

/// Scopes are shared between the frame that owns them and every closure
/// created inside. A closure stored in the scope it captured forms an `Rc`
/// cycle and is never freed.
pub type Env = Rc<RefCell<Environment>>;

#[derive(Default, Debug)]
pub struct Environment {
    store: HashMap<String, Object>,
    outer: Option<Env>,
}

impl Environment {
    pub fn new() -> Env {
        Rc::new(RefCell::new(Self::default()))
    }

    pub fn new_enclosed(outer: Env) -> Env {
        Rc::new(RefCell::new(Self {
            store: HashMap::new(),
            outer: Some(outer)
        }))
    }

    /// Looks `name` up here, then in each outer scope in turn.
    pub fn get(&self, name: &str) -> Option<Object> {
        match self.store.get(name) {
            Some(value) => Some(value.clone()),
            None => match &self.outer {
                Some(outer) => outer.borrow().get(name),
                None => None
            }
        }
    }

    /// Always binds in this scope, shadowing outer bindings.
    pub fn set(&mut self, name: impl Into<String>, value: Object) {
        self.store.insert(name.into(), value);
    }
}
