use crate::value::{Number, Value};
use indexmap::IndexMap;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Name to value bindings for one scope.
///
/// Lookups fall through to the parent table; writes always land in this
/// table. The parent link is never used to mutate the parent.
pub struct SymbolTable {
    bindings: RefCell<IndexMap<Rc<str>, Value>>,
    parent: Option<Rc<SymbolTable>>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self {
            bindings: RefCell::new(IndexMap::new()),
            parent: None,
        }
    }

    pub fn with_parent(parent: Rc<SymbolTable>) -> Self {
        Self {
            bindings: RefCell::new(IndexMap::new()),
            parent: Some(parent),
        }
    }

    /// The global table, seeded with `nil`, `false` and `true`.
    pub fn global() -> Self {
        let table = Self::new();
        table.set("nil", Value::number(Number::Int(0)));
        table.set("false", Value::number(Number::Int(0)));
        table.set("true", Value::number(Number::Int(1)));
        table
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.bindings.borrow().get(name) {
            return Some(value.clone());
        }

        match &self.parent {
            Some(parent) => parent.get(name),
            None => None,
        }
    }

    pub fn set(&self, name: impl Into<Rc<str>>, value: Value) {
        self.bindings.borrow_mut().insert(name.into(), value);
    }

    pub fn remove(&self, name: &str) -> Option<Value> {
        self.bindings.borrow_mut().shift_remove(name)
    }

    pub fn contains_local(&self, name: &str) -> bool {
        self.bindings.borrow().contains_key(name)
    }

    /// Drops every local binding.
    pub fn clear(&self) {
        self.bindings.borrow_mut().clear();
    }

    /// Whether `scope` is this table or one of its ancestors.
    pub fn is_within(&self, scope: &Rc<SymbolTable>) -> bool {
        if std::ptr::eq(self, Rc::as_ptr(scope)) {
            return true;
        }
        self.parent.as_ref().is_some_and(|parent| parent.is_within(scope))
    }

    /// Local names in definition order.
    pub fn names(&self) -> Vec<Rc<str>> {
        self.bindings.borrow().keys().cloned().collect()
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

// Bindings may hold functions that point back at this table.
impl fmt::Debug for SymbolTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SymbolTable")
            .field("names", &self.names())
            .field("has_parent", &self.parent.is_some())
            .finish()
    }
}
