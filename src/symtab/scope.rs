use indexmap::IndexMap;

use crate::symtab::obj::ObjId;

/// One level of lexical nesting. The enclosing scope is the previous entry
/// on the [`crate::symtab::Tab`] scope stack.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    locals: IndexMap<String, ObjId>,
    n_vars: usize,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn find_local(&self, name: &str) -> Option<ObjId> {
        self.locals.get(name).copied()
    }

    /// Binds `name` unless it is already bound here; the first binding wins.
    pub fn insert(&mut self, name: &str, obj: ObjId, is_var: bool) {
        if !self.locals.contains_key(name) {
            self.locals.insert(name.to_string(), obj);
        }
        if is_var {
            self.n_vars += 1;
        }
    }

    pub fn n_vars(&self) -> usize {
        self.n_vars
    }

    /// Declarations in insertion order.
    pub fn locals(&self) -> Vec<ObjId> {
        self.locals.values().copied().collect()
    }
}
