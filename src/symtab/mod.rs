pub mod dump;
pub mod obj;
pub mod scope;
pub mod structure;

use crate::frontend::diagnostic::Message;
use crate::symtab::obj::{Obj, ObjId, ObjKind};
use crate::symtab::scope::Scope;
use crate::symtab::structure::{CHAR_TYPE, INT_TYPE, NO_TYPE, NULL_TYPE, StructId, TypeArena};

/// Failed symbol-table operations. Each still leaves the table usable:
/// a duplicate carries the freshly created object, lookups fall back to
/// [`Tab::no_obj`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SymbolError {
    #[error("{name} already declared in current scope")]
    Duplicate { name: String, obj: ObjId },
    #[error("{0} not found")]
    NotFound(String),
    #[error("{0} is not a field")]
    FieldNotFound(String),
}

impl From<SymbolError> for Message {
    fn from(err: SymbolError) -> Self {
        match err {
            SymbolError::Duplicate { name, .. } => Message::DuplicateNameInScope(name),
            SymbolError::NotFound(name) => Message::NameNotFound(name),
            SymbolError::FieldNotFound(name) => Message::FieldNotFound(name),
        }
    }
}

/// Scoped symbol table with the predeclared universe.
///
/// Owns every [`Obj`] and every structural type of one compilation; callers
/// hold [`ObjId`]/[`StructId`] handles.
pub struct Tab {
    pub types: TypeArena,
    objs: Vec<Obj>,
    scopes: Vec<Scope>,
    /// Nesting level of the innermost scope. The universe is -1, the
    /// program 0, methods and class bodies 1.
    level: i32,
    pub no_obj: ObjId,
    pub chr_obj: ObjId,
    pub ord_obj: ObjId,
    pub len_obj: ObjId,
}

impl Default for Tab {
    fn default() -> Self {
        Self::new()
    }
}

impl Tab {
    /// Creates the table and populates the universe scope:
    /// `int`, `char`, `null`, `chr(int)`, `ord(char)` and `len(arr)`.
    pub fn new() -> Self {
        let mut tab = Tab {
            types: TypeArena::new(),
            objs: vec![Obj::new(ObjKind::Var, "noObj", NO_TYPE)],
            scopes: Vec::new(),
            level: -2,
            no_obj: ObjId(0),
            chr_obj: ObjId(0),
            ord_obj: ObjId(0),
            len_obj: ObjId(0),
        };

        tab.open_scope();
        tab.bind(ObjKind::Type, "int", INT_TYPE);
        tab.bind(ObjKind::Type, "char", CHAR_TYPE);
        tab.bind(ObjKind::Con, "null", NULL_TYPE);

        tab.chr_obj = tab.builtin("chr", CHAR_TYPE, "i", INT_TYPE);
        tab.ord_obj = tab.builtin("ord", INT_TYPE, "ch", CHAR_TYPE);
        let any_array = tab.types.array_of(NO_TYPE);
        tab.len_obj = tab.builtin("len", INT_TYPE, "arr", any_array);

        tab
    }

    fn builtin(&mut self, name: &str, ty: StructId, param: &str, param_ty: StructId) -> ObjId {
        let meth = self.bind(ObjKind::Meth, name, ty);
        self.open_scope();
        let p = self.bind(ObjKind::Var, param, param_ty);
        self.objs[p.0].level = 1;
        let n_pars = self.cur_n_vars();
        let locals = self.cur_locals();
        let m = self.obj_mut(meth);
        m.n_pars = n_pars;
        m.locals = locals;
        self.close_scope();
        meth
    }

    pub fn open_scope(&mut self) {
        self.scopes.push(Scope::new());
        self.level += 1;
    }

    pub fn close_scope(&mut self) {
        if self.scopes.pop().is_some() {
            self.level -= 1;
        }
    }

    pub fn level(&self) -> i32 {
        self.level
    }

    pub fn obj(&self, id: ObjId) -> &Obj {
        &self.objs[id.0]
    }

    pub fn obj_mut(&mut self, id: ObjId) -> &mut Obj {
        &mut self.objs[id.0]
    }

    pub fn cur_n_vars(&self) -> usize {
        self.scopes.last().map_or(0, Scope::n_vars)
    }

    pub fn cur_locals(&self) -> Vec<ObjId> {
        self.scopes.last().map(Scope::locals).unwrap_or_default()
    }

    fn bind(&mut self, kind: ObjKind, name: &str, ty: StructId) -> ObjId {
        self.bind_checked(kind, name, ty).0
    }

    /// Creates an object in the current scope; returns it together with
    /// whether the name was already bound there.
    fn bind_checked(&mut self, kind: ObjKind, name: &str, ty: StructId) -> (ObjId, bool) {
        let mut obj = Obj::new(kind, name, ty);
        let id = ObjId(self.objs.len());
        let level = self.level;

        let Some(scope) = self.scopes.last_mut() else {
            self.objs.push(obj);
            return (id, false);
        };
        let duplicate = scope.find_local(name).is_some();
        if kind == ObjKind::Var {
            obj.adr = scope.n_vars() as i32;
            obj.level = level;
        }
        scope.insert(name, id, kind == ObjKind::Var);
        self.objs.push(obj);
        (id, duplicate)
    }

    /// Declares `name` in the current scope.
    ///
    /// Variables receive the next free slot of the scope. A name already
    /// bound in this scope is reported, but the new object is still created
    /// (and still consumes a slot) while lookups keep returning the first one.
    pub fn insert(&mut self, kind: ObjKind, name: &str, ty: StructId) -> Result<ObjId, SymbolError> {
        let (obj, duplicate) = self.bind_checked(kind, name, ty);
        if duplicate {
            return Err(SymbolError::Duplicate {
                name: name.to_string(),
                obj,
            });
        }
        tracing::trace!(name, %kind, level = self.level, "declared");
        Ok(obj)
    }

    /// Resolves `name` from the innermost scope outwards.
    pub fn find(&self, name: &str) -> Result<ObjId, SymbolError> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.find_local(name))
            .ok_or_else(|| SymbolError::NotFound(name.to_string()))
    }

    /// Looks `name` up among the fields of `ty`.
    pub fn find_field(&self, name: &str, ty: StructId) -> Result<ObjId, SymbolError> {
        self.types
            .fields(ty)
            .iter()
            .copied()
            .find(|&f| self.obj(f).name == name)
            .ok_or_else(|| SymbolError::FieldNotFound(name.to_string()))
    }
}
