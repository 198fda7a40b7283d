use crate::symtab::structure::StructId;

/// Handle into the object arena owned by [`crate::symtab::Tab`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjId(pub(crate) usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjKind {
    Con,
    Var,
    Type,
    Meth,
    Prog,
}

impl std::fmt::Display for ObjKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ObjKind::Con => "Con",
            ObjKind::Var => "Var",
            ObjKind::Type => "Type",
            ObjKind::Meth => "Meth",
            ObjKind::Prog => "Prog",
        };
        f.write_str(name)
    }
}

/// A named declaration.
#[derive(Debug, Clone)]
pub struct Obj {
    pub kind: ObjKind,
    pub name: String,
    pub ty: StructId,
    /// Con: constant value.
    pub val: i32,
    /// Var: slot index. Meth: code address of the entry point.
    pub adr: i32,
    /// Var: 0 for globals, 1 for locals and fields.
    pub level: i32,
    /// Meth: number of formal parameters.
    pub n_pars: usize,
    /// Meth/Prog: declarations of the closed scope, frozen once set.
    pub locals: Vec<ObjId>,
}

impl Obj {
    pub fn new(kind: ObjKind, name: &str, ty: StructId) -> Self {
        Obj {
            kind,
            name: name.to_string(),
            ty,
            val: 0,
            adr: 0,
            level: 0,
            n_pars: 0,
            locals: Vec::new(),
        }
    }
}
