use crate::symtab::obj::ObjId;

/// Handle into the [`TypeArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StructId(usize);

pub const NO_TYPE: StructId = StructId(0);
pub const INT_TYPE: StructId = StructId(1);
pub const CHAR_TYPE: StructId = StructId(2);
/// Class-kind sentinel carried by `null`, assignable to every reference type.
pub const NULL_TYPE: StructId = StructId(3);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StructKind {
    None,
    Int,
    Char,
    Arr(StructId),
    /// Fields in declaration order; filled in once the class body closes.
    Class(Vec<ObjId>),
}

/// Owner of every structural type created during one compilation.
///
/// Types refer to each other (and to their field objects) through handles,
/// so a class holding an array of itself needs no owning cycle.
#[derive(Debug, Clone)]
pub struct TypeArena {
    types: Vec<StructKind>,
}

impl Default for TypeArena {
    fn default() -> Self {
        TypeArena {
            types: vec![
                StructKind::None,
                StructKind::Int,
                StructKind::Char,
                StructKind::Class(Vec::new()),
            ],
        }
    }
}

impl TypeArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kind(&self, id: StructId) -> &StructKind {
        &self.types[id.0]
    }

    pub fn array_of(&mut self, elem: StructId) -> StructId {
        self.push(StructKind::Arr(elem))
    }

    pub fn new_class(&mut self) -> StructId {
        self.push(StructKind::Class(Vec::new()))
    }

    fn push(&mut self, kind: StructKind) -> StructId {
        self.types.push(kind);
        StructId(self.types.len() - 1)
    }

    pub fn set_fields(&mut self, class: StructId, fields: Vec<ObjId>) {
        if let StructKind::Class(slot) = &mut self.types[class.0] {
            *slot = fields;
        }
    }

    pub fn fields(&self, id: StructId) -> &[ObjId] {
        match self.kind(id) {
            StructKind::Class(fields) => fields.as_slice(),
            _ => &[],
        }
    }

    pub fn elem_type(&self, id: StructId) -> Option<StructId> {
        match self.kind(id) {
            StructKind::Arr(elem) => Some(*elem),
            _ => None,
        }
    }

    pub fn is_class(&self, id: StructId) -> bool {
        matches!(self.kind(id), StructKind::Class(_))
    }

    pub fn is_array(&self, id: StructId) -> bool {
        matches!(self.kind(id), StructKind::Arr(_))
    }

    pub fn is_ref_type(&self, id: StructId) -> bool {
        self.is_class(id) || self.is_array(id)
    }

    /// Arrays compare structurally by element type, everything else by identity.
    pub fn equals(&self, a: StructId, b: StructId) -> bool {
        match (self.kind(a), self.kind(b)) {
            (StructKind::Arr(ea), StructKind::Arr(eb)) => self.equals(*ea, *eb),
            _ => a == b,
        }
    }

    pub fn compatible_with(&self, a: StructId, b: StructId) -> bool {
        self.equals(a, b)
            || (a == NULL_TYPE && self.is_ref_type(b))
            || (b == NULL_TYPE && self.is_ref_type(a))
    }

    /// `src` may be stored into a location of type `dst`.
    ///
    /// An array of `NO_TYPE` only occurs as the parameter of the builtin
    /// `len` and accepts any array.
    pub fn assignable_to(&self, src: StructId, dst: StructId) -> bool {
        self.equals(src, dst)
            || (src == NULL_TYPE && self.is_ref_type(dst))
            || (self.is_array(src) && self.elem_type(dst) == Some(NO_TYPE))
    }

    pub fn render(&self, id: StructId) -> String {
        match self.kind(id) {
            StructKind::None => "void".to_string(),
            StructKind::Int => "int".to_string(),
            StructKind::Char => "char".to_string(),
            StructKind::Arr(elem) => format!("{}[]", self.render(*elem)),
            StructKind::Class(fields) => format!("class ({} fields)", fields.len()),
        }
    }
}
