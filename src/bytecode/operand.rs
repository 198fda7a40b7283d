use crate::bytecode::label::LabelId;
use crate::bytecode::op::CompOp;
use crate::frontend::diagnostic::Message;
use crate::symtab::Tab;
use crate::symtab::obj::{ObjId, ObjKind};
use crate::symtab::structure::{CHAR_TYPE, INT_TYPE, StructId};

/// Where the value an expression denotes currently lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandKind {
    /// Compile-time constant.
    Con(i32),
    /// Method-local slot.
    Local(i32),
    /// Global data slot.
    Static(i32),
    /// Already pushed on the expression stack.
    Stack,
    /// Field at this offset; object reference is on the stack.
    Fld(i32),
    /// Array element; array reference and index are on the stack.
    Elem,
    /// Callable method.
    Meth(ObjId),
    /// Placeholder after an error.
    None,
}

impl OperandKind {
    pub fn name(self) -> &'static str {
        match self {
            OperandKind::Con(_) => "Con",
            OperandKind::Local(_) => "Local",
            OperandKind::Static(_) => "Static",
            OperandKind::Stack => "Stack",
            OperandKind::Fld(_) => "Fld",
            OperandKind::Elem => "Elem",
            OperandKind::Meth(_) => "Meth",
            OperandKind::None => "None",
        }
    }
}

/// Transient description of an expression during code generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operand {
    pub kind: OperandKind,
    pub ty: StructId,
}

impl Operand {
    pub fn int(val: i32) -> Self {
        Operand {
            kind: OperandKind::Con(val),
            ty: INT_TYPE,
        }
    }

    pub fn char_const(val: i32) -> Self {
        Operand {
            kind: OperandKind::Con(val),
            ty: CHAR_TYPE,
        }
    }

    pub fn stack(ty: StructId) -> Self {
        Operand {
            kind: OperandKind::Stack,
            ty,
        }
    }

    /// Operand for a named object. Types and the program itself cannot be
    /// used as values; they yield a `None` operand and an error.
    pub fn from_obj(tab: &Tab, id: ObjId) -> Result<Self, (Self, Message)> {
        let obj = tab.obj(id);
        let kind = match obj.kind {
            ObjKind::Con => OperandKind::Con(obj.val),
            ObjKind::Var if obj.level == 0 => OperandKind::Static(obj.adr),
            ObjKind::Var => OperandKind::Local(obj.adr),
            ObjKind::Meth => OperandKind::Meth(id),
            ObjKind::Type | ObjKind::Prog => {
                let fallback = Operand {
                    kind: OperandKind::None,
                    ty: obj.ty,
                };
                return Err((fallback, Message::IllegalOperandKind(obj.kind.to_string())));
            }
        };
        Ok(Operand { kind, ty: obj.ty })
    }

    pub fn is_read_only(&self) -> bool {
        matches!(
            self.kind,
            OperandKind::Con(_) | OperandKind::Stack | OperandKind::Meth(_) | OperandKind::None
        )
    }
}

/// A boolean condition that exists only as pending conditional jumps.
///
/// Falling through means "true"; `f_label` collects the jumps taken when the
/// condition is false, `t_label` those taken early when it is already true.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cond {
    pub op: CompOp,
    pub t_label: LabelId,
    pub f_label: LabelId,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symtab::structure::NO_TYPE;

    #[test]
    fn test_from_obj_kinds() {
        let mut tab = Tab::new();
        tab.open_scope();
        let g = tab.insert(ObjKind::Var, "g", INT_TYPE).unwrap();
        let k = tab.insert(ObjKind::Con, "k", CHAR_TYPE).unwrap();
        tab.obj_mut(k).val = 'z' as i32;
        tab.open_scope();
        let l = tab.insert(ObjKind::Var, "l", INT_TYPE).unwrap();

        assert_eq!(Operand::from_obj(&tab, g).unwrap().kind, OperandKind::Static(0));
        assert_eq!(Operand::from_obj(&tab, l).unwrap().kind, OperandKind::Local(0));
        assert_eq!(Operand::from_obj(&tab, k).unwrap(), Operand::char_const('z' as i32));
        assert_eq!(
            Operand::from_obj(&tab, tab.len_obj).unwrap().kind,
            OperandKind::Meth(tab.len_obj)
        );
    }

    #[test]
    fn test_type_is_not_a_value() {
        let mut tab = Tab::new();
        tab.open_scope();
        let prog = tab.insert(ObjKind::Prog, "P", NO_TYPE).unwrap();
        let int = tab.find("int").unwrap();

        let (fallback, msg) = Operand::from_obj(&tab, int).unwrap_err();
        assert_eq!(fallback.kind, OperandKind::None);
        assert_eq!(
            msg.to_string(),
            "cannot create operand symbol table object of type Type"
        );
        assert!(Operand::from_obj(&tab, prog).is_err());
    }

    #[test]
    fn test_read_only_kinds() {
        assert!(Operand::int(3).is_read_only());
        assert!(Operand::stack(INT_TYPE).is_read_only());
        let local = Operand {
            kind: OperandKind::Local(1),
            ty: INT_TYPE,
        };
        assert!(!local.is_read_only());
        assert_eq!(OperandKind::Fld(2).name(), "Fld");
    }
}
