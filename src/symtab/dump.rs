//! Human-readable listing of declarations, used by `mj compile --dump-symbols`
//! and by tests that inspect the table after a compilation.

use crate::symtab::Tab;
use crate::symtab::obj::{ObjId, ObjKind};
use crate::symtab::structure::{CHAR_TYPE, StructKind};

impl Tab {
    /// Renders `obj` and, recursively, its locals or class fields.
    pub fn dump(&self, obj: ObjId) -> String {
        let mut out = String::new();
        self.dump_obj(obj, "", &mut out);
        out
    }

    fn dump_obj(&self, id: ObjId, indent: &str, out: &mut String) {
        let obj = self.obj(id);
        let ty = self.types.render(obj.ty);
        out.push_str(indent);

        match obj.kind {
            ObjKind::Prog => out.push_str(&format!("Program {}:", obj.name)),
            ObjKind::Con if obj.ty == CHAR_TYPE => {
                let ch = char::from_u32(obj.val as u32).unwrap_or('?');
                out.push_str(&format!("Constant: {} {} = '{}'", ty, obj.name, ch));
            }
            ObjKind::Con => out.push_str(&format!("Constant: {} {} = {}", ty, obj.name, obj.val)),
            ObjKind::Var if obj.level == 0 => {
                out.push_str(&format!("Global Variable {}: {} {}", obj.adr, ty, obj.name))
            }
            ObjKind::Var => {
                out.push_str(&format!("Local Variable {}: {} {}", obj.adr, ty, obj.name))
            }
            ObjKind::Type => out.push_str(&format!("Type {}: {}", obj.name, ty)),
            ObjKind::Meth => out.push_str(&format!(
                "Method: {} {} ({} locals, {} parameters)",
                ty,
                obj.name,
                obj.locals.len(),
                obj.n_pars
            )),
        }
        out.push('\n');

        let nested = format!("{}  ", indent);
        match obj.kind {
            ObjKind::Prog | ObjKind::Meth => {
                for &local in &obj.locals {
                    self.dump_obj(local, &nested, out);
                }
            }
            ObjKind::Type => {
                if let StructKind::Class(fields) = self.types.kind(obj.ty) {
                    for &field in fields {
                        self.dump_obj(field, &nested, out);
                    }
                }
            }
            ObjKind::Con | ObjKind::Var => {}
        }
    }
}
