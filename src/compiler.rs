use crate::bytecode::object_file::ObjectFile;
use crate::bytecode::symbols::DebugSymbols;
use crate::frontend::diagnostic::Diagnostics;
use crate::frontend::parser::Parser;
use crate::symtab::Tab;
use crate::symtab::obj::{ObjId, ObjKind};

/// Everything a successful compilation produces.
#[derive(Debug, Clone)]
pub struct Compilation {
    pub object: ObjectFile,
    pub symbols: DebugSymbols,
    /// Declarations of the program, as rendered by [`Tab::dump`].
    pub symbol_dump: String,
}

/// A compilation that recorded at least one diagnostic.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{} errors detected", .diagnostics.len())]
pub struct CompileFailure {
    pub diagnostics: Diagnostics,
}

/// Compiles MicroJava source into an object file.
///
/// No object file is produced if any diagnostic was recorded, lexical ones
/// included.
pub fn compile(source: &str) -> Result<Compilation, CompileFailure> {
    tracing::info!(bytes = source.len(), "compiling");
    let mut parser = Parser::new(source);
    parser.parse();

    if !parser.diagnostics.is_empty() {
        tracing::info!(errors = parser.diagnostics.len(), "compilation failed");
        return Err(CompileFailure {
            diagnostics: parser.diagnostics,
        });
    }

    let (symbols, symbol_dump) = match parser.program_obj() {
        Some(prog) => (debug_symbols(&parser.tab, prog), parser.tab.dump(prog)),
        None => (DebugSymbols::default(), String::new()),
    };
    let object = parser.code.into_object_file();
    tracing::info!(
        code = object.code.len(),
        data = object.data_size,
        main = object.main_pc,
        "no errors"
    );

    Ok(Compilation {
        object,
        symbols,
        symbol_dump,
    })
}

fn debug_symbols(tab: &Tab, prog: ObjId) -> DebugSymbols {
    let program = tab.obj(prog);
    let mut symbols = DebugSymbols {
        program: program.name.clone(),
        ..DebugSymbols::default()
    };

    let mut globals: Vec<(i32, String)> = Vec::new();
    for &id in &program.locals {
        let obj = tab.obj(id);
        match obj.kind {
            ObjKind::Meth => symbols.methods.push((obj.name.clone(), obj.adr)),
            ObjKind::Var => globals.push((obj.adr, obj.name.clone())),
            _ => {}
        }
    }
    globals.sort_by_key(|(adr, _)| *adr);
    symbols.globals = globals.into_iter().map(|(_, name)| name).collect();
    symbols
}
