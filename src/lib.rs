//! MicroJava: a single-pass compiler to stack-machine bytecode and the
//! virtual machine that runs it.

pub mod bytecode;
pub mod compiler;
pub mod frontend;
pub mod runtime;
pub mod symtab;

pub use compiler::{Compilation, CompileFailure, compile};
