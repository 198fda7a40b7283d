pub mod code;
pub mod disasm;
pub mod label;
pub mod object_file;
pub mod op;
pub mod operand;
pub mod symbols;

pub use code::Code;
pub use object_file::{ObjectFile, ObjectFileError};
pub use op::{CompOp, Op};
pub use symbols::DebugSymbols;
