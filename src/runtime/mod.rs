pub mod io;
pub mod runtime_error;
pub mod vm;

pub use io::{BufferIo, ConsoleIo, Input, Output};
pub use runtime_error::{RuntimeError, Trap};
pub use vm::{Vm, VmConfig};
