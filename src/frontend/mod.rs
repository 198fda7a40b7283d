pub mod diagnostic;
pub mod lexer;
pub mod parser;
pub mod token;
pub mod token_dumper;

pub use diagnostic::{Diagnostic, Diagnostics, Message};
pub use lexer::Lexer;
pub use parser::Parser;
