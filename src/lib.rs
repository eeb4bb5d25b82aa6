pub mod ast;
pub mod cli;
pub mod config;
pub mod diagnostic;
pub mod interpreter;
pub mod lexer;
pub mod position;
pub mod token;
pub mod value;

pub use diagnostic::{render_diagnostic, Diagnostic, ErrorKind, RuntimeErrorKind};
pub use interpreter::Interpreter;
pub use value::Value;

/// Lexes, parses and evaluates `source` against fresh globals.
///
/// `Ok(None)` means the program ran but produced no value.
pub fn run(filename: &str, source: &str) -> Result<Option<Value>, Diagnostic> {
    interpreter::parse_and_run(filename, source)
}
