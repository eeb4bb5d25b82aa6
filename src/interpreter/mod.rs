pub mod context;
pub mod environment;
pub mod error;
pub mod evaluator;
pub mod parser;

pub use context::Context;
pub use environment::SymbolTable;
pub use error::RuntimeError;
pub use evaluator::{evaluate, parse_and_run, Interpreter};
pub use parser::{parse, ParseResult, TokenParser};
