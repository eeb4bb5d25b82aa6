#![allow(dead_code)]

use arrowlang::{Diagnostic, Interpreter, Value};

pub const FILENAME: &str = "test.arw";

/// Runs each line against one interpreter and returns the last result.
pub fn run_lines(lines: &[&str]) -> Result<Option<Value>, Diagnostic> {
    let interpreter = Interpreter::new();
    let mut last = Ok(None);
    for line in lines {
        last = interpreter.run(FILENAME, line);
        if last.is_err() {
            break;
        }
    }
    last
}

pub fn eval(source: &str) -> Value {
    eval_lines(&[source])
}

pub fn eval_lines(lines: &[&str]) -> Value {
    match run_lines(lines) {
        Ok(Some(value)) => value,
        Ok(None) => panic!("Program produced no value: {:?}", lines),
        Err(error) => panic!("Program failed: {:?}\n{}", lines, error),
    }
}

pub fn eval_error(source: &str) -> Diagnostic {
    eval_error_lines(&[source])
}

pub fn eval_error_lines(lines: &[&str]) -> Diagnostic {
    match run_lines(lines) {
        Ok(value) => panic!("Expected an error from {:?}, got {:?}", lines, value),
        Err(error) => error,
    }
}
