use super::context::Context;
use crate::diagnostic::{Diagnostic, RuntimeErrorKind};
use crate::position::Position;
use std::rc::Rc;

/// A failure during evaluation, before it is attached to a frame.
#[derive(Debug, Clone)]
pub enum RuntimeError {
    IllegalOperation { start: Position, end: Position },
    DivisionByZero { start: Position, end: Position },
    UndefinedVariable { name: Rc<str>, start: Position, end: Position },
    ExtraArguments { count: usize, function: Rc<str>, start: Position, end: Position },
    MissingArguments { count: usize, function: Rc<str>, start: Position, end: Position },
    NoValue { start: Position, end: Position },
}

impl RuntimeError {
    pub fn kind(&self) -> RuntimeErrorKind {
        match self {
            Self::IllegalOperation { .. } => RuntimeErrorKind::IllegalOperation,
            Self::DivisionByZero { .. } => RuntimeErrorKind::ZeroDivision,
            Self::UndefinedVariable { .. } => RuntimeErrorKind::Undefined,
            Self::ExtraArguments { .. } | Self::MissingArguments { .. } => RuntimeErrorKind::ArityMismatch,
            Self::NoValue { .. } => RuntimeErrorKind::NoValue,
        }
    }

    pub fn span(&self) -> (&Position, &Position) {
        match self {
            Self::IllegalOperation { start, end }
            | Self::DivisionByZero { start, end }
            | Self::UndefinedVariable { start, end, .. }
            | Self::ExtraArguments { start, end, .. }
            | Self::MissingArguments { start, end, .. }
            | Self::NoValue { start, end } => (start, end),
        }
    }

    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Attaches the frame the error was raised in.
    pub fn into_diagnostic(self, context: &Rc<Context>) -> Diagnostic {
        let message = self.message();
        let kind = self.kind();
        let (start, end) = self.span();
        Diagnostic::runtime(kind, message, context, start.clone(), end.clone())
    }
}

impl std::fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuntimeError::IllegalOperation { .. } => write!(f, "Illegal operation"),
            RuntimeError::DivisionByZero { .. } => write!(f, "Division By Zero"),
            RuntimeError::UndefinedVariable { name, .. } => write!(f, "{} is not defined", name),
            RuntimeError::ExtraArguments { count, function, .. } => {
                write!(f, "{} extra args passed to '{}'", count, function)
            }
            RuntimeError::MissingArguments { count, function, .. } => {
                write!(f, "{} not enough args passed to '{}'", count, function)
            }
            RuntimeError::NoValue { .. } => write!(f, "expression has no value"),
        }
    }
}

impl std::error::Error for RuntimeError {}
