use crate::ast::{BinaryOp, Node};
use crate::interpreter::context::Context;
use crate::interpreter::environment::SymbolTable;
use crate::position::Position;
use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;

pub const ANONYMOUS_FUNCTION: &str = "<anonymous>";

/// Largest string a repetition may build.
pub const MAX_STRING_BYTES: usize = 1 << 26;

#[derive(Debug, Clone, Copy)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    pub fn as_f64(self) -> f64 {
        match self {
            Number::Int(value) => value as f64,
            Number::Float(value) => value,
        }
    }

    pub fn is_zero(self) -> bool {
        self.as_f64() == 0.0
    }

    /// Drops any fractional part, the way `and`/`or` results are narrowed.
    pub fn truncate(self) -> Number {
        match self {
            Number::Int(_) => self,
            Number::Float(value) => Number::Int(value.trunc() as i64),
        }
    }

    fn combine(
        self,
        other: Number,
        int_op: fn(i64, i64) -> Option<i64>,
        float_op: fn(f64, f64) -> f64,
    ) -> Number {
        if let (Number::Int(a), Number::Int(b)) = (self, other) {
            if let Some(result) = int_op(a, b) {
                return Number::Int(result);
            }
        }
        Number::Float(float_op(self.as_f64(), other.as_f64()))
    }

    pub fn add(self, other: Number) -> Number {
        self.combine(other, i64::checked_add, |a, b| a + b)
    }

    pub fn sub(self, other: Number) -> Number {
        self.combine(other, i64::checked_sub, |a, b| a - b)
    }

    pub fn mul(self, other: Number) -> Number {
        self.combine(other, i64::checked_mul, |a, b| a * b)
    }

    /// True division; `None` when dividing by zero.
    pub fn div(self, other: Number) -> Option<Number> {
        if other.is_zero() {
            None
        } else {
            Some(Number::Float(self.as_f64() / other.as_f64()))
        }
    }

    pub fn pow(self, other: Number) -> Number {
        self.combine(
            other,
            |base, exp| u32::try_from(exp).ok().and_then(|exp| base.checked_pow(exp)),
            f64::powf,
        )
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => a == b,
            _ => self.as_f64() == other.as_f64(),
        }
    }
}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => a.partial_cmp(b),
            _ => self.as_f64().partial_cmp(&other.as_f64()),
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(value) => write!(f, "{}", value),
            Number::Float(value) if value.is_finite() && value.fract() == 0.0 => {
                write!(f, "{:.1}", value)
            }
            Number::Float(value) => write!(f, "{}", value),
        }
    }
}

/// A user-defined function.
///
/// `scope` is the symbol table the function was defined in and is used only
/// for name resolution; the call-stack frame of an invocation is parented to
/// the caller instead. A function returned out of a call keeps that call's
/// table alive.
pub struct Function {
    pub name: Rc<str>,
    pub params: Vec<Rc<str>>,
    pub body: Rc<Node>,
    pub scope: Rc<SymbolTable>,
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("name", &self.name)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
pub enum ValueKind {
    Number(Number),
    String(Rc<str>),
    Function(Rc<Function>),
}

impl PartialEq for ValueKind {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ValueKind::Number(left), ValueKind::Number(right)) => left == right,
            (ValueKind::String(left), ValueKind::String(right)) => left == right,
            (ValueKind::Function(left), ValueKind::Function(right)) => Rc::ptr_eq(left, right),
            _ => false,
        }
    }
}

/// Why a value operation was refused. The evaluator turns this into a
/// located runtime diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationError {
    Illegal,
    DivisionByZero,
}

/// A runtime value plus the span and frame of the operation that produced it.
/// Cloning is cheap: strings and functions are shared.
#[derive(Debug, Clone)]
pub struct Value {
    pub kind: ValueKind,
    pub start: Option<Position>,
    pub end: Option<Position>,
    pub context: Option<Rc<Context>>,
}

/// Values compare by content only; spans and frames are ignored.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

impl Value {
    pub fn new(kind: ValueKind) -> Self {
        Self {
            kind,
            start: None,
            end: None,
            context: None,
        }
    }

    pub fn number(number: Number) -> Self {
        Self::new(ValueKind::Number(number))
    }

    pub fn int(value: i64) -> Self {
        Self::number(Number::Int(value))
    }

    pub fn float(value: f64) -> Self {
        Self::number(Number::Float(value))
    }

    pub fn string(text: impl Into<Rc<str>>) -> Self {
        Self::new(ValueKind::String(text.into()))
    }

    pub fn function(function: Function) -> Self {
        Self::new(ValueKind::Function(Rc::new(function)))
    }

    pub fn with_span(mut self, start: &Position, end: &Position) -> Self {
        self.start = Some(start.clone());
        self.end = Some(end.clone());
        self
    }

    pub fn with_context(mut self, context: &Rc<Context>) -> Self {
        self.context = Some(Rc::clone(context));
        self
    }

    pub fn as_number(&self) -> Option<Number> {
        match self.kind {
            ValueKind::Number(number) => Some(number),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match &self.kind {
            ValueKind::String(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&Rc<Function>> {
        match &self.kind {
            ValueKind::Function(function) => Some(function),
            _ => None,
        }
    }

    pub fn is_true(&self) -> bool {
        match &self.kind {
            ValueKind::Number(number) => !number.is_zero(),
            ValueKind::String(text) => !text.is_empty(),
            ValueKind::Function(_) => false,
        }
    }

    /// A new value in the same frame as `self`.
    fn derived(&self, kind: ValueKind) -> Value {
        Value {
            kind,
            start: None,
            end: None,
            context: self.context.clone(),
        }
    }

    fn derived_number(&self, number: Number) -> Value {
        self.derived(ValueKind::Number(number))
    }

    fn derived_bool(&self, flag: bool) -> Value {
        self.derived_number(Number::Int(i64::from(flag)))
    }

    pub fn binary(&self, op: BinaryOp, other: &Value) -> Result<Value, OperationError> {
        match (&self.kind, &other.kind) {
            (ValueKind::Number(left), ValueKind::Number(right)) => {
                self.number_binary(op, *left, *right)
            }
            (ValueKind::String(left), ValueKind::String(right)) if op == BinaryOp::Add => {
                Ok(self.derived(ValueKind::String(format!("{}{}", left, right).into())))
            }
            (ValueKind::String(text), ValueKind::Number(Number::Int(count))) if op == BinaryOp::Mul => {
                let count = usize::try_from(*count).unwrap_or(0);
                match text.len().checked_mul(count) {
                    Some(size) if size <= MAX_STRING_BYTES => {
                        Ok(self.derived(ValueKind::String(text.repeat(count).into())))
                    }
                    _ => Err(OperationError::Illegal),
                }
            }
            _ => Err(OperationError::Illegal),
        }
    }

    fn number_binary(&self, op: BinaryOp, left: Number, right: Number) -> Result<Value, OperationError> {
        let value = match op {
            BinaryOp::Add => self.derived_number(left.add(right)),
            BinaryOp::Sub => self.derived_number(left.sub(right)),
            BinaryOp::Mul => self.derived_number(left.mul(right)),
            BinaryOp::Div => {
                let quotient = left.div(right).ok_or(OperationError::DivisionByZero)?;
                self.derived_number(quotient)
            }
            BinaryOp::Pow => self.derived_number(left.pow(right)),
            BinaryOp::Eq => self.derived_bool(left == right),
            BinaryOp::NotEq => self.derived_bool(left != right),
            BinaryOp::Less => self.derived_bool(left < right),
            BinaryOp::Greater => self.derived_bool(left > right),
            BinaryOp::LessEq => self.derived_bool(left <= right),
            BinaryOp::GreaterEq => self.derived_bool(left >= right),
            BinaryOp::And => {
                let chosen = if left.is_zero() { left } else { right };
                self.derived_number(chosen.truncate())
            }
            BinaryOp::Or => {
                let chosen = if left.is_zero() { right } else { left };
                self.derived_number(chosen.truncate())
            }
        };
        Ok(value)
    }

    pub fn not(&self) -> Result<Value, OperationError> {
        match self.kind {
            ValueKind::Number(number) => Ok(self.derived_bool(number.is_zero())),
            _ => Err(OperationError::Illegal),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ValueKind::Number(number) => write!(f, "{}", number),
            ValueKind::String(text) => write!(f, "\"{}\"", text),
            ValueKind::Function(function) => write!(f, "<function {}>", function.name),
        }
    }
}
