use super::context::Context;
use super::environment::SymbolTable;
use super::error::RuntimeError;
use super::parser::parse;
use crate::ast::{BinaryOp, Node, NodeKind, UnaryOp};
use crate::diagnostic::Diagnostic;
use crate::lexer::tokenize;
use crate::value::{Function, Number, OperationError, Value, ANONYMOUS_FUNCTION};
use log::{debug, trace};
use std::rc::Rc;

/// Holds the global `<program>` frame. Every `run` evaluates against the
/// same globals, so definitions persist from one run to the next.
pub struct Interpreter {
    global: Rc<Context>,
}

impl Interpreter {
    pub fn new() -> Self {
        Self {
            global: Context::root(Rc::new(SymbolTable::global())),
        }
    }

    /// Lexes, parses and evaluates `source`, stopping at the first error.
    pub fn run(&self, filename: &str, source: &str) -> Result<Option<Value>, Diagnostic> {
        let (tokens, error) = tokenize(filename, source);
        if let Some(error) = error {
            debug!("lexing {} failed: {}", filename, error.message);
            return Err(error);
        }
        debug!("lexed {} tokens from {}", tokens.len(), filename);

        let node = parse(tokens).into_result()?;
        debug!("parsed {}", node);

        let result = evaluate(&node, &self.global)?;
        match &result {
            Some(value) => debug!("evaluated to {}", value),
            None => debug!("evaluated to no value"),
        }
        Ok(result)
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

// Stored values point back at the root frame, which owns the globals.
impl Drop for Interpreter {
    fn drop(&mut self) {
        self.global.symbols.clear();
    }
}

/// Runs `source` once against fresh globals.
pub fn parse_and_run(filename: &str, source: &str) -> Result<Option<Value>, Diagnostic> {
    Interpreter::new().run(filename, source)
}

/// Evaluates `node` in `context`. `Ok(None)` means the node produced no
/// value: loops, and an `if` where no branch matched.
pub fn evaluate(node: &Node, context: &Rc<Context>) -> Result<Option<Value>, Diagnostic> {
    match &node.kind {
        NodeKind::Number(number) => Ok(Some(stamp(Value::number(*number), node, context))),
        NodeKind::String(text) => Ok(Some(stamp(Value::string(Rc::clone(text)), node, context))),
        NodeKind::BinaryOp { left, op, right } => eval_binary(node, left, *op, right, context).map(Some),
        NodeKind::UnaryOp { op, operand } => eval_unary(node, *op, operand, context).map(Some),
        NodeKind::VarAccess(name) => match context.symbols.get(name) {
            Some(value) => Ok(Some(stamp(value, node, context))),
            None => Err(RuntimeError::UndefinedVariable {
                name: Rc::clone(name),
                start: node.start.clone(),
                end: node.end.clone(),
            }
            .into_diagnostic(context)),
        },
        NodeKind::VarAssign { name, value } => {
            let value = value_of(value, context)?;
            context.symbols.set(Rc::clone(name), value.clone());
            Ok(Some(value))
        }
        NodeKind::If { cases, else_case } => {
            for (condition, branch) in cases {
                if value_of(condition, context)?.is_true() {
                    return evaluate(branch, context);
                }
            }
            match else_case {
                Some(branch) => evaluate(branch, context),
                None => Ok(None),
            }
        }
        NodeKind::For {
            var,
            from,
            to,
            step,
            body,
        } => {
            eval_for(node, var, from, to, step.as_deref(), body, context)?;
            Ok(None)
        }
        NodeKind::While { condition, body } => {
            let mut iterations = 0usize;
            while value_of(condition, context)?.is_true() {
                evaluate(body, context)?;
                iterations += 1;
            }
            trace!("while loop ran {} iterations", iterations);
            Ok(None)
        }
        NodeKind::FuncDef { name, params, body } => {
            let function = Function {
                name: name.clone().unwrap_or_else(|| Rc::from(ANONYMOUS_FUNCTION)),
                params: params.clone(),
                body: Rc::clone(body),
                scope: Rc::clone(&context.symbols),
            };
            let value = stamp(Value::function(function), node, context);
            if let Some(name) = name {
                context.symbols.set(Rc::clone(name), value.clone());
            }
            Ok(Some(value))
        }
        NodeKind::Call { callee, args } => {
            let callee = stamp(value_of(callee, context)?, node, context);

            let mut values = Vec::with_capacity(args.len());
            for arg in args {
                values.push(value_of(arg, context)?);
            }

            call_function(node, &callee, values, context)
        }
    }
}

fn stamp(value: Value, node: &Node, context: &Rc<Context>) -> Value {
    value.with_span(&node.start, &node.end).with_context(context)
}

/// Like `evaluate`, for positions where a value is required.
fn value_of(node: &Node, context: &Rc<Context>) -> Result<Value, Diagnostic> {
    match evaluate(node, context)? {
        Some(value) => Ok(value),
        None => Err(RuntimeError::NoValue {
            start: node.start.clone(),
            end: node.end.clone(),
        }
        .into_diagnostic(context)),
    }
}

fn number_of(node: &Node, context: &Rc<Context>) -> Result<Number, Diagnostic> {
    match value_of(node, context)?.as_number() {
        Some(number) => Ok(number),
        None => Err(illegal_operation(node, context)),
    }
}

fn illegal_operation(node: &Node, context: &Rc<Context>) -> Diagnostic {
    RuntimeError::IllegalOperation {
        start: node.start.clone(),
        end: node.end.clone(),
    }
    .into_diagnostic(context)
}

fn eval_binary(node: &Node, left: &Node, op: BinaryOp, right: &Node, context: &Rc<Context>) -> Result<Value, Diagnostic> {
    let lhs = value_of(left, context)?;
    let rhs = value_of(right, context)?;

    match lhs.binary(op, &rhs) {
        Ok(value) => Ok(stamp(value, node, context)),
        Err(OperationError::DivisionByZero) => Err(RuntimeError::DivisionByZero {
            start: right.start.clone(),
            end: right.end.clone(),
        }
        .into_diagnostic(context)),
        Err(OperationError::Illegal) => Err(illegal_operation(node, context)),
    }
}

fn eval_unary(node: &Node, op: UnaryOp, operand: &Node, context: &Rc<Context>) -> Result<Value, Diagnostic> {
    let value = value_of(operand, context)?;

    let result = match op {
        UnaryOp::Plus => Ok(value),
        UnaryOp::Neg => value.binary(BinaryOp::Mul, &Value::int(-1)),
        UnaryOp::Not => value.not(),
    };

    match result {
        Ok(value) => Ok(stamp(value, node, context)),
        Err(_) => Err(illegal_operation(node, context)),
    }
}

// The loop variable lives in the enclosing scope and keeps its last value.
fn eval_for(
    node: &Node,
    var: &Rc<str>,
    from: &Node,
    to: &Node,
    step: Option<&Node>,
    body: &Node,
    context: &Rc<Context>,
) -> Result<(), Diagnostic> {
    let mut index = number_of(from, context)?;
    let end = number_of(to, context)?;
    let step = match step {
        Some(step) => number_of(step, context)?,
        None => Number::Int(1),
    };

    let ascending = step >= Number::Int(0);
    let in_range = |index: Number| if ascending { index < end } else { index > end };
    let mut iterations = 0usize;

    while in_range(index) {
        context
            .symbols
            .set(Rc::clone(var), stamp(Value::number(index), node, context));
        index = index.add(step);

        evaluate(body, context)?;
        iterations += 1;
    }

    trace!("for loop over '{}' ran {} iterations", var, iterations);
    Ok(())
}

/// Invokes `callee` with already evaluated arguments.
///
/// The new frame is parented to the caller for the traceback, while its
/// symbol table is parented to the scope the function was defined in.
pub fn call_function(
    node: &Node,
    callee: &Value,
    args: Vec<Value>,
    context: &Rc<Context>,
) -> Result<Option<Value>, Diagnostic> {
    let Some(function) = callee.as_function() else {
        return Err(illegal_operation(node, context));
    };

    let expected = function.params.len();
    if args.len() > expected {
        return Err(RuntimeError::ExtraArguments {
            count: args.len() - expected,
            function: Rc::clone(&function.name),
            start: node.start.clone(),
            end: node.end.clone(),
        }
        .into_diagnostic(context));
    }
    if args.len() < expected {
        return Err(RuntimeError::MissingArguments {
            count: expected - args.len(),
            function: Rc::clone(&function.name),
            start: node.start.clone(),
            end: node.end.clone(),
        }
        .into_diagnostic(context));
    }

    let symbols = Rc::new(SymbolTable::with_parent(Rc::clone(&function.scope)));
    let frame = Context::call(Rc::clone(&function.name), context, node.start.clone(), symbols);
    trace!("calling '{}' at depth {}", function.name, frame.depth());

    for (param, arg) in function.params.iter().zip(args) {
        frame.symbols.set(Rc::clone(param), arg.with_context(&frame));
    }

    let result = evaluate(&function.body, &frame);
    release_frame(&frame, &result);
    result
}

/// Empties a finished call's table unless a closure defined during the call
/// is being returned.
///
/// Values stored in the table point back at the frame that owns it, so the
/// table would otherwise outlive the call.
fn release_frame(frame: &Rc<Context>, result: &Result<Option<Value>, Diagnostic>) {
    let escapes = matches!(
        result,
        Ok(Some(value)) if value.as_function().is_some_and(|f| f.scope.is_within(&frame.symbols))
    );

    if escapes {
        trace!("keeping scope of '{}' alive for a returned closure", frame.label);
    } else {
        frame.symbols.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::{ErrorKind, RuntimeErrorKind};

    fn eval(source: &str) -> Option<Value> {
        match parse_and_run("test", source) {
            Ok(value) => value,
            Err(error) => panic!("Evaluation failed: {}", error),
        }
    }

    fn eval_all(interpreter: &Interpreter, lines: &[&str]) -> Result<Option<Value>, Diagnostic> {
        let mut last = Ok(None);
        for line in lines {
            last = interpreter.run("test", line);
            if last.is_err() {
                break;
            }
        }
        last
    }

    fn eval_error(source: &str) -> Diagnostic {
        match parse_and_run("test", source) {
            Ok(value) => panic!("Expected an error, got {:?}", value),
            Err(error) => error,
        }
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(eval("1 + 2"), Some(Value::int(3)));
        assert_eq!(eval("2 * (3 + 4) - 1"), Some(Value::int(13)));
        assert_eq!(eval("7 / 2"), Some(Value::float(3.5)));
        assert_eq!(eval("-2 ^ 2"), Some(Value::int(-4)));
        assert_eq!(eval("+5"), Some(Value::int(5)));
    }

    #[test]
    fn test_strings() {
        assert_eq!(eval("\"a\" + \"b\""), Some(Value::string("ab")));
        assert_eq!(eval("\"ab\" * 2"), Some(Value::string("abab")));
    }

    #[test]
    fn test_illegal_operation() {
        let error = eval_error("1 + \"b\"");
        assert_eq!(error.runtime_kind(), Some(RuntimeErrorKind::IllegalOperation));
        assert_eq!(error.message, "Illegal operation");
        assert_eq!((error.start.column, error.end.column), (0, 7));

        assert_eq!(eval_error("not \"x\"").message, "Illegal operation");
        assert_eq!(eval_error("1()").message, "Illegal operation");
    }

    #[test]
    fn test_division_by_zero_points_at_divisor() {
        let error = eval_error("5 / 0");
        assert_eq!(error.kind, ErrorKind::Runtime(RuntimeErrorKind::ZeroDivision));
        assert_eq!(error.message, "Division By Zero");
        assert_eq!((error.start.column, error.end.column), (4, 5));
    }

    #[test]
    fn test_variables() {
        let interpreter = Interpreter::new();
        assert_eq!(eval_all(&interpreter, &["set x = 10", "x"]).unwrap(), Some(Value::int(10)));
        assert_eq!(eval("set a = set b = 2"), Some(Value::int(2)));
        assert_eq!(eval("true + true"), Some(Value::int(2)));

        let error = eval_error("missing");
        assert_eq!(error.message, "missing is not defined");
        assert_eq!(error.runtime_kind(), Some(RuntimeErrorKind::Undefined));
    }

    #[test]
    fn test_if_branches() {
        assert_eq!(eval("if 0 do 1 elif 1 do 2 else 3"), Some(Value::int(2)));
        assert_eq!(eval("if 0 do 1 else 3"), Some(Value::int(3)));
        assert_eq!(eval("if 0 do 1"), None);
        assert_eq!(eval("if 1 do 1 elif missing do 2"), Some(Value::int(1)));
    }

    #[test]
    fn test_for_loop_rebinds_in_enclosing_scope() {
        let interpreter = Interpreter::new();
        assert_eq!(
            eval_all(&interpreter, &["for i from 0 to 5 then set x = i", "x"]).unwrap(),
            Some(Value::int(4))
        );
        assert_eq!(interpreter.run("test", "i").unwrap(), Some(Value::int(4)));

        let interpreter = Interpreter::new();
        assert_eq!(
            eval_all(&interpreter, &["for i from 5 to 0 by -1 then set x = i", "x"]).unwrap(),
            Some(Value::int(1))
        );
    }

    #[test]
    fn test_loops_yield_no_value() {
        assert_eq!(eval("for i from 0 to 3 then i"), None);
        assert_eq!(eval("while 0 then 1"), None);

        let interpreter = Interpreter::new();
        let result = eval_all(&interpreter, &["set n = 0", "while n < 3 then set n = n + 1", "n"]);
        assert_eq!(result.unwrap(), Some(Value::int(3)));
    }

    #[test]
    fn test_loop_bounds_must_be_numbers() {
        let error = eval_error("for i from \"a\" to 3 then i");
        assert_eq!(error.message, "Illegal operation");
        assert_eq!((error.start.column, error.end.column), (11, 14));
    }

    #[test]
    fn test_missing_value_is_an_error() {
        let error = eval_error("1 + (if 0 do 1)");
        assert_eq!(error.runtime_kind(), Some(RuntimeErrorKind::NoValue));
        assert_eq!(error.message, "expression has no value");
    }

    #[test]
    fn test_functions() {
        let interpreter = Interpreter::new();
        assert_eq!(
            eval_all(&interpreter, &["fn add(a, b) -> a + b", "add(2, 3)"]).unwrap(),
            Some(Value::int(5))
        );

        let error = interpreter.run("test", "add(1)").unwrap_err();
        assert_eq!(error.message, "1 not enough args passed to 'add'");
        assert_eq!(error.runtime_kind(), Some(RuntimeErrorKind::ArityMismatch));

        let error = interpreter.run("test", "add(1, 2, 3)").unwrap_err();
        assert_eq!(error.message, "1 extra args passed to 'add'");
    }

    #[test]
    fn test_function_display() {
        assert_eq!(eval("fn inc(x) -> x + 1").unwrap().to_string(), "<function inc>");
        assert_eq!(eval("fn (x) -> x").unwrap().to_string(), "<function <anonymous>>");
    }

    #[test]
    fn test_recursion() {
        let interpreter = Interpreter::new();
        let result = eval_all(
            &interpreter,
            &["fn f(n) -> if n <= 1 do 1 else n * f(n - 1)", "f(5)"],
        );
        assert_eq!(result.unwrap(), Some(Value::int(120)));
    }

    #[test]
    fn test_traceback_has_one_frame_per_call() {
        let interpreter = Interpreter::new();
        let error = eval_all(
            &interpreter,
            &["fn g(n) -> if n == 0 do 1 / 0 else g(n - 1)", "g(3)"],
        )
        .unwrap_err();

        let labels: Vec<String> = error.frames().iter().map(|frame| frame.label.to_string()).collect();
        assert_eq!(labels, vec!["<program>", "g", "g", "g", "g"]);
    }

    #[test]
    fn test_closures_resolve_in_defining_scope() {
        let interpreter = Interpreter::new();
        let result = eval_all(
            &interpreter,
            &["fn outer(a) -> fn (b) -> a + b", "set add1 = outer(1)", "add1(2)"],
        );
        assert_eq!(result.unwrap(), Some(Value::int(3)));

        // `a` belongs to outer's call, not to whoever calls the closure.
        let result = eval_all(&interpreter, &["fn wrapper(a) -> add1(10)", "wrapper(100)"]);
        assert_eq!(result.unwrap(), Some(Value::int(11)));
    }

    #[test]
    fn test_call_scope_is_released_on_return() {
        let interpreter = Interpreter::new();
        eval_all(
            &interpreter,
            &["fn f(n) -> set m = n + 1", "fn sq(n) -> (fn inner(x) -> x * x)(n)"],
        )
        .unwrap();

        let globals = &interpreter.global.symbols;
        let before = Rc::strong_count(globals);
        assert_eq!(eval_all(&interpreter, &["f(1)", "f(2)"]).unwrap(), Some(Value::int(3)));
        assert_eq!(interpreter.run("test", "sq(4)").unwrap(), Some(Value::int(16)));
        assert_eq!(Rc::strong_count(globals), before);
    }

    #[test]
    fn test_returned_named_closure_keeps_its_scope() {
        let interpreter = Interpreter::new();
        let result = eval_all(
            &interpreter,
            &["fn outer(a) -> fn inner(b) -> if b do inner(b - 1) + a else 0", "set g = outer(2)", "g(3)"],
        );
        assert_eq!(result.unwrap(), Some(Value::int(6)));
    }

    #[test]
    fn test_assignment_inside_call_is_local() {
        let interpreter = Interpreter::new();
        let result = eval_all(&interpreter, &["set v = 1", "fn s() -> set v = 2", "s()", "v"]);
        assert_eq!(result.unwrap(), Some(Value::int(1)));
    }

    #[test]
    fn test_first_failing_argument_wins() {
        let interpreter = Interpreter::new();
        let error = eval_all(&interpreter, &["fn k(a, b) -> a", "k(nope, 1 / 0)"]).unwrap_err();
        assert_eq!(error.message, "nope is not defined");
    }
}
