use crate::position::Position;
use crate::value::Number;
use std::fmt;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    Eq,
    NotEq,
    Less,
    Greater,
    LessEq,
    GreaterEq,
    And,
    Or,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Pow => "^",
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::Less => "<",
            BinaryOp::Greater => ">",
            BinaryOp::LessEq => "<=",
            BinaryOp::GreaterEq => ">=",
            BinaryOp::And => "and",
            BinaryOp::Or => "or",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Plus,
    Neg,
    Not,
}

impl UnaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Plus => "+",
            UnaryOp::Neg => "-",
            UnaryOp::Not => "not",
        }
    }
}

/// A syntax tree node. `start..end` covers the whole construct.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub start: Position,
    pub end: Position,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Number(Number),
    String(Rc<str>),
    BinaryOp {
        left: Box<Node>,
        op: BinaryOp,
        right: Box<Node>,
    },
    UnaryOp {
        op: UnaryOp,
        operand: Box<Node>,
    },
    VarAccess(Rc<str>),
    VarAssign {
        name: Rc<str>,
        value: Box<Node>,
    },
    /// Guarded branches tried in order, then the optional else branch.
    If {
        cases: Vec<(Node, Node)>,
        else_case: Option<Box<Node>>,
    },
    For {
        var: Rc<str>,
        from: Box<Node>,
        to: Box<Node>,
        step: Option<Box<Node>>,
        body: Box<Node>,
    },
    While {
        condition: Box<Node>,
        body: Box<Node>,
    },
    /// Function bodies are shared with every function value built from them.
    FuncDef {
        name: Option<Rc<str>>,
        params: Vec<Rc<str>>,
        body: Rc<Node>,
    },
    Call {
        callee: Box<Node>,
        args: Vec<Node>,
    },
}

impl Node {
    pub fn new(kind: NodeKind, start: Position, end: Position) -> Self {
        Self { kind, start, end }
    }

    pub fn binary(left: Node, op: BinaryOp, right: Node) -> Self {
        let start = left.start.clone();
        let end = right.end.clone();
        Self::new(
            NodeKind::BinaryOp {
                left: Box::new(left),
                op,
                right: Box::new(right),
            },
            start,
            end,
        )
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, items: impl IntoIterator<Item = impl fmt::Display>) -> fmt::Result {
    for (i, item) in items.into_iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

/// Fully parenthesised rendering, used in logs and parser tests.
impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            NodeKind::Number(number) => write!(f, "{}", number),
            NodeKind::String(text) => write!(f, "{:?}", text),
            NodeKind::BinaryOp { left, op, right } => {
                write!(f, "({} {} {})", left, op.symbol(), right)
            }
            NodeKind::UnaryOp { op, operand } => write!(f, "({} {})", op.symbol(), operand),
            NodeKind::VarAccess(name) => write!(f, "{}", name),
            NodeKind::VarAssign { name, value } => write!(f, "(set {} {})", name, value),
            NodeKind::If { cases, else_case } => {
                write!(f, "(if")?;
                for (i, (condition, branch)) in cases.iter().enumerate() {
                    let keyword = if i == 0 { "" } else { " elif" };
                    write!(f, "{} {} do {}", keyword, condition, branch)?;
                }
                if let Some(else_case) = else_case {
                    write!(f, " else {}", else_case)?;
                }
                write!(f, ")")
            }
            NodeKind::For {
                var,
                from,
                to,
                step,
                body,
            } => {
                write!(f, "(for {} from {} to {}", var, from, to)?;
                if let Some(step) = step {
                    write!(f, " by {}", step)?;
                }
                write!(f, " then {})", body)
            }
            NodeKind::While { condition, body } => write!(f, "(while {} then {})", condition, body),
            NodeKind::FuncDef { name, params, body } => {
                write!(f, "(fn")?;
                if let Some(name) = name {
                    write!(f, " {}", name)?;
                }
                write!(f, "(")?;
                write_list(f, params.iter())?;
                write!(f, ") -> {})", body)
            }
            NodeKind::Call { callee, args } => {
                write!(f, "{}(", callee)?;
                write_list(f, args.iter())?;
                write!(f, ")")
            }
        }
    }
}
