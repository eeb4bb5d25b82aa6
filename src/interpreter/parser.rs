use crate::ast::{BinaryOp, Node, NodeKind, UnaryOp};
use crate::diagnostic::Diagnostic;
use crate::position::Position;
use crate::token::{Keyword, Token, TokenKind};
use crate::value::Number;
use std::mem;
use std::rc::Rc;

const EXPECTED_ATOM: &str = "Expected int, float, identifier, '+', '-', '('";
const EXPECTED_COMPARISON: &str = "Expected int, float, identifier, '+', '-', '(' or 'not'";
const EXPECTED_EXPRESSION: &str = "Expected 'set', int, float, '+', '-', '(' or identifier";
const EXPECTED_ARGUMENT: &str =
    "Expected ')', 'set', 'if', 'for', 'while', 'fn', int, float, identifier, '+', '-', '(' or 'not'";
const EXPECTED_END: &str = "Expected float, int, identifier, 'set', '+', '-' or '('";

const LOGICAL_PRECEDENCE: u8 = 1;
const COMPARISON_PRECEDENCE: u8 = 2;
const ADDITIVE_PRECEDENCE: u8 = 3;
const MULTIPLICATIVE_PRECEDENCE: u8 = 4;

/// Outcome of a parse plus the number of tokens consumed on the way,
/// successful or not.
#[derive(Debug)]
pub struct ParseResult {
    pub outcome: Result<Node, Diagnostic>,
    pub advance_count: usize,
}

impl ParseResult {
    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }

    pub fn into_result(self) -> Result<Node, Diagnostic> {
        self.outcome
    }
}

/// Parses a whole token stream into one expression.
pub fn parse(tokens: Vec<Token>) -> ParseResult {
    let mut parser = TokenParser::new(tokens);
    let outcome = parser.parse();
    ParseResult {
        outcome,
        advance_count: parser.current,
    }
}

type Rule = fn(&mut TokenParser) -> Result<Node, Diagnostic>;

pub struct TokenParser {
    tokens: Vec<Token>,
    current: usize,
}

impl TokenParser {
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if !matches!(tokens.last(), Some(token) if token.kind == TokenKind::Eof) {
            let end = match tokens.last() {
                Some(token) => token.end.clone(),
                None => Position::start("", ""),
            };
            tokens.push(Token::new(TokenKind::Eof, end.clone(), end));
        }
        Self { tokens, current: 0 }
    }

    fn current_token(&self) -> &Token {
        // `new` guarantees a trailing end-of-input token and `advance` never
        // steps past it.
        &self.tokens[self.current.min(self.tokens.len() - 1)]
    }

    fn at_end(&self) -> bool {
        self.current_token().kind == TokenKind::Eof
    }

    fn advance(&mut self) -> Token {
        let token = self.current_token().clone();
        if !self.at_end() {
            self.current += 1;
        }
        token
    }

    fn error_here(&self, message: &str) -> Diagnostic {
        let token = self.current_token();
        Diagnostic::syntax(message, token.start.clone(), token.end.clone())
    }

    fn expect(&mut self, expected: TokenKind, message: &str) -> Result<Token, Diagnostic> {
        if mem::discriminant(&self.current_token().kind) == mem::discriminant(&expected) {
            Ok(self.advance())
        } else {
            Err(self.error_here(message))
        }
    }

    fn expect_keyword(&mut self, keyword: Keyword, message: &str) -> Result<Token, Diagnostic> {
        if self.current_token().kind.is_keyword(keyword) {
            Ok(self.advance())
        } else {
            Err(self.error_here(message))
        }
    }

    fn expect_identifier(&mut self, message: &str) -> Result<(Rc<str>, Token), Diagnostic> {
        match &self.current_token().kind {
            TokenKind::Ident(name) => {
                let name = Rc::from(name.as_str());
                Ok((name, self.advance()))
            }
            _ => Err(self.error_here(message)),
        }
    }

    /// Swaps `error` for a rule's generic message when the rule failed
    /// before consuming anything.
    fn fallback(&self, start: usize, error: Diagnostic, generic: impl FnOnce(&Token) -> Diagnostic) -> Diagnostic {
        if self.current == start {
            generic(self.current_token())
        } else {
            error
        }
    }

    pub fn parse(&mut self) -> Result<Node, Diagnostic> {
        let node = self.parse_expression()?;

        if !self.at_end() {
            let token = self.current_token();
            return Err(Diagnostic::syntax(
                EXPECTED_END,
                token.start.clone(),
                token.end.line_end(),
            ));
        }

        Ok(node)
    }

    fn parse_expression(&mut self) -> Result<Node, Diagnostic> {
        if self.current_token().kind.is_keyword(Keyword::Set) {
            return self.parse_assignment();
        }

        let start = self.current;
        self.binary_chain(LOGICAL_PRECEDENCE, Self::parse_comparison)
            .map_err(|error| {
                self.fallback(start, error, |token| {
                    Diagnostic::syntax(EXPECTED_EXPRESSION, token.end.clone(), token.end.clone())
                })
            })
    }

    fn parse_assignment(&mut self) -> Result<Node, Diagnostic> {
        let set = self.expect_keyword(Keyword::Set, "Expected 'set'")?;
        let (name, _) = self.expect_identifier("Expected identifier")?;
        self.expect(TokenKind::Assign, "Expected '='")?;

        let value = self.parse_expression()?;
        let end = value.end.clone();
        Ok(Node::new(
            NodeKind::VarAssign {
                name,
                value: Box::new(value),
            },
            set.start,
            end,
        ))
    }

    fn parse_comparison(&mut self) -> Result<Node, Diagnostic> {
        if self.current_token().kind.is_keyword(Keyword::Not) {
            let op = self.advance();
            let operand = self.parse_comparison()?;
            return Ok(unary(UnaryOp::Not, op.start, operand));
        }

        let start = self.current;
        self.binary_chain(COMPARISON_PRECEDENCE, Self::parse_arithmetic)
            .map_err(|error| {
                self.fallback(start, error, |token| {
                    Diagnostic::syntax(EXPECTED_COMPARISON, token.start.clone(), token.end.clone())
                })
            })
    }

    fn parse_arithmetic(&mut self) -> Result<Node, Diagnostic> {
        self.binary_chain(ADDITIVE_PRECEDENCE, Self::parse_term)
    }

    fn parse_term(&mut self) -> Result<Node, Diagnostic> {
        self.binary_chain(MULTIPLICATIVE_PRECEDENCE, Self::parse_factor)
    }

    fn token_to_binary_operator(kind: &TokenKind) -> Option<(u8, BinaryOp)> {
        let entry = match kind {
            TokenKind::Keyword(Keyword::And) => (LOGICAL_PRECEDENCE, BinaryOp::And),
            TokenKind::Keyword(Keyword::Or) => (LOGICAL_PRECEDENCE, BinaryOp::Or),
            TokenKind::Eq => (COMPARISON_PRECEDENCE, BinaryOp::Eq),
            TokenKind::NotEq => (COMPARISON_PRECEDENCE, BinaryOp::NotEq),
            TokenKind::Less => (COMPARISON_PRECEDENCE, BinaryOp::Less),
            TokenKind::Greater => (COMPARISON_PRECEDENCE, BinaryOp::Greater),
            TokenKind::LessEq => (COMPARISON_PRECEDENCE, BinaryOp::LessEq),
            TokenKind::GreaterEq => (COMPARISON_PRECEDENCE, BinaryOp::GreaterEq),
            TokenKind::Plus => (ADDITIVE_PRECEDENCE, BinaryOp::Add),
            TokenKind::Minus => (ADDITIVE_PRECEDENCE, BinaryOp::Sub),
            TokenKind::Star => (MULTIPLICATIVE_PRECEDENCE, BinaryOp::Mul),
            TokenKind::Slash => (MULTIPLICATIVE_PRECEDENCE, BinaryOp::Div),
            _ => return None,
        };
        Some(entry)
    }

    /// `operand (op operand)*` for the operators of one precedence level,
    /// folded to the left.
    fn binary_chain(&mut self, precedence: u8, operand: Rule) -> Result<Node, Diagnostic> {
        let mut left = operand(self)?;

        while let Some((level, op)) = Self::token_to_binary_operator(&self.current_token().kind) {
            if level != precedence {
                break;
            }
            self.advance();
            let right = operand(self)?;
            left = Node::binary(left, op, right);
        }

        Ok(left)
    }

    fn parse_factor(&mut self) -> Result<Node, Diagnostic> {
        let op = match self.current_token().kind {
            TokenKind::Plus => UnaryOp::Plus,
            TokenKind::Minus => UnaryOp::Neg,
            _ => return self.parse_power(),
        };

        let token = self.advance();
        let operand = self.parse_factor()?;
        Ok(unary(op, token.start, operand))
    }

    // The exponent is a full factor, which makes `^` right-associative.
    fn parse_power(&mut self) -> Result<Node, Diagnostic> {
        let mut left = self.parse_call()?;

        while self.current_token().kind == TokenKind::Caret {
            self.advance();
            let right = self.parse_factor()?;
            left = Node::binary(left, BinaryOp::Pow, right);
        }

        Ok(left)
    }

    fn parse_call(&mut self) -> Result<Node, Diagnostic> {
        let callee = self.parse_base()?;
        if self.current_token().kind != TokenKind::LParen {
            return Ok(callee);
        }
        self.advance();

        let mut args = Vec::new();
        if self.current_token().kind != TokenKind::RParen {
            let start = self.current;
            let first = self.parse_expression().map_err(|error| {
                self.fallback(start, error, |token| {
                    Diagnostic::syntax(EXPECTED_ARGUMENT, token.start.clone(), token.end.clone())
                })
            })?;
            args.push(first);

            while self.current_token().kind == TokenKind::Comma {
                self.advance();
                args.push(self.parse_expression()?);
            }
        }

        let close = self.expect(TokenKind::RParen, "Expected ',' or ')'")?;
        let start = callee.start.clone();
        Ok(Node::new(
            NodeKind::Call {
                callee: Box::new(callee),
                args,
            },
            start,
            close.end,
        ))
    }

    fn parse_base(&mut self) -> Result<Node, Diagnostic> {
        let token = self.current_token().clone();

        let kind = match &token.kind {
            TokenKind::Int(value) => NodeKind::Number(Number::Int(*value)),
            TokenKind::Float(value) => NodeKind::Number(Number::Float(*value)),
            TokenKind::String(text) => NodeKind::String(Rc::from(text.as_str())),
            TokenKind::Ident(name) => NodeKind::VarAccess(Rc::from(name.as_str())),
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expression()?;
                self.expect(TokenKind::RParen, "Expected ')'")?;
                return Ok(inner);
            }
            TokenKind::Keyword(Keyword::If) => return self.parse_if(),
            TokenKind::Keyword(Keyword::For) => return self.parse_for(),
            TokenKind::Keyword(Keyword::While) => return self.parse_while(),
            TokenKind::Keyword(Keyword::Fn) => return self.parse_function(),
            _ => {
                return Err(Diagnostic::syntax(
                    EXPECTED_ATOM,
                    token.start.clone(),
                    token.end.line_end(),
                ))
            }
        };

        self.advance();
        Ok(Node::new(kind, token.start, token.end))
    }

    fn parse_if(&mut self) -> Result<Node, Diagnostic> {
        let if_token = self.expect_keyword(Keyword::If, "Expected 'if'")?;
        let mut cases = vec![self.parse_guarded_branch()?];

        while self.current_token().kind.is_keyword(Keyword::Elif) {
            self.advance();
            cases.push(self.parse_guarded_branch()?);
        }

        let else_case = if self.current_token().kind.is_keyword(Keyword::Else) {
            self.advance();
            Some(Box::new(self.parse_expression()?))
        } else {
            None
        };

        let end = match (&else_case, cases.last()) {
            (Some(branch), _) => branch.end.clone(),
            (None, Some((_, branch))) => branch.end.clone(),
            (None, None) => if_token.end.clone(),
        };
        Ok(Node::new(NodeKind::If { cases, else_case }, if_token.start, end))
    }

    fn parse_guarded_branch(&mut self) -> Result<(Node, Node), Diagnostic> {
        let condition = self.parse_expression()?;
        self.expect_keyword(Keyword::Do, "Expected 'do'")?;
        let branch = self.parse_expression()?;
        Ok((condition, branch))
    }

    fn parse_for(&mut self) -> Result<Node, Diagnostic> {
        let for_token = self.expect_keyword(Keyword::For, "Expected 'for'")?;
        let (var, _) = self.expect_identifier("Expected identifier")?;

        self.expect_keyword(Keyword::From, "Expected 'from'")?;
        let from = self.parse_expression()?;

        self.expect_keyword(Keyword::To, "Expected 'to'")?;
        let to = self.parse_expression()?;

        let step = if self.current_token().kind.is_keyword(Keyword::By) {
            self.advance();
            Some(Box::new(self.parse_expression()?))
        } else {
            None
        };

        self.expect_keyword(Keyword::Then, "Expected 'then'")?;
        let body = self.parse_expression()?;

        let end = body.end.clone();
        Ok(Node::new(
            NodeKind::For {
                var,
                from: Box::new(from),
                to: Box::new(to),
                step,
                body: Box::new(body),
            },
            for_token.start,
            end,
        ))
    }

    fn parse_while(&mut self) -> Result<Node, Diagnostic> {
        let while_token = self.expect_keyword(Keyword::While, "Expected 'while'")?;
        let condition = self.parse_expression()?;
        self.expect_keyword(Keyword::Then, "Expected 'then'")?;
        let body = self.parse_expression()?;

        let end = body.end.clone();
        Ok(Node::new(
            NodeKind::While {
                condition: Box::new(condition),
                body: Box::new(body),
            },
            while_token.start,
            end,
        ))
    }

    fn parse_function(&mut self) -> Result<Node, Diagnostic> {
        let fn_token = self.expect_keyword(Keyword::Fn, "Expected 'fn'")?;

        let name = match &self.current_token().kind {
            TokenKind::Ident(name) => {
                let name: Rc<str> = Rc::from(name.as_str());
                self.advance();
                self.expect(TokenKind::LParen, "Expected '('")?;
                Some(name)
            }
            _ => {
                self.expect(TokenKind::LParen, "Expected identifier or '('")?;
                None
            }
        };

        let mut params = Vec::new();
        if let TokenKind::Ident(first) = &self.current_token().kind {
            params.push(Rc::from(first.as_str()));
            self.advance();

            while self.current_token().kind == TokenKind::Comma {
                self.advance();
                let (param, _) = self.expect_identifier("Expected identifier")?;
                params.push(param);
            }
            self.expect(TokenKind::RParen, "Expected ',' or ')'")?;
        } else {
            self.expect(TokenKind::RParen, "Expected identifier or ')'")?;
        }

        self.expect(TokenKind::Arrow, "Expected '->'")?;
        let body = self.parse_expression()?;

        let end = body.end.clone();
        Ok(Node::new(
            NodeKind::FuncDef {
                name,
                params,
                body: Rc::new(body),
            },
            fn_token.start,
            end,
        ))
    }
}

fn unary(op: UnaryOp, start: Position, operand: Node) -> Node {
    let end = operand.end.clone();
    Node::new(
        NodeKind::UnaryOp {
            op,
            operand: Box::new(operand),
        },
        start,
        end,
    )
}
