use crate::position::Position;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Set,
    Not,
    And,
    Or,
    If,
    Do,
    Elif,
    Else,
    For,
    From,
    To,
    By,
    Then,
    While,
    Fn,
}

impl Keyword {
    pub const ALL: [Keyword; 15] = [
        Keyword::Set,
        Keyword::Not,
        Keyword::And,
        Keyword::Or,
        Keyword::If,
        Keyword::Do,
        Keyword::Elif,
        Keyword::Else,
        Keyword::For,
        Keyword::From,
        Keyword::To,
        Keyword::By,
        Keyword::Then,
        Keyword::While,
        Keyword::Fn,
    ];

    pub fn from_ident(ident: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|keyword| keyword.as_str() == ident)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Keyword::Set => "set",
            Keyword::Not => "not",
            Keyword::And => "and",
            Keyword::Or => "or",
            Keyword::If => "if",
            Keyword::Do => "do",
            Keyword::Elif => "elif",
            Keyword::Else => "else",
            Keyword::For => "for",
            Keyword::From => "from",
            Keyword::To => "to",
            Keyword::By => "by",
            Keyword::Then => "then",
            Keyword::While => "while",
            Keyword::Fn => "fn",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Literals and identifiers
    Int(i64),
    Float(f64),
    String(String),
    Ident(String),
    Keyword(Keyword),

    // Arithmetic operators
    Plus,
    Minus,
    Star,
    Slash,
    Caret,

    // Comparison operators
    Eq,
    NotEq,
    Less,
    Greater,
    LessEq,
    GreaterEq,

    Assign,
    /// `->` between a parameter list and a function body
    Arrow,
    Comma,
    LParen,
    RParen,
    Eof,
}

impl TokenKind {
    /// Maps an operator spelling to its token, for the single and
    /// double character operators the lexer recognises.
    pub fn operator(spelling: &str) -> Option<Self> {
        let kind = match spelling {
            "+" => TokenKind::Plus,
            "-" => TokenKind::Minus,
            "*" => TokenKind::Star,
            "/" => TokenKind::Slash,
            "^" => TokenKind::Caret,
            "=" => TokenKind::Assign,
            "<" => TokenKind::Less,
            ">" => TokenKind::Greater,
            "," => TokenKind::Comma,
            "(" => TokenKind::LParen,
            ")" => TokenKind::RParen,
            "==" => TokenKind::Eq,
            "!=" => TokenKind::NotEq,
            "<=" => TokenKind::LessEq,
            ">=" => TokenKind::GreaterEq,
            "->" => TokenKind::Arrow,
            _ => return None,
        };
        Some(kind)
    }

    pub fn is_keyword(&self, keyword: Keyword) -> bool {
        matches!(self, TokenKind::Keyword(k) if *k == keyword)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Int(value) => write!(f, "INT:{}", value),
            TokenKind::Float(value) => write!(f, "FLOAT:{}", value),
            TokenKind::String(value) => write!(f, "STRING:{:?}", value),
            TokenKind::Ident(name) => write!(f, "IDENT:{}", name),
            TokenKind::Keyword(keyword) => write!(f, "KEY:{}", keyword.as_str()),
            TokenKind::Plus => write!(f, "'+'"),
            TokenKind::Minus => write!(f, "'-'"),
            TokenKind::Star => write!(f, "'*'"),
            TokenKind::Slash => write!(f, "'/'"),
            TokenKind::Caret => write!(f, "'^'"),
            TokenKind::Eq => write!(f, "'=='"),
            TokenKind::NotEq => write!(f, "'!='"),
            TokenKind::Less => write!(f, "'<'"),
            TokenKind::Greater => write!(f, "'>'"),
            TokenKind::LessEq => write!(f, "'<='"),
            TokenKind::GreaterEq => write!(f, "'>='"),
            TokenKind::Assign => write!(f, "'='"),
            TokenKind::Arrow => write!(f, "'->'"),
            TokenKind::Comma => write!(f, "','"),
            TokenKind::LParen => write!(f, "'('"),
            TokenKind::RParen => write!(f, "')'"),
            TokenKind::Eof => write!(f, "EOF"),
        }
    }
}

/// A lexed token together with the source range it covers (end exclusive).
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub start: Position,
    pub end: Position,
}

impl Token {
    pub fn new(kind: TokenKind, start: Position, end: Position) -> Self {
        Self { kind, start, end }
    }
}
