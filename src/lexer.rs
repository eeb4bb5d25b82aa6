use crate::diagnostic::Diagnostic;
use crate::position::Position;
use crate::token::{Keyword, Token, TokenKind};

/// Scans `source` into tokens.
///
/// Scanning stops at the first error; the tokens produced so far are still
/// returned and an end-of-input token is always appended.
pub fn tokenize(filename: &str, source: &str) -> (Vec<Token>, Option<Diagnostic>) {
    Lexer::new(filename, source).tokenize()
}

pub struct Lexer {
    pos: Position,
    tokens: Vec<Token>,
}

impl Lexer {
    pub fn new(filename: &str, source: &str) -> Self {
        Self {
            pos: Position::start(filename, source),
            tokens: Vec::new(),
        }
    }

    pub fn tokenize(mut self) -> (Vec<Token>, Option<Diagnostic>) {
        let error = self.scan().err();
        let end = self.pos.clone();
        self.tokens.push(Token::new(TokenKind::Eof, end.clone(), end));
        (self.tokens, error)
    }

    fn scan(&mut self) -> Result<(), Diagnostic> {
        while let Some(c) = self.pos.current() {
            if c.is_whitespace() {
                self.pos.advance(Some(c));
            } else if c.is_ascii_digit() || c == '.' {
                self.lex_number()?;
            } else if c.is_ascii_alphabetic() || c == '_' {
                self.lex_identifier()?;
            } else if c == '"' {
                self.lex_string()?;
            } else if !self.lex_operator(c) {
                return Err(self.illegal_character(c));
            }
        }
        Ok(())
    }

    fn push(&mut self, kind: TokenKind, start: Position) {
        let end = self.pos.clone();
        self.tokens.push(Token::new(kind, start, end));
    }

    fn lex_number(&mut self) -> Result<(), Diagnostic> {
        let start = self.pos.clone();
        let mut literal = String::new();
        let mut seen_dot = false;

        while let Some(c) = self.pos.current().filter(|c| c.is_ascii_digit() || *c == '.') {
            if c == '.' {
                if seen_dot {
                    self.pos.advance(Some(c));
                    return Err(Diagnostic::syntax("multiple decimal points", start, self.pos.clone()));
                }
                if !self.pos.peek().is_some_and(|next| next.is_ascii_digit()) {
                    self.pos.advance(Some(c));
                    return Err(Diagnostic::syntax("invalid syntax", start, self.pos.clone()));
                }
                seen_dot = true;
            }
            literal.push(c);
            self.pos.advance(Some(c));
        }

        let kind = if seen_dot {
            match literal.parse::<f64>() {
                Ok(value) => TokenKind::Float(value),
                Err(_) => return Err(Diagnostic::syntax("invalid syntax", start, self.pos.clone())),
            }
        } else {
            match literal.parse::<i64>() {
                Ok(value) => TokenKind::Int(value),
                // Digits only, so the only failure is overflow.
                Err(_) => match literal.parse::<f64>() {
                    Ok(value) => TokenKind::Float(value),
                    Err(_) => return Err(Diagnostic::syntax("invalid syntax", start, self.pos.clone())),
                },
            }
        };

        self.push(kind, start);
        Ok(())
    }

    fn lex_identifier(&mut self) -> Result<(), Diagnostic> {
        let start = self.pos.clone();

        if self.pos.current() == Some('_') {
            self.pos.advance(Some('_'));
            return Err(Diagnostic::syntax(
                "variable cannot begin with '_'",
                start,
                self.pos.clone(),
            ));
        }

        let mut ident = String::new();
        while let Some(c) = self.pos.current().filter(|c| c.is_ascii_alphanumeric() || *c == '_') {
            ident.push(c);
            self.pos.advance(Some(c));
        }

        let kind = match Keyword::from_ident(&ident) {
            Some(keyword) => TokenKind::Keyword(keyword),
            None => TokenKind::Ident(ident),
        };
        self.push(kind, start);
        Ok(())
    }

    fn lex_string(&mut self) -> Result<(), Diagnostic> {
        let start = self.pos.clone();
        self.pos.advance(Some('"'));

        let mut value = String::new();
        let mut escaped = false;

        loop {
            let Some(c) = self.pos.current() else {
                return Err(Diagnostic::syntax("Unterminated string", start, self.pos.clone()));
            };

            if escaped {
                value.push(match c {
                    'n' => '\n',
                    't' => '\t',
                    other => other,
                });
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                break;
            } else {
                value.push(c);
            }
            self.pos.advance(Some(c));
        }

        self.pos.advance(Some('"'));
        self.push(TokenKind::String(value), start);
        Ok(())
    }

    /// Emits an operator token starting at `c`, preferring the two
    /// character form. Returns false if `c` starts no operator.
    fn lex_operator(&mut self, c: char) -> bool {
        let start = self.pos.clone();

        if matches!(c, '<' | '>' | '=' | '!' | '-') {
            if let Some(next) = self.pos.peek() {
                let pair: String = [c, next].iter().collect();
                if let Some(kind) = TokenKind::operator(&pair) {
                    self.pos.advance(Some(c));
                    self.pos.advance(Some(next));
                    self.push(kind, start);
                    return true;
                }
            }
        }

        match single_char_operator(c) {
            Some(kind) => {
                self.pos.advance(Some(c));
                self.push(kind, start);
                true
            }
            None => false,
        }
    }

    /// Reports `c` together with every directly following character that
    /// could not start a token either.
    fn illegal_character(&mut self, c: char) -> Diagnostic {
        let start = self.pos.clone();
        let mut illegal = String::from(c);
        self.pos.advance(Some(c));

        while let Some(next) = self.pos.current().filter(|next| !starts_token(*next)) {
            illegal.push(next);
            self.pos.advance(Some(next));
        }

        Diagnostic::illegal_character(format!("'{}'", illegal), start, self.pos.clone())
    }
}

fn single_char_operator(c: char) -> Option<TokenKind> {
    TokenKind::operator(c.encode_utf8(&mut [0; 4]))
}

fn starts_token(c: char) -> bool {
    c.is_whitespace()
        || c.is_ascii_alphanumeric()
        || c == '_'
        || c == '.'
        || single_char_operator(c).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::ErrorKind;

    fn lex(source: &str) -> Vec<TokenKind> {
        let (tokens, error) = tokenize("test", source);
        assert!(error.is_none(), "Lexer failed: {:?}", error.map(|e| e.message));
        tokens.into_iter().map(|tok| tok.kind).collect()
    }

    fn lex_error(source: &str) -> crate::diagnostic::Diagnostic {
        tokenize("test", source).1.expect("expected a lexer error")
    }

    fn ident(name: &str) -> TokenKind {
        TokenKind::Ident(name.to_string())
    }

    #[test]
    fn test_keywords() {
        assert_eq!(lex("set"), vec![TokenKind::Keyword(Keyword::Set), TokenKind::Eof]);
        assert_eq!(lex("then"), vec![TokenKind::Keyword(Keyword::Then), TokenKind::Eof]);
        assert_eq!(lex("fn"), vec![TokenKind::Keyword(Keyword::Fn), TokenKind::Eof]);
    }

    #[test]
    fn test_identifiers() {
        assert_eq!(lex("foo"), vec![ident("foo"), TokenKind::Eof]);
        assert_eq!(lex("bar_123"), vec![ident("bar_123"), TokenKind::Eof]);
        assert_eq!(lex("settle"), vec![ident("settle"), TokenKind::Eof]);
    }

    #[test]
    fn test_identifier_cannot_start_with_underscore() {
        let error = lex_error("_test");
        assert_eq!(error.kind, ErrorKind::SyntaxError);
        assert_eq!(error.message, "variable cannot begin with '_'");
    }

    #[test]
    fn test_numbers() {
        assert_eq!(lex("42"), vec![TokenKind::Int(42), TokenKind::Eof]);
        assert_eq!(lex("3.14"), vec![TokenKind::Float(3.14), TokenKind::Eof]);
        assert_eq!(lex(".5"), vec![TokenKind::Float(0.5), TokenKind::Eof]);
    }

    #[test]
    fn test_malformed_numbers() {
        assert_eq!(lex_error("1.2.3").message, "multiple decimal points");
        assert_eq!(lex_error("5.").message, "invalid syntax");
        assert_eq!(lex_error("1..2").message, "invalid syntax");
    }

    #[test]
    fn test_oversized_integer_becomes_float() {
        assert_eq!(lex("99999999999999999999"), vec![TokenKind::Float(1e20), TokenKind::Eof]);
        assert_eq!(lex("9223372036854775807"), vec![TokenKind::Int(i64::MAX), TokenKind::Eof]);
    }

    #[test]
    fn test_strings() {
        assert_eq!(lex(r#""hello""#), vec![TokenKind::String("hello".into()), TokenKind::Eof]);
        assert_eq!(lex(r#""""#), vec![TokenKind::String(String::new()), TokenKind::Eof]);
    }

    #[test]
    fn test_string_escapes() {
        assert_eq!(
            lex(r#""a\nb\tc\\d\"e\'f\qg""#),
            vec![TokenKind::String("a\nb\tc\\d\"e'fqg".into()), TokenKind::Eof]
        );
    }

    #[test]
    fn test_unterminated_string() {
        let error = lex_error(r#""abc"#);
        assert_eq!(error.message, "Unterminated string");
        assert_eq!(error.start.index, 0);
        assert_eq!(error.end.index, 4);
    }

    #[test]
    fn test_double_char_operators() {
        assert_eq!(
            lex("== != <= >= ->"),
            vec![
                TokenKind::Eq,
                TokenKind::NotEq,
                TokenKind::LessEq,
                TokenKind::GreaterEq,
                TokenKind::Arrow,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_unpaired_operators_stay_single() {
        assert_eq!(
            lex("<>=- >"),
            vec![
                TokenKind::Less,
                TokenKind::GreaterEq,
                TokenKind::Minus,
                TokenKind::Greater,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_illegal_characters_group_together() {
        let error = lex_error("1 + $$# 2");
        assert_eq!(error.kind, ErrorKind::IllegalCharacter);
        assert_eq!(error.message, "'$$#'");
        assert_eq!((error.start.column, error.end.column), (4, 7));
    }

    #[test]
    fn test_lone_bang_is_illegal() {
        assert_eq!(lex_error("!x").message, "'!'");
    }

    #[test]
    fn test_stops_at_first_error_with_eof() {
        let (tokens, error) = tokenize("test", "1 + @ 2");
        assert!(error.is_some());
        let kinds: Vec<_> = tokens.into_iter().map(|tok| tok.kind).collect();
        assert_eq!(kinds, vec![TokenKind::Int(1), TokenKind::Plus, TokenKind::Eof]);
    }

    #[test]
    fn test_function_definition() {
        assert_eq!(
            lex("fn add(a, b) -> a + b"),
            vec![
                TokenKind::Keyword(Keyword::Fn),
                ident("add"),
                TokenKind::LParen,
                ident("a"),
                TokenKind::Comma,
                ident("b"),
                TokenKind::RParen,
                TokenKind::Arrow,
                ident("a"),
                TokenKind::Plus,
                ident("b"),
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_token_positions() {
        let (tokens, _) = tokenize("test", "ab\n  cd");
        assert_eq!((tokens[1].start.line, tokens[1].start.column), (1, 2));
        assert_eq!(tokens[1].end.column, 4);
        assert_eq!(tokens[2].kind, TokenKind::Eof);
        assert_eq!(tokens[2].start.index, 7);
    }
}
