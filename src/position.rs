use std::fmt;
use std::rc::Rc;

/// Cursor into a source file.
///
/// `line` and `column` are zero-based; `index` is a byte offset into `text`.
/// Positions are plain values: the lexer advances its own copy and stamps
/// clones onto tokens, so nothing downstream ever observes a moving cursor.
#[derive(Clone, PartialEq, Eq)]
pub struct Position {
    pub index: usize,
    pub line: usize,
    pub column: usize,
    pub filename: Rc<str>,
    pub text: Rc<str>,
}

impl Position {
    pub fn start(filename: impl Into<Rc<str>>, text: impl Into<Rc<str>>) -> Self {
        Self {
            index: 0,
            line: 0,
            column: 0,
            filename: filename.into(),
            text: text.into(),
        }
    }

    /// Steps over `current`, which must be the character at `index`.
    pub fn advance(&mut self, current: Option<char>) -> &mut Self {
        self.index += current.map_or(1, char::len_utf8);
        self.column += 1;

        if current == Some('\n') {
            self.line += 1;
            self.column = 0;
        }
        self
    }

    pub fn current(&self) -> Option<char> {
        self.text.get(self.index..).and_then(|rest| rest.chars().next())
    }

    pub fn peek(&self) -> Option<char> {
        let mut chars = self.text.get(self.index..)?.chars();
        chars.next()?;
        chars.next()
    }

    pub fn is_at_end(&self) -> bool {
        self.index >= self.text.len()
    }

    /// A copy moved forward to the end of the current line.
    pub fn line_end(&self) -> Position {
        let mut end = self.clone();
        while let Some(c) = end.current().filter(|c| *c != '\n') {
            end.advance(Some(c));
        }
        end
    }

    /// The full source line this position sits on, without its newline.
    pub fn source_line(&self) -> &str {
        self.text.split('\n').nth(self.line).unwrap_or(&self.text[..])
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.filename, self.line + 1, self.column + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_tracks_lines() {
        let mut pos = Position::start("t", "ab\ncd");
        pos.advance(Some('a')).advance(Some('b'));
        assert_eq!((pos.line, pos.column, pos.index), (0, 2, 2));

        pos.advance(Some('\n'));
        assert_eq!((pos.line, pos.column, pos.index), (1, 0, 3));
        assert_eq!(pos.current(), Some('c'));
        assert_eq!(pos.peek(), Some('d'));
        assert_eq!(pos.source_line(), "cd");
    }

    #[test]
    fn test_peek_at_end() {
        let mut pos = Position::start("t", "x");
        assert_eq!(pos.peek(), None);
        pos.advance(Some('x'));
        assert!(pos.is_at_end());
        assert_eq!(pos.current(), None);
    }

    #[test]
    fn test_line_end_stops_before_newline() {
        let pos = Position::start("t", "abc\ndef");
        let end = pos.line_end();
        assert_eq!((end.line, end.column, end.index), (0, 3, 3));
        assert_eq!(end.line_end().index, 3);
    }
}
