use crate::interpreter::context::Context;
use crate::position::Position;
use owo_colors::OwoColorize;
use std::fmt;
use std::rc::Rc;

/// Filename the interactive shell uses. Errors raised outside any frame in
/// this file are reported against a synthetic `<program>` frame.
pub const REPL_FILENAME: &str = "<stdin>";
pub const PROGRAM_LABEL: &str = "<program>";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeErrorKind {
    IllegalOperation,
    ZeroDivision,
    Undefined,
    ArityMismatch,
    NoValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    IllegalCharacter,
    SyntaxError,
    Runtime(RuntimeErrorKind),
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::IllegalCharacter => write!(f, "IllegalCharacter"),
            ErrorKind::SyntaxError => write!(f, "SyntaxError"),
            ErrorKind::Runtime(RuntimeErrorKind::ZeroDivision) => write!(f, "ZeroDivisionError"),
            ErrorKind::Runtime(_) => write!(f, "RuntimeError"),
        }
    }
}

/// A located failure from any stage of the pipeline.
///
/// Lexer and parser diagnostics carry no context; runtime diagnostics carry
/// the frame they were raised in, which is what the traceback walks.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub kind: ErrorKind,
    pub message: String,
    pub context: Option<Rc<Context>>,
    pub start: Position,
    pub end: Position,
}

impl Diagnostic {
    pub fn new(kind: ErrorKind, message: impl Into<String>, start: Position, end: Position) -> Self {
        Self {
            kind,
            message: message.into(),
            context: None,
            start,
            end,
        }
    }

    pub fn illegal_character(message: impl Into<String>, start: Position, end: Position) -> Self {
        Self::new(ErrorKind::IllegalCharacter, message, start, end)
    }

    pub fn syntax(message: impl Into<String>, start: Position, end: Position) -> Self {
        Self::new(ErrorKind::SyntaxError, message, start, end)
    }

    pub fn runtime(
        kind: RuntimeErrorKind,
        message: impl Into<String>,
        context: &Rc<Context>,
        start: Position,
        end: Position,
    ) -> Self {
        Self::new(ErrorKind::Runtime(kind), message, start, end).with_context(Rc::clone(context))
    }

    pub fn with_context(mut self, context: Rc<Context>) -> Self {
        self.context = Some(context);
        self
    }

    pub fn runtime_kind(&self) -> Option<RuntimeErrorKind> {
        match self.kind {
            ErrorKind::Runtime(kind) => Some(kind),
            _ => None,
        }
    }

    /// Call-stack frames for the traceback, outermost first.
    pub fn frames(&self) -> Vec<Frame> {
        if self.context.is_none() && &*self.start.filename == REPL_FILENAME {
            return vec![Frame::at(&self.start, PROGRAM_LABEL)];
        }

        let mut frames = Vec::new();
        let mut position = Some(self.start.clone());
        let mut context = self.context.clone();

        while let (Some(ctx), Some(pos)) = (context.take(), position.take()) {
            frames.push(Frame::at(&pos, &ctx.label));
            position = ctx.call_site.clone();
            context = ctx.parent.clone();
        }

        frames.reverse();
        frames
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&DiagnosticRenderer::new(false).render(self))
    }
}

impl std::error::Error for Diagnostic {}

/// One traceback line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub filename: Rc<str>,
    pub line: usize,
    pub label: Rc<str>,
}

impl Frame {
    fn at(position: &Position, label: &str) -> Self {
        Self {
            filename: Rc::clone(&position.filename),
            line: position.line + 1,
            label: Rc::from(label),
        }
    }
}

pub struct DiagnosticRenderer {
    use_color: bool,
}

impl DiagnosticRenderer {
    pub fn new(use_color: bool) -> Self {
        Self { use_color }
    }

    pub fn render(&self, diagnostic: &Diagnostic) -> String {
        let mut lines = vec!["Traceback (most recent call last):".to_string()];

        for frame in diagnostic.frames() {
            lines.push(format!(
                "  File {}, line {}, in {}",
                frame.filename, frame.line, frame.label
            ));
        }

        let header = if diagnostic.message.is_empty() {
            diagnostic.kind.to_string()
        } else {
            format!("{}: {}", diagnostic.kind, diagnostic.message)
        };
        lines.push(self.style_error(&header));

        let (source_line, carets) = underline(&diagnostic.start, &diagnostic.end);
        lines.push(format!("    {}", source_line));
        lines.push(format!("    {}", self.style_error(&carets)));

        lines.join("\n")
    }

    fn style_error(&self, s: &str) -> String {
        if self.use_color {
            s.red().bold().to_string()
        } else {
            s.to_string()
        }
    }
}

pub fn render_diagnostic(diagnostic: &Diagnostic, use_color: bool) -> String {
    DiagnosticRenderer::new(use_color).render(diagnostic)
}

/// Source line holding `start`, and a caret line under `start..end`.
///
/// At least one caret is drawn. A span ending on a later line is
/// underlined to the end of the start line.
fn underline(start: &Position, end: &Position) -> (String, String) {
    let line = start.source_line();
    let start_col = start.column;
    let end_col = if end.line == start.line {
        end.column
    } else {
        line.chars().count()
    };
    let end_col = end_col.max(start_col + 1);

    let carets = format!("{}{}", " ".repeat(start_col), "^".repeat(end_col - start_col));
    (line.to_string(), carets)
}
