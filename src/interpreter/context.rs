use super::environment::SymbolTable;
use crate::diagnostic::PROGRAM_LABEL;
use crate::position::Position;
use std::fmt;
use std::rc::Rc;

/// One call-stack frame.
///
/// `parent` is the caller's frame and `call_site` the position of the call
/// in the caller; together they rebuild the traceback. Name resolution goes
/// through `symbols` only.
pub struct Context {
    pub label: Rc<str>,
    pub parent: Option<Rc<Context>>,
    pub call_site: Option<Position>,
    pub symbols: Rc<SymbolTable>,
}

impl Context {
    /// The `<program>` frame over the given global table.
    pub fn root(symbols: Rc<SymbolTable>) -> Rc<Self> {
        Rc::new(Self {
            label: Rc::from(PROGRAM_LABEL),
            parent: None,
            call_site: None,
            symbols,
        })
    }

    pub fn call(label: Rc<str>, caller: &Rc<Context>, call_site: Position, symbols: Rc<SymbolTable>) -> Rc<Self> {
        Rc::new(Self {
            label,
            parent: Some(Rc::clone(caller)),
            call_site: Some(call_site),
            symbols,
        })
    }

    /// Number of frames from here to the root, inclusive.
    pub fn depth(&self) -> usize {
        let mut depth = 1;
        let mut frame = self.parent.as_deref();
        while let Some(ctx) = frame {
            depth += 1;
            frame = ctx.parent.as_deref();
        }
        depth
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("label", &self.label)
            .field("depth", &self.depth())
            .field("call_site", &self.call_site)
            .finish_non_exhaustive()
    }
}
