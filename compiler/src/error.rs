use thiserror::Error;

/// The class of failure that stopped a pattern from compiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParseErrKind {
    /// Scratch or program storage could not be allocated.
    #[error("out of memory")]
    OutOfMemory,
    /// The group nesting or recursion depth limit was exceeded.
    #[error("nesting limit exceeded")]
    StackOverflow,
    /// Dangling quantifiers, unbalanced groups or sets, and dangling escapes.
    #[error("syntax error")]
    SyntaxError,
}

/// A compilation failure, carrying the byte offset into the pattern where it
/// was detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{kind} at offset {offset}")]
pub struct ParseErr {
    pub kind: ParseErrKind,
    pub offset: usize,
}

impl ParseErr {
    pub fn new(kind: ParseErrKind, offset: usize) -> Self {
        Self { kind, offset }
    }

    pub fn out_of_memory(offset: usize) -> Self {
        Self::new(ParseErrKind::OutOfMemory, offset)
    }

    pub fn stack_overflow(offset: usize) -> Self {
        Self::new(ParseErrKind::StackOverflow, offset)
    }

    pub fn syntax(offset: usize) -> Self {
        Self::new(ParseErrKind::SyntaxError, offset)
    }
}
