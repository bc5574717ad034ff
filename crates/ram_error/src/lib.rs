//! Shared error and diagnostic types for the `ram` toolchain.
//!
//! Every stage of the pipeline (lexing, parsing, compiling, interpreting)
//! reports failures through the [`Error`] enum defined here so that the CLI
//! front ends have a single place to turn a failure into a human-readable,
//! `miette`-rendered diagnostic.

use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

/// A 0-indexed line/column position together with the width of the
/// offending token, used to build [`SourceSpan`] labels for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub line: usize,
    pub column: usize,
    pub len: usize,
}

impl Span {
    #[must_use]
    pub fn new(line: usize, column: usize, len: usize) -> Self {
        Self { line, column, len }
    }

    /// Build a span covering just the given column, width 1.
    #[must_use]
    pub fn point(line: usize, column: usize) -> Self {
        Self { line, column, len: 1 }
    }
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "L{}:C{}", self.line, self.column)
    }
}

/// The full error taxonomy of the `ram` toolchain, as laid out in the
/// design's error-handling section: lex/parse failures, compile failures,
/// and the fatal runtime conditions the interpreter can hit.
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    /// Illegal token sequence in RAM assembly or Pidgin ALGOL source, a
    /// forbidden literal operand for STORE/READ, or end-of-input before a
    /// required token.
    #[error("parse error: {message} at {span}")]
    #[diagnostic(code(ram::parse_error))]
    Parse { message: String, span: Span },

    /// Unknown statement/expression class, invalid operator context, or a
    /// literal-zero divisor encountered while lowering Pidgin ALGOL to RAM.
    #[error("compile error: {message}")]
    #[diagnostic(code(ram::compile_error))]
    Compile { message: String, span: Option<Span> },

    /// `step`/`run` invoked on an already-halted interpreter.
    #[error("attempt to step a halted machine")]
    #[diagnostic(code(ram::halt_error))]
    Halt,

    /// Legacy policy: reading past the end of the input tape. The canonical
    /// interpreter never raises this (it pads with zero instead); kept so
    /// callers that opt into strict mode can surface it.
    #[error("attempt to read past end of input tape")]
    #[diagnostic(code(ram::read_error))]
    Read,

    /// Read from a register that has never been written.
    #[error("read from uninitialized memory register {register}")]
    #[diagnostic(code(ram::uninitialized_register))]
    UninitializedRegister { register: i64 },

    /// Jump to an unresolved label, or fetch past the end of the
    /// instruction list. Both indicate a malformed [`Program`] and should be
    /// impossible to construct through the public parser/compiler APIs.
    #[error("internal interpreter error: {0}")]
    #[diagnostic(code(ram::internal_error))]
    Internal(String),

    #[error("io error: {0}")]
    #[diagnostic(code(ram::io_error))]
    Io(#[from] std::io::Error),
}

impl Error {
    #[must_use]
    pub fn parse(message: impl Into<String>, span: Span) -> Self {
        Self::Parse { message: message.into(), span }
    }

    #[must_use]
    pub fn compile(message: impl Into<String>) -> Self {
        Self::Compile { message: message.into(), span: None }
    }

    #[must_use]
    pub fn compile_at(message: impl Into<String>, span: Span) -> Self {
        Self::Compile { message: message.into(), span: Some(span) }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Convert a [`Span`] into a `miette` [`SourceSpan`] over a given source
/// string, resolving line/column into a byte offset.
#[must_use]
pub fn source_span(src: &str, span: Span) -> SourceSpan {
    let mut offset = 0usize;
    for (i, line) in src.split('\n').enumerate() {
        if i == span.line {
            offset += span.column;
            break;
        }
        offset += line.len() + 1;
    }
    SourceSpan::new(offset.into(), span.len.max(1))
}
