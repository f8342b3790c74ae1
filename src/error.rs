//! Error type used throughout the evaluator.

use std::borrow::Cow;
use std::fmt;

/// Represents a failure during evaluation.
///
/// Errors carry a [`ErrorKind`] plus a human-readable detail string. There is
/// no partial-output recovery: once `run` returns an `Err` the render is
/// aborted (§7).
pub struct Error {
    kind: ErrorKind,
    detail: Option<Cow<'static, str>>,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

/// Describes the kind of error that occurred.
///
/// Names are illustrative (matching `spec.md` §7's categories), not a
/// stable wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    /// An AST node kind the evaluator does not know how to handle.
    UnknownNode,
    /// A binary/unary operator applied to incompatible operand types.
    InvalidOperation,
    /// A filter name not present in the filter registry for the receiver type.
    UnknownFilter,
    /// A test name not present in the test registry.
    UnknownTest,
    /// An attempt to call a value that is not a `Function`.
    NotCallable,
    /// Wrong number of positional arguments (too few or too many).
    ArityMismatch,
    /// A required argument (positional or keyword) was not supplied.
    MissingArgument,
    /// An argument's type or value was invalid for the operation performed.
    InvalidArgument,
    /// A `TupleLiteral`/identifier destructuring target had the wrong shape.
    CannotUnpack,
    /// `Set` to a `MemberExpression` whose target is not an `Object`, or a
    /// `MemberExpression`/`Set` key that is not a string `Identifier`.
    InvalidAssignmentTarget,
    /// A `break`/`continue` signal escaped its enclosing loop frame.
    LoopControlOutsideLoop,
    /// Value could not be serialized to JSON by the `tojson` filter.
    BadSerialization,
}

impl ErrorKind {
    fn description(self) -> &'static str {
        match self {
            ErrorKind::UnknownNode => "unknown AST node",
            ErrorKind::InvalidOperation => "invalid operation",
            ErrorKind::UnknownFilter => "unknown filter",
            ErrorKind::UnknownTest => "unknown test",
            ErrorKind::NotCallable => "value is not callable",
            ErrorKind::ArityMismatch => "wrong number of arguments",
            ErrorKind::MissingArgument => "missing argument",
            ErrorKind::InvalidArgument => "invalid argument",
            ErrorKind::CannotUnpack => "cannot unpack value",
            ErrorKind::InvalidAssignmentTarget => "invalid assignment target",
            ErrorKind::LoopControlOutsideLoop => "break/continue outside of a loop",
            ErrorKind::BadSerialization => "could not serialize to JSON",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

impl Error {
    /// Creates a new error with a kind and a detail message.
    pub fn new<D: Into<Cow<'static, str>>>(kind: ErrorKind, detail: D) -> Error {
        Error {
            kind,
            detail: Some(detail.into()),
            source: None,
        }
    }

    /// Attaches a source error (for errors caused by, e.g., JSON
    /// serialization failures).
    pub fn with_source<E: std::error::Error + Send + Sync + 'static>(mut self, source: E) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Returns the error kind.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the detail message, if any.
    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Error");
        s.field("kind", &self.kind);
        if let Some(ref detail) = self.detail {
            s.field("detail", detail);
        }
        s.finish()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.detail {
            Some(ref detail) => write!(f, "{}: {}", self.kind, detail),
            None => write!(f, "{}", self.kind),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_deref().map(|e| e as _)
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error {
            kind,
            detail: None,
            source: None,
        }
    }
}
