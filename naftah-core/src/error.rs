//! Error taxonomy for the Naftah runtime (component H).
//!
//! Every user-visible failure is one of the kinds in [`ErrorKind`]; each carries the
//! source [`Position`] at which it was raised and, optionally, the error that caused it.
//! [`ErrorKind::Internal`] is reserved for programmer bugs in this implementation and is
//! rendered with a distinctive prefix so embedding code can tell it apart from user errors.

use std::fmt;

use crate::locale::{self, Locale};

/// Result type alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Line/column position within a source file, 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub const UNKNOWN: Position = Position { line: 0, column: 0 };

    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::UNKNOWN {
            write!(f, "?:?")
        } else {
            write!(f, "{}:{}", self.line, self.column)
        }
    }
}

/// The taxonomy of error kinds, per spec §4.H.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Syntax,
    Lexical,
    VariableNotFound,
    ConstantReassignment,
    TypeMismatch,
    Assignability,
    NullInput,
    EmptyArgument,
    DivisionByZero,
    Overflow,
    UnsupportedBitwiseDecimal,
    InvalidNumber,
    InvalidRadix,
    IndexOutOfBounds,
    KeyNotFound,
    NegativeNumber,
    InvocableNotFound,
    AmbiguousOverload,
    ArityMismatch,
    InvalidLoopLabel,
    OrphanSignal,
    AlreadySpawned,
    Cancelled,
    Timeout,
    ChannelClosed,
    NaNValue,
    InfiniteDecimal,
    HostInvocation,
    Internal,
}

impl ErrorKind {
    pub fn is_internal(self) -> bool {
        matches!(self, ErrorKind::Internal)
    }
}

/// A structured runtime error: kind, formatted message, source position, and an
/// optional cause chain (used by host-invocation failures, per §7).
#[derive(Debug, Clone)]
pub struct Error {
    pub kind: ErrorKind,
    pub detail: String,
    pub position: Position,
    pub cause: Option<Box<Error>>,
}

impl Error {
    pub fn new(kind: ErrorKind, detail: impl Into<String>, position: Position) -> Self {
        Self {
            kind,
            detail: detail.into(),
            position,
            cause: None,
        }
    }

    pub fn at(kind: ErrorKind, position: Position) -> Self {
        Self::new(kind, String::new(), position)
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, detail, Position::UNKNOWN)
    }

    pub fn with_cause(mut self, cause: Error) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    /// Render this error through the given localization bundle, per §4.H: "all messages
    /// are formatted from a resource bundle keyed by kind; the default bundle is Arabic."
    pub fn localized(&self, locale: Locale) -> String {
        let template = locale::message(locale, self.kind);
        let body = if self.detail.is_empty() {
            template.to_string()
        } else {
            format!("{template}: {}", self.detail)
        };
        if self.kind.is_internal() {
            format!("{} {body} ({})", locale::internal_prefix(locale), self.position)
        } else {
            format!("{body} ({})", self.position)
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.localized(Locale::Arabic))
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause.as_deref().map(|e| e as &(dyn std::error::Error))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn internal_errors_carry_distinctive_prefix() {
        let err = Error::internal("scope stack underflow");
        let rendered = err.localized(Locale::Arabic);
        assert!(rendered.starts_with(locale::internal_prefix(Locale::Arabic)));
    }

    #[test]
    fn user_errors_report_position() {
        let err = Error::new(ErrorKind::DivisionByZero, "10 / 0", Position::new(3, 7));
        let rendered = err.localized(Locale::Arabic);
        assert!(rendered.contains("3:7"));
    }

    #[test]
    fn cause_chain_is_preserved() {
        let cause = Error::new(ErrorKind::HostInvocation, "ctor threw", Position::UNKNOWN);
        let err = Error::new(ErrorKind::HostInvocation, "construct failed", Position::new(1, 1))
            .with_cause(cause);
        assert!(err.cause.is_some());
    }
}
