//! Parse error representation and the thread-local "last error" record.
//!
//! The primary way to observe a parse failure is the `Result<Document,
//! JsonError>` returned directly by [`crate::parse`]. The thread-local slot
//! below exists for API parity with callers that cannot propagate a
//! `Result` (e.g. an FFI boundary), mirroring the teacher's runtime error
//! module.

use std::cell::RefCell;

/// Error codes, matching the abstract contract's `Ok, Memory, Syntax,
/// Depth, Number, String, Utf8, Io, Type` enumeration (`Ok` is represented
/// by the absence of an error).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    Memory,
    Syntax,
    Depth,
    Number,
    String,
    Utf8,
    Io,
    Type,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorCode::Memory => "Memory",
            ErrorCode::Syntax => "Syntax",
            ErrorCode::Depth => "Depth",
            ErrorCode::Number => "Number",
            ErrorCode::String => "String",
            ErrorCode::Utf8 => "Utf8",
            ErrorCode::Io => "Io",
            ErrorCode::Type => "Type",
        };
        f.write_str(name)
    }
}

/// A fully positioned parse failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseErrorInfo {
    pub code: ErrorCode,
    pub byte_position: usize,
    pub line: u32,
    pub column: u32,
    pub message: String,
}

impl std::fmt::Display for ParseErrorInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}: {} ({})",
            self.line, self.column, self.message, self.code
        )
    }
}

/// The error type returned from the public parsing API.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum JsonError {
    #[error("{0}")]
    Parse(ParseErrorInfo),

    #[error("I/O error reading input: {0}")]
    Io(String),
}

impl JsonError {
    pub fn code(&self) -> ErrorCode {
        match self {
            JsonError::Parse(info) => info.code,
            JsonError::Io(_) => ErrorCode::Io,
        }
    }
}

thread_local! {
    static LAST_ERROR: RefCell<Option<ParseErrorInfo>> = const { RefCell::new(None) };
}

/// Record a parse failure for the current thread. Called by the parser
/// immediately before it unwinds with `Err`.
pub fn set_last_error(info: ParseErrorInfo) {
    LAST_ERROR.with(|cell| *cell.borrow_mut() = Some(info));
}

/// Retrieve and clear the current thread's most recent parse failure, if
/// any.
pub fn take_last_error() -> Option<ParseErrorInfo> {
    LAST_ERROR.with(|cell| cell.borrow_mut().take())
}

/// Inspect the current thread's most recent parse failure without
/// clearing it.
pub fn peek_last_error() -> Option<ParseErrorInfo> {
    LAST_ERROR.with(|cell| cell.borrow().clone())
}

pub fn has_last_error() -> bool {
    LAST_ERROR.with(|cell| cell.borrow().is_some())
}

pub fn clear_last_error() {
    LAST_ERROR.with(|cell| *cell.borrow_mut() = None);
}
