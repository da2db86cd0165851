//! Codec error types

use thiserror::Error;

use super::OpCode;

/// Wire codec errors
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed or missing field at encode time (caller error)
    #[error("invalid argument: {field}: {reason}")]
    InvalidArgument {
        /// Offending field
        field: &'static str,
        /// What was wrong with it
        reason: String,
    },

    /// A cstring field has no NUL terminator before the buffer ends
    #[error("malformed string: no NUL terminator after byte offset {offset}")]
    MalformedString {
        /// Byte offset where the string begins
        offset: usize,
    },

    /// A cstring field holds invalid UTF-8
    #[error("invalid UTF-8 in string at byte offset {offset}")]
    InvalidUtf8 {
        /// Byte offset where the string begins
        offset: usize,
    },

    /// A document's length prefix is impossible: negative or below the
    /// minimum encoded size
    #[error("invalid document length at byte offset {offset}: prefix declares {declared}")]
    InvalidDocumentLength {
        /// Byte offset where the document begins
        offset: usize,
        /// Raw length prefix from the wire
        declared: i32,
    },

    /// A document's declared length exceeds the bytes remaining
    #[error("truncated document at byte offset {offset}: need {needed} bytes, {remaining} remain")]
    TruncatedDocument {
        /// Byte offset where the document begins
        offset: usize,
        /// Bytes the document declares for itself
        needed: usize,
        /// Bytes actually remaining
        remaining: usize,
    },

    /// Header `message_length` disagrees with the received buffer length
    #[error("length mismatch: header declares {declared} bytes, buffer holds {actual}")]
    LengthMismatch {
        /// Length from the header
        declared: i32,
        /// Actual buffer length
        actual: usize,
    },

    /// Integer op code with no mapping
    #[error("unknown op code: {code}")]
    UnknownOpCode {
        /// The unmapped integer
        code: i32,
    },

    /// A must-be-zero field holds a nonzero value
    #[error("reserved field violation: {field} must be zero, got {value}")]
    ReservedFieldViolation {
        /// Offending field
        field: &'static str,
        /// Value found on the wire
        value: i32,
    },

    /// Document stream holds the wrong number of documents for the op
    #[error("wrong document count for {op}: expected {expected}, got {got}")]
    WrongDocumentCount {
        /// Op code being decoded
        op: OpCode,
        /// Expected count, e.g. "exactly 2"
        expected: &'static str,
        /// Documents actually found
        got: usize,
    },

    /// kill_cursors body length disagrees with its declared cursor count
    #[error("cursor count mismatch: body declares {declared} cursor ids, {remaining} bytes remain")]
    CursorCountMismatch {
        /// Cursor count from the body
        declared: i32,
        /// Body bytes remaining after the count
        remaining: usize,
    },

    /// Bytes remain after a fully decoded body
    #[error("trailing bytes after {op} body: {count}")]
    TrailingBytes {
        /// Op code being decoded
        op: OpCode,
        /// Leftover byte count
        count: usize,
    },

    /// Buffer too small for a fixed-width read
    #[error("buffer too small: need {needed} bytes, got {got}")]
    BufferTooSmall {
        /// Needed size
        needed: usize,
        /// Actual size
        got: usize,
    },
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
