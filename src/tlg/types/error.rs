//! Custom error types for the tlg-reader crate.

use thiserror::Error;

/// The primary error type for all operations in this crate.
///
/// The decoder itself is deliberately permissive: truncated opcode
/// arguments and unknown opcodes never produce an error (the corpus
/// carries decades of accumulated quirks). Errors are reserved for I/O
/// failures and explicit consumer-level conditions.
#[derive(Debug, Error)]
pub enum TlgError {
    /// An error originating from I/O operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The requested work ID was never seen in the text stream.
    #[error("work ID {0} not found")]
    WorkNotFound(String),
}

/// A convenience `Result` type alias using the crate's `TlgError` type.
pub type Result<T> = std::result::Result<T, TlgError>;
