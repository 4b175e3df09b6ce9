//! Errors raised at construction and decoding boundaries.
//!
//! Set algebra and membership never fail; only building a container from
//! caller-supplied storage or bytes can.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Caller-supplied storage does not have the size the representation requires.
    #[error("mismatch between buffer and storage requirements: {found} vs. {expected}")]
    InvalidArgument { found: usize, expected: usize },

    /// Decoded sparse keys are not strictly ascending.
    #[error("sparse keys are not strictly ascending at position {position}")]
    UnsortedKeys { position: usize },

    /// Reading or writing the binary layout failed, including a premature end of input.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
