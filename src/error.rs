use std::io;

use displaydoc::Display;

/// A specialized result type for the matrix driver.
pub type Result<T> = core::result::Result<T, Error>;

/// Errors that can occur while encoding or drawing frames.
#[derive(Debug, Display)]
pub enum Error {
    /// Bit index {0} is outside of the 0..=7 range.
    BitIndexOutOfRange(usize),
    /// Expected {expected} pixel flags, got {actual}.
    ShapeMismatch { expected: usize, actual: usize },
    /// Pixel ({row}, {col}) is outside of the 8x8 grid.
    PixelOutOfRange { row: usize, col: usize },
    /// Bus transport failure: {0}
    Transport(io::Error),
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Transport(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Transport(err)
    }
}
