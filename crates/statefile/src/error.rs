use std::{io, result};

use thiserror::Error;

pub type Result<T, E = Error> = result::Result<T, E>;

/// Error types for statefile operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    IO(#[from] io::Error),

    // Path errors
    #[error("State path is empty")]
    EmptyPath,

    #[error("State path is {len} bytes long, limit is {max}")]
    PathTooLong { len: usize, max: usize },
}
