use std::{io, path::PathBuf, result};

use thiserror::Error;

pub type Result<T, E = Error> = result::Result<T, E>;

/// Error types for statepush operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    IO(#[from] io::Error),
    #[error(transparent)]
    StateFile(#[from] statefile::Error),

    #[error("Nothing to save: serialized state size is zero")]
    EmptyState,
    #[error("Failed to save state to {path:?}")]
    SerializationFailed { path: PathBuf },
    #[error("Out of memory: cannot allocate {requested} bytes for the undo buffer")]
    OutOfMemory { requested: usize },
}
