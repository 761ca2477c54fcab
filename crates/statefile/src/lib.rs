#![doc = include_str!("../README.md")]

pub mod error;
mod state_file;

pub use error::*;
pub use state_file::*;

/// Longest accepted state path, in bytes.
pub const MAX_PATH_LEN: usize = 4096;

/// Extension appended to the target path while a write is in flight.
pub(crate) const TMP_EXTENSION: &str = "tmp";
