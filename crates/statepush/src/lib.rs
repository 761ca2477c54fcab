#![doc = include_str!("../README.md")]

pub use statefile::{Error as StateFileError, MAX_PATH_LEN, StateFile};

mod dispatcher;
mod error;
mod options;
mod pusher;
mod request;
mod serializer;
mod task;
mod undo_slot;

pub use dispatcher::*;
pub use error::*;
pub use options::*;
pub use pusher::*;
pub use request::*;
pub use serializer::*;
pub use task::*;
pub use undo_slot::*;
