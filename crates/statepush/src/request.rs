use std::path::{Path, PathBuf};

use crate::SerializedBlob;

/// What a save request carries to the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// Serialization already happened on the caller's thread.
    Ready(SerializedBlob),
    /// The dispatcher must run the serializer itself.
    Deferred,
}

impl Payload {
    #[inline]
    pub fn is_deferred(&self) -> bool {
        matches!(self, Self::Deferred)
    }

    pub fn blob(&self) -> Option<&SerializedBlob> {
        match self {
            Self::Ready(blob) => Some(blob),
            Self::Deferred => None,
        }
    }
}

impl From<Option<SerializedBlob>> for Payload {
    fn from(value: Option<SerializedBlob>) -> Self {
        value.map_or(Self::Deferred, Self::Ready)
    }
}

/// A disk save handed from the pusher to a [`Dispatcher`](crate::Dispatcher).
///
/// The request owns its payload; once dispatched, the caller has no further
/// claim on the serialized buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveRequest {
    pub path: PathBuf,
    pub payload: Payload,
    /// Byte count of a ready payload, or the reported size hint for a deferred one.
    pub size: usize,
    pub autosave: bool,
}

impl SaveRequest {
    pub fn new(path: &Path, payload: Payload, size: usize, autosave: bool) -> Self {
        Self {
            path: path.to_owned(),
            payload,
            size,
            autosave,
        }
    }
}
