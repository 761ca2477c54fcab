/// Size of the serialized state, as reported by [`Serializer::serialize_size`].
///
/// A size of zero means there is nothing to save.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SerializationInfo {
    pub size: usize,
}

impl SerializationInfo {
    pub fn new(size: usize) -> Self {
        Self { size }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }
}

impl From<usize> for SerializationInfo {
    fn from(size: usize) -> Self {
        Self { size }
    }
}

/// Owned serialized state.
///
/// The byte layout is opaque. Whoever holds the blob owns the buffer: handing
/// it to a sink moves it, dropping it releases it.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "SerializedBlob should be handed to a sink"]
pub struct SerializedBlob(Vec<u8>);

impl SerializedBlob {
    pub fn new(data: Vec<u8>) -> Self {
        Self(data)
    }

    #[allow(clippy::len_without_is_empty)]
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline(always)]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    #[inline]
    pub fn into_vec(self) -> Vec<u8> {
        self.0
    }
}

impl From<Vec<u8>> for SerializedBlob {
    fn from(value: Vec<u8>) -> Self {
        Self(value)
    }
}

impl From<&[u8]> for SerializedBlob {
    fn from(value: &[u8]) -> Self {
        Self(value.to_vec())
    }
}

impl AsRef<[u8]> for SerializedBlob {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// The state serialization engine.
///
/// `serialize_size` is the size query, `serialize` the producer. A push calls the
/// producer at most once. The dispatcher may call it from its worker thread
/// when serialization is deferred, hence `Send + Sync`.
pub trait Serializer: Send + Sync {
    /// Exact number of bytes needed to serialize the current state.
    fn serialize_size(&self) -> SerializationInfo;

    /// Serializes the current state, or returns `None` on failure.
    fn serialize(&self, size_hint: usize) -> Option<SerializedBlob>;
}
