use std::{
    path::{Path, PathBuf},
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

use log::{debug, error};
use parking_lot::{Mutex, MutexGuard};

use crate::{Error, Result, SerializedBlob};

/// State held by the undo slot: the serialized bytes and the path they were pushed for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UndoState {
    data: Vec<u8>,
    path: PathBuf,
}

impl UndoState {
    #[allow(clippy::len_without_is_empty)]
    #[inline(always)]
    pub fn size(&self) -> usize {
        self.data.len()
    }

    #[inline(always)]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    #[inline(always)]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[inline]
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }
}

/// Single-slot holder for the most recently superseded state.
///
/// Cloning yields another handle to the same slot. The slot holds at most one
/// buffer: installing a new one releases the previous one under the same lock,
/// so readers never observe an evicted-but-not-yet-replaced slot.
#[derive(Debug, Clone, Default)]
#[must_use = "UndoSlot should be stored to keep the undo state alive"]
pub struct UndoSlot(Arc<UndoSlotInner>);
#[derive(Debug, Default)]
struct UndoSlotInner {
    state: Mutex<Option<UndoState>>,
    /// Buffers released by eviction over the slot's lifetime.
    evictions: AtomicUsize,
}

impl UndoSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copies `blob` into a freshly allocated buffer of exactly `blob.len()` bytes
    /// and installs it, evicting whatever the slot held.
    ///
    /// The blob is released in every case. If the buffer cannot be allocated, or
    /// would exceed `limit`, the slot is left untouched and
    /// [`Error::OutOfMemory`] is returned.
    pub fn store(&self, blob: SerializedBlob, path: &Path, limit: usize) -> Result<()> {
        let size = blob.len();

        let data = if size > limit {
            None
        } else {
            Self::allocate(size)
        };
        let Some(mut data) = data else {
            error!("Could not allocate {size} bytes for the undo buffer of {path:?}");
            return Err(Error::OutOfMemory { requested: size });
        };

        data.extend_from_slice(blob.as_bytes());
        drop(blob);

        self.evict_and_replace(data, path.to_owned());
        Ok(())
    }

    fn allocate(size: usize) -> Option<Vec<u8>> {
        let mut data = Vec::new();
        data.try_reserve_exact(size).ok()?;
        Some(data)
    }

    /// Releases the current buffer, if any, and installs `data` for `path`.
    ///
    /// Returns true if a previous buffer was evicted.
    pub fn evict_and_replace(&self, data: Vec<u8>, path: PathBuf) -> bool {
        let size = data.len();
        let previous = self.state().replace(UndoState { data, path });
        let evicted = previous.is_some();
        if evicted {
            self.0.evictions.fetch_add(1, Ordering::Relaxed);
        }
        drop(previous);
        debug!("Undo slot now holds {size} bytes (evicted: {evicted})");
        evicted
    }

    /// Releases the current buffer, leaving the slot empty.
    ///
    /// Returns true if there was anything to release.
    pub fn evict(&self) -> bool {
        let evicted = self.state().take().is_some();
        if evicted {
            self.0.evictions.fetch_add(1, Ordering::Relaxed);
        }
        evicted
    }

    /// Moves the held state out, leaving the slot empty.
    ///
    /// This is how an undo-apply consumes the slot; it does not count as an eviction.
    pub fn take(&self) -> Option<UndoState> {
        self.state().take()
    }

    /// Returns a copy of the held state.
    pub fn snapshot(&self) -> Option<UndoState> {
        self.state().clone()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.state().is_none()
    }

    /// Size of the held buffer, 0 when empty.
    #[inline]
    pub fn size(&self) -> usize {
        self.state().as_ref().map_or(0, UndoState::size)
    }

    pub fn path(&self) -> Option<PathBuf> {
        self.state().as_ref().map(|state| state.path.clone())
    }

    /// Number of buffers released by eviction so far.
    #[inline]
    pub fn evictions(&self) -> usize {
        self.0.evictions.load(Ordering::Relaxed)
    }

    #[inline(always)]
    fn state(&self) -> MutexGuard<'_, Option<UndoState>> {
        self.0.state.lock()
    }
}
