use std::{path::Path, sync::Arc};

use log::{error, info};
use statefile::StateFile;

use crate::{
    Dispatcher, Error, Payload, PushOptions, Result, SaveRequest, SerializedBlob, Serializer,
    UndoSlot,
};

/// Serializes the current state and routes it to disk or to the undo slot.
///
/// Four policies come out of [`StatePusher::push`]:
///
/// | target | existing file, manual save | otherwise    |
/// |--------|----------------------------|--------------|
/// | disk   | `load_then_save` (backup)  | `save`       |
/// | memory | undo slot                  | undo slot    |
///
/// and [`PushOptions::background_serialization`] decides whether disk saves
/// carry a ready blob or let the dispatcher serialize.
#[derive(Debug)]
pub struct StatePusher<S, D>
where
    S: ?Sized,
{
    serializer: Arc<S>,
    dispatcher: D,
    undo: UndoSlot,
    options: PushOptions,
}

impl<S, D> StatePusher<S, D>
where
    S: Serializer + ?Sized,
    D: Dispatcher,
{
    pub fn new(serializer: Arc<S>, dispatcher: D, undo: UndoSlot, options: PushOptions) -> Self {
        Self {
            serializer,
            dispatcher,
            undo,
            options,
        }
    }

    /// Saves the current state for `path`.
    ///
    /// With `save_to_disk`, the state goes to the dispatcher; an existing file at
    /// `path` is backed up first unless `autosave` is set. Without it, the state
    /// replaces the undo slot's content.
    ///
    /// Nothing is retried. On error the undo slot holds what it held before the call.
    pub fn push(&self, path: impl AsRef<Path>, save_to_disk: bool, autosave: bool) -> Result<()> {
        let path = path.as_ref();

        let info = self.serializer.serialize_size();
        if info.is_empty() {
            error!("Failed to save state to {path:?}: nothing to serialize");
            return Err(Error::EmptyState);
        }
        let size = info.size;

        StateFile::validate(path)?;

        let blob = if self.options.background_serialization {
            None
        } else {
            let blob = self.serialize(path, size)?;
            info!("Saving state {path:?}, {} bytes.", blob.len());
            Some(blob)
        };

        if save_to_disk {
            self.push_to_disk(path, blob, size, autosave);
            Ok(())
        } else {
            self.push_to_memory(path, blob, size)
        }
    }

    fn push_to_disk(&self, path: &Path, blob: Option<SerializedBlob>, size: usize, autosave: bool) {
        let size = blob.as_ref().map_or(size, SerializedBlob::len);
        let request = SaveRequest::new(path, Payload::from(blob), size, autosave);

        if !autosave && self.dispatcher.path_exists(path) {
            info!("File already exists. Saving to backup buffer...");
            self.dispatcher.load_then_save(request);
        } else {
            self.dispatcher.save(request);
        }
    }

    fn push_to_memory(&self, path: &Path, blob: Option<SerializedBlob>, size: usize) -> Result<()> {
        // Memory saves never defer serialization
        let blob = match blob {
            Some(blob) => blob,
            None => self.serialize(path, size)?,
        };
        self.undo.store(blob, path, self.options.undo_limit)
    }

    fn serialize(&self, path: &Path, size: usize) -> Result<SerializedBlob> {
        let Some(blob) = self.serializer.serialize(size) else {
            error!("Failed to save state to {path:?}");
            return Err(Error::SerializationFailed {
                path: path.to_owned(),
            });
        };
        Ok(blob)
    }

    #[inline(always)]
    pub fn undo(&self) -> &UndoSlot {
        &self.undo
    }

    #[inline(always)]
    pub fn dispatcher(&self) -> &D {
        &self.dispatcher
    }

    #[inline(always)]
    pub fn serializer(&self) -> &Arc<S> {
        &self.serializer
    }

    #[inline(always)]
    pub fn options(&self) -> PushOptions {
        self.options
    }
}
