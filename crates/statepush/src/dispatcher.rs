use std::{path::Path, sync::Arc};

use statefile::StateFile;

use crate::SaveRequest;

/// Receives disk saves from the pusher and performs them off the caller's critical path.
///
/// Both operations are fire-and-forget: the pusher observes no result. Failures
/// after the hand-off are the dispatcher's to report.
pub trait Dispatcher: Send + Sync {
    /// Returns true if `path` names an existing state file that a save would overwrite.
    fn path_exists(&self, path: &Path) -> bool {
        StateFile::exists(path)
    }

    /// Writes the request's state to its path.
    fn save(&self, request: SaveRequest);

    /// Reads the existing file at the request's path into a backup location,
    /// then writes the request's state over it.
    fn load_then_save(&self, request: SaveRequest);
}

impl<D> Dispatcher for Arc<D>
where
    D: Dispatcher + ?Sized,
{
    fn path_exists(&self, path: &Path) -> bool {
        (**self).path_exists(path)
    }

    fn save(&self, request: SaveRequest) {
        (**self).save(request)
    }

    fn load_then_save(&self, request: SaveRequest) {
        (**self).load_then_save(request)
    }
}
