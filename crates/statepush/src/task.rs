use std::{
    panic::{self, AssertUnwindSafe},
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
        mpsc::{self, Receiver, Sender},
    },
    thread::{self, JoinHandle},
};

use log::{debug, error, info, warn};
use parking_lot::{Condvar, Mutex};
use statefile::StateFile;

use crate::{Dispatcher, Payload, Result, SaveRequest, SerializedBlob, Serializer, UndoSlot};

const WORKER_NAME: &str = "statepush-task";

/// Counters of finished dispatcher jobs.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TaskStats {
    pub saved: usize,
    pub failed: usize,
}

#[derive(Debug)]
struct Job {
    request: SaveRequest,
    backup: bool,
}

/// [`Dispatcher`] running every save on one background worker thread, in submission order.
///
/// Deferred payloads are serialized on the worker with the serializer given at
/// construction. `load_then_save` copies the file about to be overwritten into
/// the backup slot first, so an undo-of-save can restore it.
///
/// Dropping the dispatcher finishes every queued job before the worker exits.
pub struct TaskDispatcher {
    inner: Arc<TaskInner>,
    sender: Option<Sender<Job>>,
    worker: Option<JoinHandle<()>>,
}

struct TaskInner {
    serializer: Arc<dyn Serializer>,
    backup: UndoSlot,
    /// Files larger than this are overwritten without a backup.
    backup_limit: usize,
    pending: Mutex<usize>,
    idle: Condvar,
    saved: AtomicUsize,
    failed: AtomicUsize,
}

impl TaskDispatcher {
    /// Spawns the worker thread.
    pub fn new(serializer: Arc<dyn Serializer>) -> Result<Self> {
        Self::with_backup(serializer, UndoSlot::new())
    }

    /// Spawns the worker thread, storing overwritten files in `backup`.
    pub fn with_backup(serializer: Arc<dyn Serializer>, backup: UndoSlot) -> Result<Self> {
        Self::with_backup_limit(serializer, backup, usize::MAX)
    }

    /// Like [`TaskDispatcher::with_backup`], but existing files larger than
    /// `backup_limit` bytes are overwritten without being backed up.
    pub fn with_backup_limit(
        serializer: Arc<dyn Serializer>,
        backup: UndoSlot,
        backup_limit: usize,
    ) -> Result<Self> {
        let inner = Arc::new(TaskInner {
            serializer,
            backup,
            backup_limit,
            pending: Mutex::new(0),
            idle: Condvar::new(),
            saved: AtomicUsize::new(0),
            failed: AtomicUsize::new(0),
        });

        let (sender, receiver) = mpsc::channel();
        let worker_inner = Arc::clone(&inner);
        let worker = thread::Builder::new()
            .name(WORKER_NAME.to_owned())
            .spawn(move || worker_inner.work(receiver))?;
        debug!("Task worker spawned.");

        Ok(Self {
            inner,
            sender: Some(sender),
            worker: Some(worker),
        })
    }

    fn enqueue(&self, request: SaveRequest, backup: bool) {
        *self.inner.pending.lock() += 1;

        let sent = self
            .sender
            .as_ref()
            .is_some_and(|sender| sender.send(Job { request, backup }).is_ok());

        if !sent {
            error!("Task worker is gone, dropping save request");
            self.inner.failed.fetch_add(1, Ordering::Relaxed);
            self.inner.finish_one();
        }
    }

    /// Blocks until every job submitted so far has finished.
    pub fn wait(&self) {
        let mut pending = self.inner.pending.lock();
        while *pending > 0 {
            self.inner.idle.wait(&mut pending);
        }
    }

    /// Number of jobs queued or running.
    pub fn pending(&self) -> usize {
        *self.inner.pending.lock()
    }

    pub fn stats(&self) -> TaskStats {
        TaskStats {
            saved: self.inner.saved.load(Ordering::Relaxed),
            failed: self.inner.failed.load(Ordering::Relaxed),
        }
    }

    /// Handle to the slot holding the last file overwritten by `load_then_save`.
    pub fn backup(&self) -> UndoSlot {
        self.inner.backup.clone()
    }
}

impl Dispatcher for TaskDispatcher {
    fn save(&self, request: SaveRequest) {
        self.enqueue(request, false);
    }

    fn load_then_save(&self, request: SaveRequest) {
        self.enqueue(request, true);
    }
}

impl Drop for TaskDispatcher {
    fn drop(&mut self) {
        // Closing the channel ends the worker loop once the queue is drained
        drop(self.sender.take());
        if let Some(worker) = self.worker.take()
            && worker.join().is_err()
        {
            error!("Task worker panicked");
        }
    }
}

impl std::fmt::Debug for TaskDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskDispatcher")
            .field("pending", &self.pending())
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

impl TaskInner {
    fn work(&self, receiver: Receiver<Job>) {
        for job in receiver {
            // A panicking serializer fails its job, not the worker
            let saved = panic::catch_unwind(AssertUnwindSafe(|| self.run(job)))
                .unwrap_or_else(|_| {
                    error!("Save job panicked");
                    false
                });
            if saved {
                self.saved.fetch_add(1, Ordering::Relaxed);
            } else {
                self.failed.fetch_add(1, Ordering::Relaxed);
            }
            self.finish_one();
        }
        debug!("Task worker exiting.");
    }

    fn finish_one(&self) {
        let mut pending = self.pending.lock();
        *pending = pending.saturating_sub(1);
        if *pending == 0 {
            self.idle.notify_all();
        }
    }

    /// Returns true if the state reached disk.
    fn run(&self, job: Job) -> bool {
        let Job { request, backup } = job;
        let SaveRequest {
            path,
            payload,
            size,
            autosave,
        } = request;

        let file = match StateFile::new(path) {
            Ok(file) => file,
            Err(e) => {
                error!("Invalid state path: {e}");
                return false;
            }
        };

        if backup {
            self.backup_existing(&file);
        }

        let Some(blob) = self.resolve(payload, size, &file) else {
            return false;
        };

        match file.write(blob.as_bytes()) {
            Ok(()) => {
                info!(
                    "Saved state to {:?}, {} bytes{}",
                    file.path(),
                    blob.len(),
                    if autosave { " (autosave)" } else { "" }
                );
                true
            }
            Err(e) => {
                error!("Failed to save state to {:?}: {e}", file.path());
                false
            }
        }
    }

    fn resolve(&self, payload: Payload, size: usize, file: &StateFile) -> Option<SerializedBlob> {
        match payload {
            Payload::Ready(blob) => Some(blob),
            Payload::Deferred => {
                let blob = self.serializer.serialize(size);
                if blob.is_none() {
                    error!("Failed to save state to {:?}", file.path());
                }
                blob
            }
        }
    }

    fn backup_existing(&self, file: &StateFile) {
        if let Ok(len) = file.len()
            && len > self.backup_limit as u64
        {
            warn!(
                "Not backing up {:?}: {len} bytes exceeds the backup limit of {}",
                file.path(),
                self.backup_limit
            );
            return;
        }

        match file.read() {
            Ok(data) => {
                debug!("Backed up {} bytes of {:?}", data.len(), file.path());
                self.backup.evict_and_replace(data, file.path().to_owned());
            }
            // The save goes ahead; only undo-of-save is lost
            Err(e) => warn!("Could not back up {:?} before overwriting: {e}", file.path()),
        }
    }
}
