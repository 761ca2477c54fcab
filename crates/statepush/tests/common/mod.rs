#![allow(dead_code)]

use std::{
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    thread,
};

use parking_lot::Mutex;
use statepush::{Dispatcher, SaveRequest, SerializationInfo, SerializedBlob, Serializer};

/// Serializer with a scripted reported size and producer output.
///
/// `data == None` makes the producer fail.
#[derive(Debug, Default)]
pub struct TestSerializer {
    size: AtomicUsize,
    data: Mutex<Option<Vec<u8>>>,
    calls: AtomicUsize,
    last_thread: Mutex<Option<String>>,
}

impl TestSerializer {
    pub fn new(data: &[u8]) -> Arc<Self> {
        let serializer = Self::default();
        serializer.set_data(data);
        Arc::new(serializer)
    }

    /// Size query reports nothing to save.
    pub fn empty() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Size query reports `size` bytes but the producer fails.
    pub fn failing(size: usize) -> Arc<Self> {
        let serializer = Self::default();
        serializer.size.store(size, Ordering::Relaxed);
        Arc::new(serializer)
    }

    pub fn set_data(&self, data: &[u8]) {
        self.size.store(data.len(), Ordering::Relaxed);
        *self.data.lock() = Some(data.to_vec());
    }

    pub fn set_failing(&self) {
        *self.data.lock() = None;
    }

    /// Number of producer invocations.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }

    /// Name of the thread that ran the producer last.
    pub fn last_thread(&self) -> Option<String> {
        self.last_thread.lock().clone()
    }
}

impl Serializer for TestSerializer {
    fn serialize_size(&self) -> SerializationInfo {
        SerializationInfo::new(self.size.load(Ordering::Relaxed))
    }

    fn serialize(&self, _size_hint: usize) -> Option<SerializedBlob> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        *self.last_thread.lock() = thread::current().name().map(str::to_owned);
        self.data.lock().clone().map(SerializedBlob::new)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Save(SaveRequest),
    LoadThenSave(SaveRequest),
}

/// Dispatcher that only records what it was asked to do.
///
/// `path_exists` keeps the default behavior, so tests create real files to
/// trigger the backup branch.
#[derive(Debug, Default)]
pub struct RecordingDispatcher {
    calls: Mutex<Vec<Call>>,
}

impl RecordingDispatcher {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn only_call(&self) -> Call {
        let calls = self.calls();
        assert_eq!(calls.len(), 1, "expected exactly one dispatch, got {calls:?}");
        calls.into_iter().next().unwrap()
    }
}

impl Dispatcher for RecordingDispatcher {
    fn save(&self, request: SaveRequest) {
        self.calls.lock().push(Call::Save(request));
    }

    fn load_then_save(&self, request: SaveRequest) {
        self.calls.lock().push(Call::LoadThenSave(request));
    }
}

/// Deterministic non-trivial bytes.
pub fn pattern(len: usize, seed: u8) -> Vec<u8> {
    (0..len)
        .map(|i| (i as u8).wrapping_mul(31).wrapping_add(seed))
        .collect()
}
