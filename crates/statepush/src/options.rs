/// Options controlling how [`StatePusher`](crate::StatePusher) serializes and stores state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PushOptions {
    /// Defer disk-bound serialization to the dispatcher instead of doing it on the caller's thread.
    /// Memory saves always serialize synchronously.
    pub background_serialization: bool,
    /// Largest buffer the undo slot may hold, in bytes.
    pub undo_limit: usize,
}

impl PushOptions {
    pub fn new() -> Self {
        Self {
            background_serialization: false,
            undo_limit: usize::MAX,
        }
    }

    pub fn with_background_serialization(mut self, enabled: bool) -> Self {
        self.background_serialization = enabled;
        self
    }

    pub fn with_undo_limit(mut self, limit: usize) -> Self {
        self.undo_limit = limit;
        self
    }
}

impl Default for PushOptions {
    fn default() -> Self {
        Self::new()
    }
}
