use std::thread;

/// Settings for opening a database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageOptions {
    /// Upper bound on threads reading table descriptions at open time.
    pub discovery_threads: usize,
    /// Log objects whose header page lacks the `1C FD` signature.
    pub verify_object_signature: bool,
}

impl Default for StorageOptions {
    fn default() -> Self {
        Self {
            discovery_threads: thread::available_parallelism().map_or(4, |threads| threads.get()),
            verify_object_signature: true,
        }
    }
}

impl StorageOptions {
    pub fn with_discovery_threads(mut self, threads: usize) -> Self {
        self.discovery_threads = threads.max(1);
        self
    }

    pub fn without_signature_check(mut self) -> Self {
        self.verify_object_signature = false;
        self
    }
}
