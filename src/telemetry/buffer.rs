use std::fmt;
use std::sync::{Mutex, MutexGuard};

/// Thread-safe append-only text accumulator.
///
/// Each call lands whole; ordering across callers is the sink's
/// responsibility, enforced by its single-writer gate, not the buffer's.
#[derive(Debug, Default)]
pub struct ConcurrentBuffer {
    contents: Mutex<String>,
}

impl ConcurrentBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&self, text: &str) {
        self.lock().push_str(text);
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Atomically resets the buffer to empty.
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<'_, String> {
        match self.contents.lock() {
            Ok(guard) => guard,
            // A panicked appender leaves the text intact; keep serving it.
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl fmt::Display for ConcurrentBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.lock())
    }
}
