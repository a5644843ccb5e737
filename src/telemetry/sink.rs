use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use super::buffer::ConcurrentBuffer;
use super::event::LogEvent;
use super::format;
use super::retry::RetryPolicy;

/// Cadence of the background flush loop.
const FLUSH_INTERVAL: Duration = Duration::from_millis(300);

const DEFAULT_SUMMARY_PATH: &str = "logs/summary.txt";

/// Transient file-system failure surfaced by an explicit [`SummarySink::flush`].
/// The background loop swallows the same failures and keeps the buffer.
#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("summary file write failed: {0}")]
    Io(#[from] io::Error),
}

/// Renders structured events to fixed-width text and durably appends them to
/// the summary file.
///
/// The first `log` call starts exactly one background flush loop for the life
/// of the sink. Appends and flushes are serialized by a single gate, so a
/// flush never observes a partially appended event and concurrent log calls
/// never interleave bytes. The buffer is cleared only after a verified write;
/// an exhausted retry budget leaves it intact for the next cycle.
pub struct SummarySink {
    inner: Arc<SinkInner>,
    flush_task: std::sync::Mutex<Option<JoinHandle<()>>>,
}

struct SinkInner {
    file_path: PathBuf,
    directory: PathBuf,
    buffer: ConcurrentBuffer,
    gate: Mutex<()>,
    retry: RetryPolicy,
    flush_task_started: AtomicBool,
    flush_loops: AtomicU32,
}

impl SummarySink {
    /// `file_path` defaults to `logs/summary.txt` under the working directory.
    pub fn new(file_path: Option<PathBuf>) -> Self {
        Self::with_retry_policy(file_path, RetryPolicy::default())
    }

    pub fn with_retry_policy(file_path: Option<PathBuf>, retry: RetryPolicy) -> Self {
        let file_path = file_path.unwrap_or_else(|| PathBuf::from(DEFAULT_SUMMARY_PATH));
        let directory = match file_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        Self {
            inner: Arc::new(SinkInner {
                file_path,
                directory,
                buffer: ConcurrentBuffer::new(),
                gate: Mutex::new(()),
                retry,
                flush_task_started: AtomicBool::new(false),
                flush_loops: AtomicU32::new(0),
            }),
            flush_task: std::sync::Mutex::new(None),
        }
    }

    /// Renders the event and appends it to the in-memory buffer, starting the
    /// background flush loop on first use.
    pub async fn log(&self, event: &LogEvent) {
        let message = format::stamp_event(event);
        {
            let _gate = self.inner.gate.lock().await;
            self.inner.buffer.append(&message);
        }
        self.ensure_flush_task();
    }

    /// Guaranteed drain for callers that cannot wait on the background
    /// cadence. Unlike the loop, failures propagate.
    pub async fn flush(&self) -> Result<(), TelemetryError> {
        self.inner.flush_buffer().await?;
        Ok(())
    }

    /// Bytes currently buffered and not yet verifiably on disk.
    pub fn pending_bytes(&self) -> usize {
        self.inner.buffer.len()
    }

    pub fn file_path(&self) -> &Path {
        &self.inner.file_path
    }

    // One-shot start guarded by an atomic swap: concurrent first calls race
    // on the flag, exactly one spawns the loop.
    fn ensure_flush_task(&self) {
        if self.inner.flush_task_started.swap(true, Ordering::SeqCst) {
            return;
        }
        let inner = Arc::clone(&self.inner);
        let handle = tokio::spawn(async move { inner.monitor_buffer().await });
        if let Ok(mut slot) = self.flush_task.lock() {
            *slot = Some(handle);
        }
    }
}

impl Drop for SummarySink {
    // No final flush on disposal; unflushed content is lost unless the caller
    // drained with flush() first.
    fn drop(&mut self) {
        if let Ok(mut slot) = self.flush_task.lock() {
            if let Some(handle) = slot.take() {
                handle.abort();
            }
        }
    }
}

impl SinkInner {
    // Never-propagate boundary: nothing inside this loop may escape it.
    async fn monitor_buffer(self: Arc<Self>) {
        self.flush_loops.fetch_add(1, Ordering::SeqCst);
        let mut initialized = false;
        loop {
            if !initialized {
                match tokio::fs::create_dir_all(&self.directory).await {
                    Ok(()) => initialized = true,
                    Err(error) => tracing::warn!(
                        %error,
                        directory = %self.directory.display(),
                        "could not create summary log directory"
                    ),
                }
            }

            tokio::time::sleep(FLUSH_INTERVAL).await;

            if let Err(error) = self.flush_buffer().await {
                tracing::warn!(%error, "summary flush failed; buffered content retained");
            }
        }
    }

    async fn flush_buffer(&self) -> io::Result<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }

        self.retry
            .execute(|| async move {
                let _gate = self.gate.lock().await;
                let mut file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .read(true)
                    .open(&self.file_path)
                    .await?;
                let contents = self.buffer.to_string();
                file.write_all(contents.as_bytes()).await?;
                file.flush().await?;
                file.sync_data().await?;
                // Cleared only once the bytes are verifiably on disk.
                self.buffer.clear();
                Ok(())
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::MetricUnit;
    use crate::telemetry::event::LogEventKind;
    use chrono::Utc;

    fn metric_event() -> LogEvent {
        LogEvent {
            timestamp: Utc::now(),
            kind: LogEventKind::Metric {
                scenario: "aspnet".to_string(),
                name: "Latency P50".to_string(),
                value: 6058.0,
                unit: MetricUnit::Microseconds,
            },
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_first_logs_start_exactly_one_flush_loop() {
        let dir = tempfile::tempdir().expect("tempdir");
        let sink = Arc::new(SummarySink::new(Some(dir.path().join("summary.txt"))));

        let mut handles = Vec::new();
        for _ in 0..16 {
            let sink = Arc::clone(&sink);
            handles.push(tokio::spawn(async move { sink.log(&metric_event()).await }));
        }
        for handle in handles {
            handle.await.expect("log task panicked");
        }

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(sink.inner.flush_loops.load(Ordering::SeqCst), 1);
    }
}
