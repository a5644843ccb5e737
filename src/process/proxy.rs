use std::collections::HashMap;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::telemetry::ConcurrentBuffer;

use super::snapshot::ProcessSnapshot;

/// The executable could not be spawned.
#[derive(Debug, Error)]
#[error("failed to launch '{program}': {source}")]
pub struct LaunchError {
    pub program: String,
    #[source]
    pub source: std::io::Error,
}

#[derive(Debug, Error)]
pub enum ProcessError {
    #[error(transparent)]
    Launch(#[from] LaunchError),
    /// An I/O failure observing the exit status. Distinct from a timeout,
    /// which is a normal [`WaitOutcome`].
    #[error("failed waiting on '{program}': {source}")]
    Wait {
        program: String,
        #[source]
        source: std::io::Error,
    },
    /// The handle was released while the child was still running; there is
    /// nothing left to wait on. Snapshot reads remain valid.
    #[error("process handle has been disposed")]
    Disposed,
}

/// Which of the three racing signals ended a `start_and_wait` call.
/// `TimedOut` and `Cancelled` only stop the waiting; the child keeps running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    Exited,
    TimedOut,
    Cancelled,
}

/// Launch configuration for one benchmark child process.
#[derive(Debug, Clone)]
pub struct ProcessSpec {
    pub program: String,
    pub arguments: Vec<String>,
    pub working_directory: Option<PathBuf>,
    /// Merged into the child's inherited environment at spawn time.
    pub environment: HashMap<String, String>,
    pub redirect_stdin: bool,
    pub redirect_stdout: bool,
    pub redirect_stderr: bool,
}

impl ProcessSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            arguments: Vec::new(),
            working_directory: None,
            environment: HashMap::new(),
            redirect_stdin: false,
            redirect_stdout: true,
            redirect_stderr: true,
        }
    }

    pub fn arg(mut self, argument: impl Into<String>) -> Self {
        self.arguments.push(argument.into());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.environment.insert(key.into(), value.into());
        self
    }

    pub fn working_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.working_directory = Some(directory.into());
        self
    }
}

/// Facade over a native child process handle.
///
/// Owns its [`ProcessSpec`] for the proxy's lifetime. Snapshot accessors are
/// infallible and stay valid after [`dispose`](Self::dispose); redirected
/// streams are drained by background tasks into in-memory buffers.
pub struct ProcessProxy {
    spec: ProcessSpec,
    child: Option<Child>,
    started: bool,
    snapshot: ProcessSnapshot,
    stdout: Arc<ConcurrentBuffer>,
    stderr: Arc<ConcurrentBuffer>,
    capture_tasks: Vec<JoinHandle<()>>,
}

enum WaitSignal {
    Exited(std::io::Result<std::process::ExitStatus>),
    TimedOut,
    Cancelled,
}

impl ProcessProxy {
    pub fn new(spec: ProcessSpec) -> Self {
        Self {
            spec,
            child: None,
            started: false,
            snapshot: ProcessSnapshot::default(),
            stdout: Arc::new(ConcurrentBuffer::new()),
            stderr: Arc::new(ConcurrentBuffer::new()),
            capture_tasks: Vec::new(),
        }
    }

    /// Spawns the child with the configured redirection and environment.
    /// Idempotent once started. Surfaces spawn failures synchronously.
    pub fn start(&mut self) -> Result<(), LaunchError> {
        if self.started {
            return Ok(());
        }

        let mut command = Command::new(&self.spec.program);
        command.args(&self.spec.arguments);
        command.envs(&self.spec.environment);
        if let Some(directory) = &self.spec.working_directory {
            command.current_dir(directory);
        }
        command.stdin(stdio_for(self.spec.redirect_stdin));
        command.stdout(stdio_for(self.spec.redirect_stdout));
        command.stderr(stdio_for(self.spec.redirect_stderr));

        let mut child = command.spawn().map_err(|source| LaunchError {
            program: self.spec.program.clone(),
            source,
        })?;

        self.snapshot.mark_started(Utc::now());
        tracing::info!(program = %self.spec.program, "child process started");

        // Close the pipe right away; a child reading stdin sees EOF instead
        // of blocking on input that never comes.
        drop(child.stdin.take());

        if let Some(stream) = child.stdout.take() {
            self.capture_tasks
                .push(spawn_capture(stream, Arc::clone(&self.stdout)));
        }
        if let Some(stream) = child.stderr.take() {
            self.capture_tasks
                .push(spawn_capture(stream, Arc::clone(&self.stderr)));
        }

        self.child = Some(child);
        self.started = true;
        Ok(())
    }

    /// Starts the child if needed, then suspends until it exits, `token`
    /// cancels, or `timeout` elapses, whichever fires first.
    ///
    /// A timeout or cancellation is a soft return: the child is left running,
    /// `has_exited` stays false, and killing it remains the caller's explicit
    /// action. A natural exit captures exit time and code into the snapshot
    /// before returning.
    pub async fn start_and_wait(
        &mut self,
        token: CancellationToken,
        timeout: Option<Duration>,
    ) -> Result<WaitOutcome, ProcessError> {
        if !self.started {
            self.start()?;
        }
        if self.snapshot.has_exited {
            return Ok(WaitOutcome::Exited);
        }

        let signal = match self.child.as_mut() {
            Some(child) => {
                tokio::select! {
                    status = child.wait() => WaitSignal::Exited(status),
                    _ = token.cancelled() => WaitSignal::Cancelled,
                    _ = wait_deadline(timeout) => WaitSignal::TimedOut,
                }
            }
            // Started but no handle: disposed while still running.
            None => return Err(ProcessError::Disposed),
        };

        match signal {
            WaitSignal::Exited(status) => {
                let status = status.map_err(|source| ProcessError::Wait {
                    program: self.spec.program.clone(),
                    source,
                })?;
                self.snapshot.mark_exited(Utc::now(), status.code());
                self.drain_captures().await;
                tracing::info!(
                    program = %self.spec.program,
                    exit_code = ?status.code(),
                    "child process exited"
                );
                Ok(WaitOutcome::Exited)
            }
            WaitSignal::TimedOut => Ok(WaitOutcome::TimedOut),
            WaitSignal::Cancelled => Ok(WaitOutcome::Cancelled),
        }
    }

    /// Forcibly terminates the child and records its exit in the snapshot.
    pub async fn kill(&mut self) -> std::io::Result<()> {
        if let Some(child) = self.child.as_mut() {
            if !self.snapshot.has_exited {
                child.start_kill()?;
                let status = child.wait().await?;
                self.snapshot.mark_exited(Utc::now(), status.code());
                self.drain_captures().await;
            }
        }
        Ok(())
    }

    /// Releases the native handle and stops stream capture. The child is not
    /// killed; snapshot accessors remain valid. Disposal is terminal: a later
    /// wait on a still-running child fails with [`ProcessError::Disposed`]
    /// rather than respawning.
    pub fn dispose(&mut self) {
        for task in self.capture_tasks.drain(..) {
            task.abort();
        }
        self.child = None;
    }

    pub fn snapshot(&self) -> ProcessSnapshot {
        self.snapshot.clone()
    }

    pub fn start_time(&self) -> Option<chrono::DateTime<Utc>> {
        self.snapshot.start_time
    }

    pub fn exit_time(&self) -> Option<chrono::DateTime<Utc>> {
        self.snapshot.exit_time
    }

    pub fn exit_code(&self) -> Option<i32> {
        self.snapshot.exit_code
    }

    pub fn has_exited(&self) -> bool {
        self.snapshot.has_exited
    }

    /// Text captured from the redirected standard output so far.
    pub fn stdout(&self) -> String {
        self.stdout.to_string()
    }

    /// Text captured from the redirected standard error so far.
    pub fn stderr(&self) -> String {
        self.stderr.to_string()
    }

    pub fn spec(&self) -> &ProcessSpec {
        &self.spec
    }

    // Redirect flags are read once at spawn; after start these setters still
    // succeed but change nothing observable.
    pub fn set_redirect_stdin(&mut self, enabled: bool) {
        self.spec.redirect_stdin = enabled;
    }

    pub fn set_redirect_stdout(&mut self, enabled: bool) {
        self.spec.redirect_stdout = enabled;
    }

    pub fn set_redirect_stderr(&mut self, enabled: bool) {
        self.spec.redirect_stderr = enabled;
    }

    async fn drain_captures(&mut self) {
        for task in self.capture_tasks.drain(..) {
            let _ = task.await;
        }
    }
}

impl Drop for ProcessProxy {
    fn drop(&mut self) {
        self.dispose();
    }
}

fn stdio_for(redirect: bool) -> Stdio {
    if redirect {
        Stdio::piped()
    } else {
        Stdio::inherit()
    }
}

async fn wait_deadline(timeout: Option<Duration>) {
    match timeout {
        Some(limit) => tokio::time::sleep(limit).await,
        None => std::future::pending().await,
    }
}

fn spawn_capture<R>(mut stream: R, buffer: Arc<ConcurrentBuffer>) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut chunk = [0u8; 4096];
        loop {
            match stream.read(&mut chunk).await {
                Ok(0) => break,
                Ok(read) => buffer.append(&String::from_utf8_lossy(&chunk[..read])),
                Err(_) => break,
            }
        }
    })
}
