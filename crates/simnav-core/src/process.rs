//! Blocking external process execution with a deadline

use crate::error::Error;
use std::io::Read;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("failed to start {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{command} timed out after {}ms", .timeout.as_millis())]
    Timeout { command: String, timeout: Duration },
    #[error("{command} exited with {status}: {stderr}")]
    Failed {
        command: String,
        status: ExitStatus,
        stderr: String,
    },
    #[error("failed waiting for {command}: {source}")]
    Wait {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

impl From<ProcessError> for Error {
    fn from(e: ProcessError) -> Self {
        match &e {
            ProcessError::Timeout { command, timeout } => Error::timeout(command, *timeout),
            ProcessError::Failed {
                command, stderr, ..
            } => Error::collaborator_failed(command, stderr.trim())
                .with_context(serde_json::json!({ "detail": e.to_string() })),
            ProcessError::Spawn { command, .. } | ProcessError::Wait { command, .. } => {
                Error::collaborator_failed(command, &e.to_string())
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct Output {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

/// Render a command line for logs and messages.
pub fn command_line(program: &str, args: &[String]) -> String {
    std::iter::once(program)
        .chain(args.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Run `program` to completion, killing it once `timeout` elapses.
/// The deadline also covers collecting output, so a background process that
/// inherits the pipes cannot hold the call open. Non-zero exit is an error
/// carrying the captured stderr.
pub fn run(program: &str, args: &[String], timeout: Duration) -> Result<Output, ProcessError> {
    let command = command_line(program, args);
    let deadline = Instant::now() + timeout;
    tracing::debug!(%command, timeout_ms = timeout.as_millis() as u64, "running");

    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|source| ProcessError::Spawn {
            command: command.clone(),
            source,
        })?;

    // Drain pipes off-thread so a chatty child cannot block on a full pipe.
    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());

    let status = match wait_deadline(&mut child, deadline) {
        Ok(Some(status)) => status,
        Ok(None) => {
            let _ = child.kill();
            let _ = child.wait();
            tracing::warn!(%command, "killed after timeout");
            return Err(ProcessError::Timeout { command, timeout });
        }
        Err(source) => {
            let _ = child.kill();
            let _ = child.wait();
            return Err(ProcessError::Wait { command, source });
        }
    };

    let (Some(stdout), Some(stderr)) = (collect(&stdout, deadline), collect(&stderr, deadline))
    else {
        tracing::warn!(%command, "output still open after exit, giving up");
        return Err(ProcessError::Timeout { command, timeout });
    };
    let output = Output {
        status,
        stdout,
        stderr,
    };

    if !output.status.success() {
        return Err(ProcessError::Failed {
            command,
            status: output.status,
            stderr: output.stderr,
        });
    }

    Ok(output)
}

fn wait_deadline(child: &mut Child, deadline: Instant) -> std::io::Result<Option<ExitStatus>> {
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if Instant::now() >= deadline {
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    }
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Receiver<String> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buf);
        }
        let _ = tx.send(String::from_utf8_lossy(&buf).into_owned());
    });
    rx
}

/// Drained output, or `None` when the pipe is still open at `deadline`.
fn collect(rx: &Receiver<String>, deadline: Instant) -> Option<String> {
    // a just-exited child may still be flushing, so allow one poll interval
    let wait = deadline
        .saturating_duration_since(Instant::now())
        .max(POLL_INTERVAL);
    match rx.recv_timeout(wait) {
        Ok(text) => Some(text),
        Err(RecvTimeoutError::Disconnected) => Some(String::new()),
        Err(RecvTimeoutError::Timeout) => None,
    }
}
