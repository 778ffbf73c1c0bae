//! Bounded execution of external command-line tools (poppler, tesseract).

use crate::error::ClauseError;
use std::ffi::OsStr;
use std::io::Read;
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Caller-supplied cancellation switch, checked between pages and while
/// waiting on child processes.
pub type CancelFlag = Arc<AtomicBool>;

/// Overall time budget for one document plus an optional cancel switch.
#[derive(Debug, Clone)]
pub struct Deadline {
    started: Instant,
    budget: Duration,
    cancel: Option<CancelFlag>,
}

impl Deadline {
    pub fn new(budget: Duration) -> Self {
        Self {
            started: Instant::now(),
            budget,
            cancel: None,
        }
    }

    pub fn with_cancel(mut self, cancel: CancelFlag) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn budget(&self) -> Duration {
        self.budget
    }

    pub fn remaining(&self) -> Duration {
        self.budget.saturating_sub(self.started.elapsed())
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .map(|c| c.load(Ordering::Relaxed))
            .unwrap_or(false)
    }

    /// Fail if the budget is spent or the caller cancelled.
    pub fn check(&self, stage: &str) -> Result<(), ClauseError> {
        if self.is_cancelled() {
            return Err(ClauseError::Cancelled);
        }
        if self.remaining().is_zero() {
            return Err(ClauseError::Timeout {
                stage: stage.to_string(),
                budget: self.budget,
            });
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct ToolOutput {
    pub status: ExitStatus,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl ToolOutput {
    pub fn stderr_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stderr).trim().to_string()
    }
}

/// Run `program` with `args`, killing it when the deadline passes or the
/// caller cancels.
///
/// A missing binary maps to [`ClauseError::ToolNotFound`]. Non-zero exit is
/// returned as-is; callers decide how to interpret stderr.
pub fn run_tool<I, S>(
    program: &Path,
    args: I,
    deadline: &Deadline,
    stage: &str,
) -> Result<ToolOutput, ClauseError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    deadline.check(stage)?;
    let tool = program.display().to_string();

    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ClauseError::ToolNotFound { tool: tool.clone() }
            } else {
                ClauseError::ToolFailed {
                    tool: tool.clone(),
                    code: -1,
                    stderr: e.to_string(),
                }
            }
        })?;

    // Drain pipes on their own threads so a chatty child never blocks on a full pipe.
    let stdout_reader = child.stdout.take().map(spawn_reader);
    let stderr_reader = child.stderr.take().map(spawn_reader);

    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(tool = %tool, stage, error = %e, "lost track of external tool");
                abort_child(&mut child);
                return Err(e.into());
            }
        }
        if let Err(err) = deadline.check(stage) {
            tracing::warn!(tool = %tool, stage, error = %err, "killing external tool");
            abort_child(&mut child);
            return Err(err);
        }
        thread::sleep(POLL_INTERVAL.min(deadline.remaining()));
    };

    let stdout = stdout_reader.map(join_reader).unwrap_or_default();
    let stderr = stderr_reader.map(join_reader).unwrap_or_default();

    tracing::debug!(
        tool = %tool,
        stage,
        code = status.code().unwrap_or(-1),
        stdout_bytes = stdout.len(),
        "external tool finished"
    );

    Ok(ToolOutput {
        status,
        stdout,
        stderr,
    })
}

/// Kill and reap, so no zombie outlives the call.
fn abort_child(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

fn spawn_reader<R: Read + Send + 'static>(mut pipe: R) -> thread::JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        buf
    })
}

fn join_reader(handle: thread::JoinHandle<Vec<u8>>) -> Vec<u8> {
    handle.join().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_binary_is_tool_not_found() {
        let deadline = Deadline::new(Duration::from_secs(5));
        let err = run_tool(
            Path::new("clauseguard-definitely-not-installed"),
            ["--version"],
            &deadline,
            "version check",
        )
        .unwrap_err();
        assert!(matches!(err, ClauseError::ToolNotFound { .. }));
    }

    #[test]
    fn cancelled_deadline_fails_before_spawning() {
        let flag: CancelFlag = Arc::new(AtomicBool::new(true));
        let deadline = Deadline::new(Duration::from_secs(5)).with_cancel(flag);
        let err = run_tool(Path::new("true"), Vec::<&str>::new(), &deadline, "version check").unwrap_err();
        assert!(matches!(err, ClauseError::Cancelled));
    }

    #[test]
    fn overrunning_tool_is_killed_and_reaped() {
        let deadline = Deadline::new(Duration::from_millis(100));
        let started = Instant::now();
        let err = run_tool(Path::new("sleep"), ["5"], &deadline, "render").unwrap_err();
        assert!(matches!(err, ClauseError::Timeout { .. }));
        assert!(started.elapsed() < Duration::from_secs(3));
    }

    #[test]
    fn aborting_a_running_child_reaps_it() {
        let mut child = Command::new("sleep")
            .arg("5")
            .stdout(Stdio::null())
            .spawn()
            .unwrap();
        abort_child(&mut child);
        assert!(child.try_wait().unwrap().is_some());
    }

    #[test]
    fn expired_deadline_is_a_timeout() {
        let deadline = Deadline::new(Duration::ZERO);
        let err = deadline.check("OCR").unwrap_err();
        assert_eq!(err.reason(), "timeout");
    }
}
