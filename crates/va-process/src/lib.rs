//! Shell Runner: spawns the OS shell with a wall-clock timeout and
//! independently capped stdout/stderr capture. The child runs in its own
//! process group (unix `setsid`) so a timeout kill reaches the whole
//! group, not just the shell leader, and `kill_on_drop` is a safety net
//! against orphaned children if the runner future itself is dropped.

use std::time::{Duration, Instant};

use serde::Serialize;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tracing::{debug, warn};

/// Result of running one shell command.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionOutcome {
    pub command: String,
    /// `None` when the process was killed by a signal (including our own
    /// timeout kill).
    pub exit_code: Option<i32>,
    pub timed_out: bool,
    pub duration_ms: u64,
    pub stdout: String,
    pub stderr: String,
}

impl ExecutionOutcome {
    /// Non-zero exit **or** timeout is failure; exit 0 with no timeout is
    /// success.
    pub fn succeeded(&self) -> bool {
        !self.timed_out && self.exit_code == Some(0)
    }
}

/// Run `command` through the OS shell, with `cwd` as the working directory,
/// capping each of stdout/stderr independently at `max_output_chars` and
/// killing the process (and its group, on unix) after `timeout`.
pub async fn run(
    command: &str,
    cwd: &std::path::Path,
    timeout: Duration,
    max_output_chars: usize,
) -> ExecutionOutcome {
    let started = Instant::now();
    let mut cmd = build_shell_command(command, cwd);

    let mut child = match cmd.spawn() {
        Ok(child) => child,
        Err(e) => {
            warn!(%command, error = %e, "failed to spawn shell command");
            return ExecutionOutcome {
                command: command.to_string(),
                exit_code: None,
                timed_out: false,
                duration_ms: started.elapsed().as_millis() as u64,
                stdout: String::new(),
                stderr: format!("failed to spawn: {e}"),
            };
        }
    };

    let stdout = child.stdout.take();
    let stderr = child.stderr.take();
    let stdout_task = tokio::spawn(capture_capped(stdout, max_output_chars));
    let stderr_task = tokio::spawn(capture_capped(stderr, max_output_chars));

    let wait_result = tokio::time::timeout(timeout, child.wait()).await;
    let timed_out = wait_result.is_err();

    if timed_out {
        kill_process_group(&child);
        // Give the kill a moment to land before collecting output so the
        // capture tasks see EOF instead of hanging indefinitely.
        let _ = tokio::time::timeout(Duration::from_secs(2), child.wait()).await;
    }

    let exit_code = match wait_result {
        Ok(Ok(status)) => status.code(),
        _ => None,
    };

    let stdout = stdout_task.await.unwrap_or_default();
    let stderr = stderr_task.await.unwrap_or_default();

    if timed_out {
        debug!(%command, "shell command timed out");
    }

    ExecutionOutcome {
        command: command.to_string(),
        exit_code,
        timed_out,
        duration_ms: started.elapsed().as_millis() as u64,
        stdout,
        stderr,
    }
}

#[cfg(unix)]
fn build_shell_command(command: &str, cwd: &std::path::Path) -> Command {
    let mut cmd = Command::new("/bin/sh");
    cmd.arg("-lc").arg(command);
    cmd.current_dir(cwd);
    cmd.stdout(std::process::Stdio::piped());
    cmd.stderr(std::process::Stdio::piped());
    cmd.stdin(std::process::Stdio::null());
    cmd.kill_on_drop(true);
    // SAFETY: setsid() is async-signal-safe and runs before exec, isolating
    // the child (and everything it forks) into its own process group so a
    // timeout kill can reach the whole group via killpg.
    unsafe {
        cmd.pre_exec(|| {
            libc::setsid();
            Ok(())
        });
    }
    cmd
}

#[cfg(windows)]
fn build_shell_command(command: &str, cwd: &std::path::Path) -> Command {
    let mut cmd = Command::new("cmd.exe");
    cmd.args(["/d", "/s", "/c", command]);
    cmd.current_dir(cwd);
    cmd.stdout(std::process::Stdio::piped());
    cmd.stderr(std::process::Stdio::piped());
    cmd.stdin(std::process::Stdio::null());
    cmd.kill_on_drop(true);
    cmd
}

#[cfg(unix)]
fn kill_process_group(child: &tokio::process::Child) {
    if let Some(pid) = child.id() {
        // The child called setsid(), so its pgid equals its pid.
        unsafe {
            libc::killpg(pid as i32, libc::SIGKILL);
        }
    }
}

#[cfg(not(unix))]
fn kill_process_group(_child: &tokio::process::Child) {}

/// Drain `reader` into a `String`, stopping once `max_chars` characters
/// have been collected. Further bytes on the stream are dropped but the
/// process is **not** killed for exceeding the cap.
async fn capture_capped<R: AsyncRead + Unpin + Send + 'static>(
    reader: Option<R>,
    max_chars: usize,
) -> String {
    let Some(mut reader) = reader else {
        return String::new();
    };
    let mut raw = Vec::new();
    let mut chunk = [0u8; 8192];
    loop {
        match reader.read(&mut chunk).await {
            Ok(0) => break,
            Ok(n) => raw.extend_from_slice(&chunk[..n]),
            Err(_) => break,
        }
        // Stop reading once we almost certainly have enough to satisfy the
        // char cap (4 bytes/char worst case for UTF-8); keeps memory bounded
        // without truncating mid-codepoint.
        if raw.len() >= max_chars.saturating_mul(4) {
            break;
        }
    }
    let text = String::from_utf8_lossy(&raw);
    if text.chars().count() <= max_chars {
        text.into_owned()
    } else {
        text.chars().take(max_chars).collect()
    }
}
