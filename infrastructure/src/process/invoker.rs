//! Subprocess invoker with a wall-clock timeout race.
//!
//! Spawns a CLI tool with an explicitly constructed environment, feeds it
//! an optional stdin payload, and races completion against a timer. The
//! timeout only stops *waiting*: the child is flagged `kill_on_drop`, so
//! dropping the future sends a best-effort kill, but termination is
//! neither awaited nor verified.

use super::scan::classify_failure_text;
use gengate_domain::{InvokeError, ToolId};
use std::collections::HashMap;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

/// One subprocess attempt. Immutable once built.
#[derive(Debug, Clone)]
pub struct InvocationRequest {
    /// Argument vector (not including the program itself).
    pub args: Vec<String>,
    /// Fully constructed process environment (see [`super::env`]).
    pub env: HashMap<String, String>,
    /// Payload written to the child's stdin. `None` closes stdin
    /// immediately so tools waiting for terminal input exit fast.
    pub input: Option<String>,
    /// Wall-clock budget for the whole invocation.
    pub timeout: Duration,
}

/// Captured output of a clean (exit code 0) invocation.
///
/// Only ever constructed for exit code 0; any other exit produces a
/// typed error instead.
#[derive(Debug)]
pub struct InvocationOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Invoke a CLI tool and capture its output.
///
/// `model` and `extra_auth_markers` feed the failure-text classification
/// on non-zero exit. Spawn failures (missing executable, permission
/// denied) map straight to [`InvokeError::NotFound`], bypassing exit-code
/// logic.
pub async fn invoke(
    tool: ToolId,
    program: &Path,
    model: &str,
    request: InvocationRequest,
    extra_auth_markers: &[&str],
) -> Result<InvocationOutput, InvokeError> {
    debug!(
        tool = %tool,
        program = %program.display(),
        args = ?request.args,
        timeout_ms = request.timeout.as_millis() as u64,
        "invoking tool"
    );

    let mut cmd = Command::new(program);
    cmd.args(&request.args)
        .env_clear()
        .envs(&request.env)
        .stdin(if request.input.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = cmd.spawn().map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound | std::io::ErrorKind::PermissionDenied => {
            InvokeError::NotFound { tool }
        }
        _ => InvokeError::ToolFailed {
            tool,
            exit_code: None,
            detail: format!("failed to spawn: {e}"),
        },
    })?;

    let input = request.input;
    let run = async move {
        if let Some(payload) = input
            && let Some(mut stdin) = child.stdin.take()
        {
            stdin.write_all(payload.as_bytes()).await?;
            stdin.shutdown().await?;
            // Dropping the handle closes the pipe so the child sees EOF.
        }
        child.wait_with_output().await
    };

    // The race: if the timer fires first, `run` (and the child handle
    // inside it) is dropped, which triggers the kill_on_drop signal.
    let output = match tokio::time::timeout(request.timeout, run).await {
        Ok(Ok(output)) => output,
        Ok(Err(e)) => {
            return Err(InvokeError::ToolFailed {
                tool,
                exit_code: None,
                detail: format!("io error while waiting: {e}"),
            });
        }
        Err(_) => {
            return Err(InvokeError::Timeout {
                tool: Some(tool),
                waited_ms: request.timeout.as_millis() as u64,
            });
        }
    };

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

    if output.status.success() {
        return Ok(InvocationOutput { stdout, stderr });
    }

    // Prefer stderr for classification but include stdout: some tools
    // print their error envelope there.
    let combined = if stderr.trim().is_empty() {
        stdout
    } else if stdout.trim().is_empty() {
        stderr
    } else {
        format!("{stderr}\n{stdout}")
    };

    Err(classify_failure_text(
        tool,
        model,
        output.status.code(),
        &combined,
        extra_auth_markers,
    ))
}
