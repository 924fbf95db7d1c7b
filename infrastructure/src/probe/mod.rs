//! Tool availability probing
//!
//! Answers one question per call: is this CLI tool usable right now, and
//! if so where does it live and which version is it? Pure query with no
//! side effects; results are never cached, so a tool installed mid-run is
//! picked up by the next invocation.

use gengate_domain::ToolId;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

/// How long a `--version` probe may take before the tool is treated as
/// present-but-unresponsive.
const VERSION_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Result of probing one tool.
#[derive(Debug, Clone, Default)]
pub struct Detection {
    pub available: bool,
    pub path: Option<PathBuf>,
    pub version: Option<String>,
    pub error: Option<String>,
}

impl Detection {
    fn missing(error: impl Into<String>) -> Self {
        Self {
            available: false,
            error: Some(error.into()),
            ..Default::default()
        }
    }
}

/// Probe whether a tool is installed and reachable.
///
/// An explicit `override_path` (from `<TOOL>_PATH` or config) wins over
/// `$PATH` resolution. The version string comes from the tool's
/// `--version` output; a failed version probe still counts as available
/// since some tools gate `--version` behind login.
pub async fn detect_tool(tool: ToolId, override_path: Option<&Path>) -> Detection {
    let path = match override_path {
        Some(p) => {
            if !p.exists() {
                return Detection::missing(format!(
                    "configured path for {} does not exist: {}",
                    tool,
                    p.display()
                ));
            }
            p.to_path_buf()
        }
        None => match which::which(tool.command()) {
            Ok(p) => p,
            Err(e) => {
                return Detection::missing(format!("{} not on PATH: {}", tool.command(), e));
            }
        },
    };

    let version = probe_version(&path).await;
    debug!(tool = %tool, path = %path.display(), version = ?version, "tool detected");

    Detection {
        available: true,
        path: Some(path),
        version,
        error: None,
    }
}

/// Run `<tool> --version` and return the first output line.
async fn probe_version(path: &Path) -> Option<String> {
    let child = Command::new(path)
        .arg("--version")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .output();

    let output = tokio::time::timeout(VERSION_PROBE_TIMEOUT, child)
        .await
        .ok()?
        .ok()?;

    if !output.status.success() {
        return None;
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    stdout
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn detect_missing_tool_reports_unavailable() {
        // No tool enum variant maps to a nonexistent binary, so probe an
        // override path that cannot exist.
        let detection = detect_tool(
            ToolId::GeminiCli,
            Some(Path::new("/nonexistent/bin/gemini")),
        )
        .await;
        assert!(!detection.available);
        assert!(detection.path.is_none());
        assert!(detection.error.unwrap().contains("does not exist"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn detect_with_override_path() {
        // /bin/sh exists everywhere and answers --version on most systems;
        // availability must hold even if the version probe fails.
        let detection = detect_tool(ToolId::Opencode, Some(Path::new("/bin/sh"))).await;
        assert!(detection.available);
        assert_eq!(detection.path.unwrap(), PathBuf::from("/bin/sh"));
    }
}
