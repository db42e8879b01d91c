// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subprocess execution with timeout for external tools.

use std::process::Output;
use std::time::Duration;
use thiserror::Error;

/// Default timeout for external search/export invocations.
pub const TOOL_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum SubprocessError {
    #[error("{tool} not found on PATH")]
    NotFound { tool: String },
    #[error("{tool} timed out after {timeout:?}")]
    Timeout { tool: String, timeout: Duration },
    #[error("failed to run {tool}: {source}")]
    Io {
        tool: String,
        #[source]
        source: std::io::Error,
    },
}

/// Run `tool` with `args`, killing it when the timeout elapses.
pub async fn run_with_timeout(
    tool: &str,
    args: &[&str],
    timeout: Duration,
) -> Result<Output, SubprocessError> {
    let mut command = tokio::process::Command::new(tool);
    command.args(args).kill_on_drop(true);

    let fut = command.output();
    match tokio::time::timeout(timeout, fut).await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(SubprocessError::NotFound { tool: tool.to_string() })
        }
        Ok(Err(source)) => Err(SubprocessError::Io { tool: tool.to_string(), source }),
        Err(_) => Err(SubprocessError::Timeout { tool: tool.to_string(), timeout }),
    }
}

#[cfg(test)]
#[path = "subprocess_tests.rs"]
mod tests;
