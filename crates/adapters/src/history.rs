// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! History adapter: the external session-search tool ("cass").
//!
//! The tool indexes past agent sessions and answers keyword queries. It is
//! optional at runtime: callers must treat [`HistoryError::Unavailable`] as
//! "no results", never as a hard failure. The one exception is the evidence
//! gate, which needs to distinguish unavailable from empty.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use crate::subprocess::{run_with_timeout, SubprocessError, TOOL_TIMEOUT};

/// Exit code the tool uses to signal a missing index.
const INDEX_MISSING_EXIT: i32 = 3;

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("history tool unavailable")]
    Unavailable,
    #[error("history tool timed out")]
    Timeout,
    #[error("history tool failed: {0}")]
    Tool(String),
    #[error("unparseable history output: {0}")]
    Parse(String),
}

impl From<SubprocessError> for HistoryError {
    fn from(e: SubprocessError) -> Self {
        match e {
            SubprocessError::NotFound { .. } => HistoryError::Unavailable,
            SubprocessError::Timeout { .. } => HistoryError::Timeout,
            SubprocessError::Io { source, .. } => HistoryError::Tool(source.to_string()),
        }
    }
}

/// One matched snippet from a past session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryHit {
    pub source_path: String,
    #[serde(default)]
    pub line_number: u32,
    #[serde(default)]
    pub agent: String,
    pub snippet: String,
    #[serde(default)]
    pub score: f64,
}

/// Search parameters.
#[derive(Debug, Clone, Default)]
pub struct SearchOpts {
    pub limit: usize,
    pub days: u32,
    pub agent: Option<String>,
    pub workspace: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineSession {
    pub path: String,
    #[serde(default)]
    pub agent: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineGroup {
    pub date: String,
    #[serde(default)]
    pub sessions: Vec<TimelineSession>,
}

#[derive(Debug, Deserialize)]
struct TimelineDoc {
    #[serde(default)]
    groups: Vec<TimelineGroup>,
}

/// Read access to historical sessions.
#[async_trait]
pub trait HistoryAdapter: Send + Sync {
    async fn search(&self, query: &str, opts: &SearchOpts)
        -> Result<Vec<HistoryHit>, HistoryError>;

    /// Full session transcript as markdown, `None` when the session is gone.
    async fn export_session(&self, session_path: &str) -> Result<Option<String>, HistoryError>;

    /// Recent sessions grouped by day.
    async fn timeline(&self, days: u32) -> Result<Vec<TimelineGroup>, HistoryError>;
}

/// Production adapter shelling out to the `cass` binary.
pub struct CassHistory {
    bin: String,
    timeout: Duration,
}

impl CassHistory {
    pub fn new(bin: impl Into<String>) -> Self {
        Self { bin: bin.into(), timeout: TOOL_TIMEOUT }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Run one tool invocation; on `INDEX_MISSING` rebuild the index and
    /// retry exactly once.
    async fn run(&self, args: &[&str]) -> Result<String, HistoryError> {
        let output = run_with_timeout(&self.bin, args, self.timeout).await?;
        if output.status.success() {
            return Ok(String::from_utf8_lossy(&output.stdout).into_owned());
        }
        if output.status.code() == Some(INDEX_MISSING_EXIT) {
            warn!(tool = %self.bin, "history index missing; rebuilding once");
            let rebuild = run_with_timeout(&self.bin, &["index", "--rebuild"], self.timeout).await?;
            if !rebuild.status.success() {
                return Err(HistoryError::Tool("index rebuild failed".to_string()));
            }
            let retry = run_with_timeout(&self.bin, args, self.timeout).await?;
            if retry.status.success() {
                return Ok(String::from_utf8_lossy(&retry.stdout).into_owned());
            }
        }
        Err(HistoryError::Tool(String::from_utf8_lossy(&output.stderr).into_owned()))
    }
}

#[async_trait]
impl HistoryAdapter for CassHistory {
    async fn search(
        &self,
        query: &str,
        opts: &SearchOpts,
    ) -> Result<Vec<HistoryHit>, HistoryError> {
        let limit = opts.limit.to_string();
        let days = opts.days.to_string();
        let mut args = vec!["search", query, "--json", "--limit", &limit, "--days", &days];
        if let Some(agent) = opts.agent.as_deref() {
            args.push("--agent");
            args.push(agent);
        }
        if let Some(workspace) = opts.workspace.as_deref() {
            args.push("--workspace");
            args.push(workspace);
        }
        let stdout = self.run(&args).await?;
        let hits: Vec<HistoryHit> =
            serde_json::from_str(&stdout).map_err(|e| HistoryError::Parse(e.to_string()))?;
        debug!(query, hits = hits.len(), "history search");
        Ok(hits)
    }

    async fn export_session(&self, session_path: &str) -> Result<Option<String>, HistoryError> {
        match self.run(&["export", session_path, "--format", "markdown"]).await {
            Ok(text) if text.trim().is_empty() => Ok(None),
            Ok(text) => Ok(Some(text)),
            // A vanished session is a soft miss, not a failure
            Err(HistoryError::Tool(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn timeline(&self, days: u32) -> Result<Vec<TimelineGroup>, HistoryError> {
        let days = days.to_string();
        let stdout = self.run(&["timeline", "--days", &days, "--json"]).await?;
        let doc: TimelineDoc =
            serde_json::from_str(&stdout).map_err(|e| HistoryError::Parse(e.to_string()))?;
        Ok(doc.groups)
    }
}

// ── Fake for tests and offline runs ─────────────────────────────────────────

/// Canned history used by tests and `reflect --offline`.
#[cfg(any(test, feature = "test-support"))]
#[derive(Default)]
pub struct FakeHistory {
    inner: parking_lot::Mutex<FakeHistoryState>,
}

#[cfg(any(test, feature = "test-support"))]
#[derive(Default)]
struct FakeHistoryState {
    hits: Vec<HistoryHit>,
    exports: std::collections::HashMap<String, String>,
    groups: Vec<TimelineGroup>,
    unavailable: bool,
    queries: Vec<String>,
}

#[cfg(any(test, feature = "test-support"))]
impl FakeHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unavailable() -> Self {
        let fake = Self::default();
        fake.inner.lock().unavailable = true;
        fake
    }

    pub fn push_hit(&self, source_path: &str, snippet: &str) {
        self.inner.lock().hits.push(HistoryHit {
            source_path: source_path.to_string(),
            line_number: 1,
            agent: "claude-code".to_string(),
            snippet: snippet.to_string(),
            score: 1.0,
        });
    }

    pub fn set_export(&self, session_path: &str, transcript: &str) {
        self.inner.lock().exports.insert(session_path.to_string(), transcript.to_string());
    }

    pub fn push_session(&self, date: &str, path: &str) {
        let mut inner = self.inner.lock();
        let session =
            TimelineSession { path: path.to_string(), agent: "claude-code".to_string() };
        match inner.groups.iter_mut().find(|g| g.date == date) {
            Some(group) => group.sessions.push(session),
            None => inner
                .groups
                .push(TimelineGroup { date: date.to_string(), sessions: vec![session] }),
        }
    }

    /// Queries observed so far, for assertions.
    pub fn queries(&self) -> Vec<String> {
        self.inner.lock().queries.clone()
    }
}

#[cfg(any(test, feature = "test-support"))]
#[async_trait]
impl HistoryAdapter for FakeHistory {
    async fn search(
        &self,
        query: &str,
        opts: &SearchOpts,
    ) -> Result<Vec<HistoryHit>, HistoryError> {
        let mut inner = self.inner.lock();
        if inner.unavailable {
            return Err(HistoryError::Unavailable);
        }
        inner.queries.push(query.to_string());
        let limit = if opts.limit == 0 { inner.hits.len() } else { opts.limit };
        Ok(inner.hits.iter().take(limit).cloned().collect())
    }

    async fn export_session(&self, session_path: &str) -> Result<Option<String>, HistoryError> {
        let inner = self.inner.lock();
        if inner.unavailable {
            return Err(HistoryError::Unavailable);
        }
        Ok(inner.exports.get(session_path).cloned())
    }

    async fn timeline(&self, days: u32) -> Result<Vec<TimelineGroup>, HistoryError> {
        let _ = days;
        let inner = self.inner.lock();
        if inner.unavailable {
            return Err(HistoryError::Unavailable);
        }
        Ok(inner.groups.clone())
    }
}

#[cfg(test)]
#[path = "history_tests.rs"]
mod tests;
