// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Secret redaction for all externally-supplied text.
//!
//! Session exports, user notes, and history snippets pass through here before
//! they are persisted, embedded in prompts, or shown. Redaction replaces the
//! whole match, so re-applying the sanitizer is a no-op.

use crate::config::SanitizeConfig;
use regex::Regex;
use tracing::{debug, info, warn};

const REDACTED: &str = "[REDACTED]";

/// Longest extra pattern we will compile.
const MAX_PATTERN_LEN: usize = 256;

/// Built-in secret classes. Order matters only for audit counts.
const BUILTIN_PATTERNS: &[(&str, &str)] = &[
    ("aws-access-key", r"\bAKIA[0-9A-Z]{16}\b"),
    ("bearer-token", r"(?i)\bbearer\s+[a-z0-9._~+/=-]{16,}"),
    ("api-key", r"\bsk-[A-Za-z0-9_-]{20,}\b"),
    (
        "pem-block",
        r"-----BEGIN [A-Z ]*PRIVATE KEY-----[A-Za-z0-9+/=\s]*-----END [A-Z ]*PRIVATE KEY-----",
    ),
    ("github-token", r"\bgh[pousr]_[A-Za-z0-9]{36,}\b"),
    ("github-fine-grained", r"\bgithub_pat_[A-Za-z0-9_]{22,}\b"),
    ("gitlab-token", r"\bglpat-[A-Za-z0-9_-]{20,}\b"),
    ("slack-token", r"\bxox[baprs]-[A-Za-z0-9-]{10,}\b"),
    (
        "database-url",
        r"\b(?:postgres|postgresql|mysql|mongodb(?:\+srv)?|redis|amqp)://[^\s:@/]+:[^\s@/]+@[^\s]+",
    ),
    (
        "secret-assignment",
        r#"(?i)\b(?:api[_-]?key|secret|token|password|passwd)\s*[=:]\s*["']?[A-Za-z0-9+/_.-]{8,}["']?"#,
    ),
];

/// Pattern-driven redactor. Compile once, apply to every external string.
pub struct Sanitizer {
    enabled: bool,
    audit_log: bool,
    audit_level: String,
    patterns: Vec<(String, Regex)>,
}

impl Sanitizer {
    pub fn new(config: &SanitizeConfig) -> Self {
        let mut patterns: Vec<(String, Regex)> = Vec::new();
        for (name, source) in BUILTIN_PATTERNS {
            match Regex::new(source) {
                Ok(re) => patterns.push(((*name).to_string(), re)),
                // Built-ins are covered by tests; this arm exists so a bad
                // pattern degrades to partial redaction instead of a panic.
                Err(e) => warn!(pattern = name, error = %e, "builtin pattern failed to compile"),
            }
        }
        for (i, source) in config.extra_patterns.iter().enumerate() {
            match guard_extra_pattern(source) {
                Ok(re) => patterns.push((format!("extra-{}", i), re)),
                Err(reason) => {
                    warn!(pattern = %source, reason, "skipping extra sanitizer pattern");
                }
            }
        }
        Self {
            enabled: config.enabled,
            audit_log: config.audit_log,
            audit_level: config.audit_level.clone(),
            patterns,
        }
    }

    /// Redact every secret match. Idempotent: the replacement token never
    /// matches any pattern.
    pub fn sanitize(&self, text: &str) -> String {
        if !self.enabled {
            return text.to_string();
        }
        let mut out = text.to_string();
        let mut total = 0usize;
        for (name, re) in &self.patterns {
            let count = re.find_iter(&out).count();
            if count > 0 {
                out = re.replace_all(&out, REDACTED).into_owned();
                total += count;
                if self.audit_log {
                    match self.audit_level.as_str() {
                        "info" => info!(pattern = %name, count, "redacted secrets"),
                        _ => debug!(pattern = %name, count, "redacted secrets"),
                    }
                }
            }
        }
        if self.audit_log && total > 0 {
            match self.audit_level.as_str() {
                "info" => info!(total, "sanitizer redactions"),
                _ => debug!(total, "sanitizer redactions"),
            }
        }
        out
    }

    /// Number of compiled patterns (builtin + accepted extras).
    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }
}

/// Validate a user-supplied pattern before compiling it.
///
/// Rejects patterns long enough to hide trouble and the classic ReDoS shape
/// of a quantifier nested inside a quantified group.
fn guard_extra_pattern(source: &str) -> Result<Regex, &'static str> {
    if source.len() > MAX_PATTERN_LEN {
        return Err("pattern longer than 256 chars");
    }
    if has_nested_quantifier(source) {
        return Err("nested quantifier");
    }
    Regex::new(source).map_err(|_| "invalid regex")
}

/// Detects `( ... * ... )*`-shaped patterns: a `*` or `+` inside a group that
/// is itself followed by `*`, `+`, or `?`.
fn has_nested_quantifier(source: &str) -> bool {
    let bytes = source.as_bytes();
    let mut stack: Vec<bool> = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 1,
            b'(' => stack.push(false),
            b'*' | b'+' => {
                if let Some(top) = stack.last_mut() {
                    *top = true;
                }
            }
            b')' => {
                let inner_quantified = stack.pop().unwrap_or(false);
                let followed = bytes.get(i + 1).is_some_and(|c| matches!(*c, b'*' | b'+' | b'?'));
                if inner_quantified && followed {
                    return true;
                }
                // Propagate so `((a+)b)*` is still caught
                if inner_quantified {
                    if let Some(top) = stack.last_mut() {
                        *top = true;
                    }
                }
            }
            _ => {}
        }
        i += 1;
    }
    false
}

#[cfg(test)]
#[path = "sanitize_tests.rs"]
mod tests;
