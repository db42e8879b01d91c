// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared output helpers: text/JSON switching and relative times.

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::Serialize;

use crate::exit_error::ExitError;

#[derive(Clone, Copy, Debug, Default, PartialEq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Print a serializable payload as pretty JSON.
pub fn print_json<T: Serialize>(value: &T) -> Result<(), ExitError> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| ExitError::store(format!("failed to encode json: {}", e)))?;
    println!("{}", text);
    Ok(())
}

/// Mutating commands print one structured failure and change nothing.
pub fn print_failure(format: OutputFormat, code: &str, message: &str) {
    match format {
        OutputFormat::Text => eprintln!("error[{}]: {}", code, message),
        OutputFormat::Json => {
            let obj = serde_json::json!({
                "success": false,
                "error": { "code": code, "message": message },
            });
            eprintln!("{}", obj);
        }
    }
}

/// Format a timestamp as relative time (e.g., "5s", "2m", "1h", "3d").
pub fn format_time_ago(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - at).num_seconds();
    if secs < 0 {
        return "-".to_string();
    }
    match secs {
        0..=59 => format!("{}s", secs),
        60..=3599 => format!("{}m", secs / 60),
        3600..=86_399 => format!("{}h", secs / 3600),
        _ => format!("{}d", secs / 86_400),
    }
}

/// One-line bullet summary for list output.
pub fn bullet_line(bullet: &cm_core::Bullet, now: DateTime<Utc>) -> String {
    let marker = if bullet.pinned {
        "*"
    } else if bullet.is_anti_pattern() {
        "!"
    } else {
        " "
    };
    format!(
        "{} {:<24} {:<12} {:<11} {:>4} {:>4}  {}",
        marker,
        cm_core::short(bullet.id.as_str(), 24),
        cm_core::short(&bullet.category, 12),
        bullet.maturity.to_string(),
        bullet.helpful_count,
        bullet.harmful_count,
        format_time_ago(bullet.updated_at, now),
    )
}

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;
