// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `cm context <task>`: the ranked briefing for a task.

use cm_adapters::CassHistory;
use cm_core::{Clock, SystemClock};
use cm_engine::{build_context, ContextOptions};

use super::Ctx;
use crate::exit_error::ExitError;
use crate::output::{print_json, OutputFormat};

pub async fn run(ctx: &Ctx, task_words: Vec<String>, workspace: Option<String>) -> Result<(), ExitError> {
    let task = task_words.join(" ");
    if task.trim().is_empty() {
        return Err(ExitError::user("context requires a task description"));
    }
    let history = CassHistory::new(ctx.config.cass_path());
    let workspace = workspace.or_else(|| ctx.workspace());

    let result = build_context(
        &ctx.store,
        &history,
        &ctx.config,
        &task,
        ContextOptions { workspace, ..Default::default() },
        SystemClock.now(),
    )
    .await?;

    match ctx.format {
        OutputFormat::Json => print_json(&result)?,
        OutputFormat::Text => {
            println!("Task: {}", result.task);
            if result.relevant_bullets.is_empty() && result.anti_patterns.is_empty() {
                println!("\nNo relevant rules.");
            }
            if !result.relevant_bullets.is_empty() {
                println!("\nRules:");
                for bullet in &result.relevant_bullets {
                    println!("  [{:.2}] {} ({})", bullet.score, bullet.content, bullet.maturity);
                }
            }
            if !result.anti_patterns.is_empty() {
                println!("\nAnti-patterns:");
                for bullet in &result.anti_patterns {
                    println!("  [{:.2}] {}", bullet.score, bullet.content);
                }
            }
            if !result.deprecated_warnings.is_empty() {
                println!("\nWarnings:");
                for warning in &result.deprecated_warnings {
                    let detail = warning
                        .replacement
                        .as_deref()
                        .map(|r| format!(" — use {}", r))
                        .unwrap_or_default();
                    println!("  deprecated: {}{}", warning.pattern, detail);
                }
            }
            if !result.history_snippets.is_empty() {
                println!("\nHistory:");
                for hit in &result.history_snippets {
                    println!("  {}:{}  {}", hit.source_path, hit.line_number, hit.snippet);
                }
            }
            if result.history_unavailable {
                println!("\n(history search unavailable; snippets omitted)");
            }
            if !result.suggested_history_queries.is_empty() {
                println!("\nTry also: {}", result.suggested_history_queries.join(" | "));
            }
        }
    }
    Ok(())
}
