// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `cm outcome`: record an observed session outcome and apply its feedback.

use cm_core::{Clock, OutcomeRecord, OutcomeStatus, Sentiment, SystemClock};
use cm_engine::apply_outcome;

use super::Ctx;
use crate::exit_error::ExitError;
use crate::output::{print_json, OutputFormat};

pub struct OutcomeArgs {
    pub session_id: String,
    pub status: String,
    pub rules: Vec<String>,
    pub notes: Option<String>,
    pub duration_sec: Option<u64>,
    pub error_count: Option<u32>,
    pub had_retries: bool,
    pub sentiment: Option<String>,
    pub session_path: Option<String>,
}

pub fn run(ctx: &Ctx, args: OutcomeArgs) -> Result<(), ExitError> {
    let outcome = OutcomeStatus::parse(&args.status)
        .ok_or_else(|| ExitError::user("outcome must be success, failure, or mixed"))?;
    let sentiment = match args.sentiment.as_deref() {
        None => None,
        Some("positive") => Some(Sentiment::Positive),
        Some("neutral") => Some(Sentiment::Neutral),
        Some("negative") => Some(Sentiment::Negative),
        Some(other) => {
            return Err(ExitError::user(format!(
                "sentiment must be positive, neutral, or negative, got {}",
                other
            )))
        }
    };

    let now = SystemClock.now();
    let record = OutcomeRecord {
        session_id: args.session_id.clone(),
        outcome,
        rules_used: args.rules,
        notes: args.notes,
        duration_sec: args.duration_sec,
        error_count: args.error_count,
        had_retries: args.had_retries,
        sentiment,
        recorded_at: now,
        path: args.session_path.unwrap_or_default(),
    };

    let applied = apply_outcome(&ctx.store, &ctx.data_root.outcomes_path(), &record, now)
        .map_err(ExitError::store)?;

    match ctx.format {
        OutputFormat::Json => print_json(&applied)?,
        OutputFormat::Text => {
            println!(
                "Recorded {} outcome for {}: {} {} event(s) applied (weight {:.1})",
                outcome,
                args.session_id,
                applied.events_applied,
                applied.feedback_type,
                applied.weight,
            );
            for unknown in &applied.unknown_rules {
                println!("  unknown rule skipped: {}", unknown);
            }
        }
    }
    Ok(())
}
