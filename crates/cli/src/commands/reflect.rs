// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `cm reflect`: run one reflection cycle over recent sessions.

use cm_adapters::{CassHistory, FakeExtractor, FakeValidator};
use cm_core::{Clock, SystemClock};
use cm_engine::{ReflectOptions, Reflector};

use super::Ctx;
use crate::exit_error::ExitError;
use crate::output::{print_json, OutputFormat};

pub struct ReflectArgs {
    pub days: u32,
    pub dry_run: bool,
    /// Use the deterministic offline extractor/validator instead of an LLM
    /// provider.
    pub offline: bool,
}

pub async fn run(ctx: &Ctx, args: ReflectArgs) -> Result<(), ExitError> {
    if !args.offline {
        // LLM providers are wired by the hosting environment; this binary
        // only ships the offline path.
        return Err(ExitError::user(
            "no LLM provider configured for diary extraction; re-run with --offline",
        ));
    }

    let history = CassHistory::new(ctx.config.cass_path());
    let extractor = FakeExtractor::new();
    let validator = FakeValidator::new();

    let reflector = Reflector {
        history: &history,
        extractor: &extractor,
        validator: Some(&validator),
        store: &ctx.store,
        data_root: &ctx.data_root,
        config: &ctx.config,
    };

    let opts = ReflectOptions {
        days: args.days,
        dry_run: args.dry_run,
        workspace: ctx.repo.clone(),
    };
    let summary = reflector
        .run(&opts, SystemClock.now())
        .await
        .map_err(ExitError::external)?;

    match ctx.format {
        OutputFormat::Json => print_json(&summary)?,
        OutputFormat::Text => {
            if args.dry_run {
                println!("Dry run — no changes made\n");
            }
            println!(
                "{} session(s) discovered, {} processed",
                summary.sessions_seen, summary.sessions_processed
            );
            println!(
                "{} delta(s) proposed, {} applied, {} rejected by the evidence gate",
                summary.deltas_proposed, summary.deltas_applied, summary.gate_rejected
            );
            for session in &summary.sessions {
                match &session.error {
                    Some(error) => println!("  {}  FAILED: {}", session.session_path, error),
                    None => println!(
                        "  {}  +{}/{}",
                        session.session_path, session.deltas_applied, session.deltas_proposed
                    ),
                }
            }
        }
    }
    Ok(())
}
