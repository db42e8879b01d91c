// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! cm: procedural memory for coding agents.

mod commands;
mod exit_error;
mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use commands::Ctx;
use exit_error::ExitError;
use output::OutputFormat;

#[derive(Parser)]
#[command(name = "cm", version, about = "Procedural-memory store for coding agents")]
struct Cli {
    /// Repository whose `.cass/` overlay should cascade over the global
    /// playbook.
    #[arg(long, global = true)]
    repo: Option<PathBuf>,

    /// Output format.
    #[arg(long, value_enum, global = true, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Add a rule to the global playbook
    Add {
        /// The rule text
        content: String,
        #[arg(long)]
        category: String,
        #[arg(long)]
        scope: Option<String>,
        #[arg(long)]
        workspace: Option<String>,
        /// Comma-separated tags
        #[arg(long, value_delimiter = ',')]
        tags: Vec<String>,
    },
    /// List bullets from the merged view
    List {
        #[arg(long)]
        category: Option<String>,
        /// Include retired bullets
        #[arg(long)]
        all: bool,
    },
    /// Show one bullet in full
    Show { id: String },
    /// Retire a bullet
    Deprecate {
        id: String,
        #[arg(long)]
        reason: String,
        #[arg(long)]
        replaced_by: Option<String>,
    },
    /// Protect a bullet from automatic lifecycle changes
    Pin {
        id: String,
        #[arg(long)]
        reason: Option<String>,
    },
    /// Remove a bullet's pin
    Unpin { id: String },
    /// Record helpful/harmful feedback for a bullet
    Feedback {
        id: String,
        /// helpful or harmful
        direction: String,
        #[arg(long)]
        reason: Option<String>,
        #[arg(long)]
        session: Option<String>,
    },
    /// Build a ranked context briefing for a task
    Context {
        /// Task description
        task: Vec<String>,
        #[arg(long)]
        workspace: Option<String>,
    },
    /// Run one reflection cycle over recent sessions
    Reflect {
        #[arg(long, default_value_t = 7)]
        days: u32,
        #[arg(long)]
        dry_run: bool,
        /// Use the deterministic offline extractor instead of an LLM
        #[arg(long)]
        offline: bool,
    },
    /// Record a session outcome and apply feedback to the rules it used
    Outcome {
        session_id: String,
        /// success, failure, or mixed
        status: String,
        /// Comma-separated rule ids the session relied on
        #[arg(long, value_delimiter = ',')]
        rules: Vec<String>,
        #[arg(long)]
        notes: Option<String>,
        #[arg(long)]
        duration_sec: Option<u64>,
        #[arg(long)]
        error_count: Option<u32>,
        #[arg(long)]
        had_retries: bool,
        /// positive, neutral, or negative
        #[arg(long)]
        sentiment: Option<String>,
        #[arg(long)]
        session_path: Option<String>,
    },
    /// Deprecate a bullet and blocklist its content permanently
    Forget {
        id: String,
        #[arg(long)]
        reason: String,
    },
    /// Show paths, configuration, and external tool availability
    Doctor,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let format = cli.format;
    if let Err(e) = run(cli).await {
        output::print_failure(format, "error", &e.message);
        std::process::exit(e.code);
    }
}

async fn run(cli: Cli) -> Result<(), ExitError> {
    let ctx = Ctx::resolve(cli.repo, cli.format);
    match cli.command {
        Command::Add { content, category, scope, workspace, tags } => {
            commands::bullet::add(
                &ctx,
                commands::bullet::AddArgs { content, category, scope, workspace, tags },
            )
        }
        Command::List { category, all } => commands::bullet::list(&ctx, category, all),
        Command::Show { id } => commands::bullet::show(&ctx, &id),
        Command::Deprecate { id, reason, replaced_by } => {
            commands::bullet::deprecate(&ctx, &id, reason, replaced_by)
        }
        Command::Pin { id, reason } => commands::bullet::pin(&ctx, &id, reason),
        Command::Unpin { id } => commands::bullet::unpin(&ctx, &id),
        Command::Feedback { id, direction, reason, session } => {
            commands::bullet::feedback(&ctx, &id, &direction, reason, session)
        }
        Command::Context { task, workspace } => {
            commands::context::run(&ctx, task, workspace).await
        }
        Command::Reflect { days, dry_run, offline } => {
            commands::reflect::run(
                &ctx,
                commands::reflect::ReflectArgs { days, dry_run, offline },
            )
            .await
        }
        Command::Outcome {
            session_id,
            status,
            rules,
            notes,
            duration_sec,
            error_count,
            had_retries,
            sentiment,
            session_path,
        } => commands::outcome::run(
            &ctx,
            commands::outcome::OutcomeArgs {
                session_id,
                status,
                rules,
                notes,
                duration_sec,
                error_count,
                had_retries,
                sentiment,
                session_path,
            },
        ),
        Command::Forget { id, reason } => commands::bullet::forget(&ctx, &id, reason),
        Command::Doctor => commands::doctor::run(&ctx).await,
    }
}
