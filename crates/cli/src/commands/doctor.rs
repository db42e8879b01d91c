// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `cm doctor`: environment and configuration diagnostics.

use cm_adapters::{CassHistory, HistoryAdapter, SearchOpts};

use super::Ctx;
use crate::exit_error::ExitError;
use crate::output::{print_json, OutputFormat};

pub async fn run(ctx: &Ctx) -> Result<(), ExitError> {
    let playbook_path = ctx.data_root.playbook_path(&ctx.config);
    let playbook = ctx.store.load_merged()?;
    let active = playbook.active_bullets().count();

    let history = CassHistory::new(ctx.config.cass_path());
    let cass_ok = history
        .search("doctor probe", &SearchOpts { limit: 1, days: 1, ..Default::default() })
        .await
        .is_ok();

    match ctx.format {
        OutputFormat::Json => print_json(&serde_json::json!({
            "dataRoot": ctx.data_root.root(),
            "playbookPath": playbook_path,
            "activeBullets": active,
            "totalBullets": playbook.bullets.len(),
            "cassPath": ctx.config.cass_path(),
            "cassAvailable": cass_ok,
        }))?,
        OutputFormat::Text => {
            println!("data root:      {}", ctx.data_root.root().display());
            println!("playbook:       {}", playbook_path.display());
            println!("bullets:        {} active / {} total", active, playbook.bullets.len());
            for (maturity, count) in playbook.maturity_counts() {
                println!("  {:<12} {}", maturity.to_string(), count);
            }
            println!("cass:           {} ({})", ctx.config.cass_path(), if cass_ok { "ok" } else { "unavailable" });
            match &ctx.repo {
                Some(repo) => println!("repo overlay:   {}", repo.display()),
                None => println!("repo overlay:   (none)"),
            }
        }
    }
    Ok(())
}
