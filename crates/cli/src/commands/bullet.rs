// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bullet CRUD commands: add, list, show, deprecate, pin, unpin, forget,
//! feedback.

use chrono::Utc;
use cm_core::{Clock, FeedbackType, NewBullet, Scope, SystemClock};
use cm_engine::{record_feedback, FeedbackOptions};
use cm_storage::{append_toxic, ToxicEntry};

use super::Ctx;
use crate::exit_error::ExitError;
use crate::output::{bullet_line, print_json, OutputFormat};

pub struct AddArgs {
    pub content: String,
    pub category: String,
    pub scope: Option<String>,
    pub workspace: Option<String>,
    pub tags: Vec<String>,
}

pub fn add(ctx: &Ctx, args: AddArgs) -> Result<(), ExitError> {
    let scope = match args.scope.as_deref() {
        Some(s) => Some(
            Scope::parse(s).ok_or_else(|| ExitError::user(format!("invalid scope: {}", s)))?,
        ),
        None => None,
    };
    let now = SystemClock.now();
    let workspace = args.workspace.or_else(|| ctx.workspace());

    let id = ctx.store.mutate_global(now, |pb| {
        pb.add_bullet(
            NewBullet {
                content: args.content,
                category: args.category,
                tags: args.tags,
                scope,
                workspace,
                ..Default::default()
            },
            None,
            None,
            now,
        )
    })?;

    match ctx.format {
        OutputFormat::Text => println!("Added {}", id),
        OutputFormat::Json => print_json(&serde_json::json!({ "success": true, "id": id }))?,
    }
    Ok(())
}

pub fn list(ctx: &Ctx, category: Option<String>, all: bool) -> Result<(), ExitError> {
    let playbook = ctx.store.load_merged()?;
    let now = SystemClock.now();

    let bullets: Vec<&cm_core::Bullet> = match (&category, all) {
        (Some(cat), _) => playbook.bullets_by_category(cat).collect(),
        (None, true) => playbook.bullets.iter().collect(),
        (None, false) => playbook.active_bullets().collect(),
    };

    match ctx.format {
        OutputFormat::Text => {
            if bullets.is_empty() {
                println!("No bullets");
                return Ok(());
            }
            for bullet in bullets {
                println!("{}", bullet_line(bullet, now));
            }
        }
        OutputFormat::Json => print_json(&bullets)?,
    }
    Ok(())
}

pub fn show(ctx: &Ctx, id: &str) -> Result<(), ExitError> {
    let playbook = ctx.store.load_merged()?;
    let bullet = playbook
        .find_bullet(id)
        .ok_or_else(|| ExitError::user(format!("unknown bullet id: {}", id)))?;

    match ctx.format {
        OutputFormat::Text => {
            println!("id:        {}", bullet.id);
            println!("content:   {}", bullet.content);
            println!("category:  {}", bullet.category);
            println!("kind:      {}", bullet.kind);
            println!("scope:     {}", bullet.scope);
            println!("state:     {}  maturity: {}", bullet.state, bullet.maturity);
            println!("feedback:  {} helpful / {} harmful", bullet.helpful_count, bullet.harmful_count);
            if bullet.pinned {
                println!(
                    "pinned:    yes{}",
                    bullet
                        .pinned_reason
                        .as_deref()
                        .map(|r| format!(" ({})", r))
                        .unwrap_or_default()
                );
            }
            if bullet.deprecated {
                println!(
                    "deprecated: {}",
                    bullet.deprecation_reason.as_deref().unwrap_or("yes")
                );
            }
            if !bullet.tags.is_empty() {
                println!("tags:      {}", bullet.tags.join(", "));
            }
        }
        OutputFormat::Json => print_json(bullet)?,
    }
    Ok(())
}

pub fn deprecate(
    ctx: &Ctx,
    id: &str,
    reason: String,
    replaced_by: Option<String>,
) -> Result<(), ExitError> {
    let now = SystemClock.now();
    let path = ctx.store.owner_path(id)?;
    let found = ctx.store.mutate(&path, now, |pb| {
        pb.deprecate_bullet(id, &reason, replaced_by.map(Into::into), now)
    })?;
    if !found {
        return Err(ExitError::user(format!("unknown bullet id: {}", id)));
    }
    match ctx.format {
        OutputFormat::Text => println!("Deprecated {}", id),
        OutputFormat::Json => print_json(&serde_json::json!({ "success": true }))?,
    }
    Ok(())
}

pub fn pin(ctx: &Ctx, id: &str, reason: Option<String>) -> Result<(), ExitError> {
    let now = SystemClock.now();
    let path = ctx.store.owner_path(id)?;
    let found = ctx.store.mutate(&path, now, |pb| pb.pin_bullet(id, reason, now))?;
    if !found {
        return Err(ExitError::user(format!("unknown bullet id: {}", id)));
    }
    println!("Pinned {}", id);
    Ok(())
}

pub fn unpin(ctx: &Ctx, id: &str) -> Result<(), ExitError> {
    let now = SystemClock.now();
    let path = ctx.store.owner_path(id)?;
    let found = ctx.store.mutate(&path, now, |pb| pb.unpin_bullet(id, now))?;
    if !found {
        return Err(ExitError::user(format!("unknown bullet id: {}", id)));
    }
    println!("Unpinned {}", id);
    Ok(())
}

pub fn feedback(
    ctx: &Ctx,
    id: &str,
    direction: &str,
    reason: Option<String>,
    session: Option<String>,
) -> Result<(), ExitError> {
    let feedback_type = match direction.to_ascii_lowercase().as_str() {
        "helpful" => FeedbackType::Helpful,
        "harmful" => FeedbackType::Harmful,
        other => {
            return Err(ExitError::user(format!(
                "feedback must be helpful or harmful, got {}",
                other
            )))
        }
    };
    let now = SystemClock.now();
    let path = ctx.store.owner_path(id)?;
    let found = ctx.store.mutate(&path, now, |pb| {
        record_feedback(
            pb,
            id,
            feedback_type,
            FeedbackOptions { session_path: session, reason, ..Default::default() },
            now,
        )
    })?;
    if !found {
        return Err(ExitError::user(format!("unknown bullet id: {}", id)));
    }
    match ctx.format {
        OutputFormat::Text => println!("Recorded {} for {}", feedback_type, id),
        OutputFormat::Json => print_json(&serde_json::json!({ "success": true }))?,
    }
    Ok(())
}

/// Deprecate a bullet *and* record its content in the toxic log so
/// reflection can never resurrect it.
pub fn forget(ctx: &Ctx, id: &str, reason: String) -> Result<(), ExitError> {
    let now = SystemClock.now();
    let path = ctx.store.owner_path(id)?;

    let content = ctx.store.mutate(&path, now, |pb| {
        let content = pb.find_bullet(id).map(|b| b.content.clone());
        if content.is_some() {
            pb.deprecate_bullet(id, &reason, None, now);
        }
        content
    })?;

    let content = content.ok_or_else(|| ExitError::user(format!("unknown bullet id: {}", id)))?;
    append_toxic(
        &ctx.data_root.toxic_log_path(),
        &ToxicEntry {
            id: id.to_string(),
            content,
            reason: Some(reason),
            forgotten_at: Utc::now(),
        },
    )
    .map_err(ExitError::store)?;

    println!("Forgot {} (recorded in toxic log)", id);
    Ok(())
}
