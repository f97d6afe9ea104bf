//! # Static Page Generation
//!
//! File: cli/src/bot/web.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! `viewweb` (and `makan page`) render one card per recommendation, ask the
//! completion service to wrap them in a full page, and overwrite the site's
//! index file. When `site.push_to_git` is set the site directory is then
//! committed and pushed; push failures are only logged.
//!
use super::prompts::{self, PAGE_MAX_TOKENS};
use super::BotContext;
use crate::common::fs::io::{ensure_dir_exists, write_string_to_file};
use crate::common::process::push_to_git;
use crate::core::error::Result;
use crate::core::templating::render_cards;
use crate::services::completion::CompletionRequest;
use anyhow::Context;
use std::path::PathBuf;
use tracing::{info, warn};

const COMMIT_MESSAGE: &str = "Update recommendations page";

/// Regenerates the index page and returns its path.
pub async fn regenerate_page(ctx: &BotContext) -> Result<PathBuf> {
    let cards = {
        let state = ctx.state.lock().await;
        render_cards(
            state.recommendations.entries(),
            &ctx.config.storage.default_image,
        )?
    };

    let request = CompletionRequest::prompt(
        prompts::web_page(&ctx.config.bot.persona, &cards),
        PAGE_MAX_TOKENS,
    );
    let generated = ctx
        .completer
        .complete(request)
        .await
        .context("Failed to generate the page HTML")?;
    let html = strip_code_fences(&generated);

    let site_dir = ctx.config.site.directory_path(&ctx.config.storage);
    ensure_dir_exists(&site_dir)?;
    let index = ctx.config.site.index_path(&ctx.config.storage);
    write_string_to_file(&index, html)?;
    info!("Wrote {} ({} bytes)", index.display(), html.len());

    if ctx.config.site.push_to_git {
        match push_to_git(&site_dir, COMMIT_MESSAGE).await {
            Ok(()) => info!("Pushed {} to its git remote", site_dir.display()),
            Err(e) => warn!("Could not push the page: {:#}", e),
        }
    }
    Ok(index)
}

/// `viewweb` reply text.
pub async fn handle_viewweb(ctx: &BotContext) -> String {
    match regenerate_page(ctx).await {
        Ok(index) => match &ctx.config.site.public_url {
            Some(url) => format!("Webpage updated! View it at {}", url),
            None => format!("Webpage updated! Saved to {}", index.display()),
        },
        Err(e) => {
            warn!("viewweb failed: {:#}", e);
            format!("Failed to generate webpage: {:#}", e)
        }
    }
}

/// Removes a surrounding Markdown code fence (```` ```html ... ``` ````).
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string (`html`) on the opening line.
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };
    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim()
}
