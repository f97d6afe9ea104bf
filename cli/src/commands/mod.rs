//! # Makan Command Modules
//!
//! File: cli/src/commands/mod.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! One module per `makan` subcommand:
//!
//! - `console`: chat with the bot from a terminal
//! - `serve`: HTTP webhook transport plus the generated site
//! - `page`: regenerate the static page once and exit
//!
//! Each defines its clap argument struct and an async `handle_*` function
//! called from `main.rs`. `build_bot` wires the production services.
//!
use crate::bot::{Bot, BotContext};
use crate::core::config::Config;
use crate::core::error::Result;
use crate::services::completion::LlmCompleter;
use crate::services::fetch::HttpFetcher;
use std::sync::Arc;
use tracing::warn;

/// Interactive terminal transport.
pub mod console;
/// One-shot page regeneration.
pub mod page;
/// HTTP transport (`POST /messages`) and static site.
pub mod serve;

/// Loads the documents and connects the bot to the configured LLM provider.
pub fn build_bot(config: Config) -> Result<Bot> {
    if config.llm.api_key().is_none() && config.llm.provider != "ollama" {
        warn!(
            "Environment variable {} is not set; completion requests will likely fail",
            config.llm.api_key_env
        );
    }
    let completer = Arc::new(LlmCompleter::from_config(&config.llm));
    let fetcher = Arc::new(HttpFetcher::new()?);
    let ctx = BotContext::load(config, completer, fetcher)?;
    Ok(Bot::new(Arc::new(ctx)))
}
