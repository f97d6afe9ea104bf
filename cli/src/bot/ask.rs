//! # Question Answering
//!
//! File: cli/src/bot/ask.rs
//! Author: Christi Mahu
//!
//! `ask <question>`: the completion service answers in persona, given the
//! newest recommendations as context and the shared rolling history. The
//! question enters the window before the call and the answer after it.
//!
use super::prompts::{self, ASK_MAX_TOKENS};
use super::{Author, BotContext};
use crate::core::error::Result;
use crate::services::completion::{ChatTurn, CompletionRequest};
use tracing::warn;

/// Answers `question` and returns the reply text, including failures.
pub async fn answer(ctx: &BotContext, author: &Author, question: &str) -> String {
    match try_answer(ctx, question).await {
        Ok(text) => {
            let title = ctx.title_of(&author.id).await;
            format!("{} {}, here's what I think:\n{}", title, author.name, text)
        }
        Err(e) => {
            warn!("ask failed: {:#}", e);
            format!("Sorry, something went wrong while answering: {:#}", e)
        }
    }
}

async fn try_answer(ctx: &BotContext, question: &str) -> Result<String> {
    let request = {
        let mut state = ctx.state.lock().await;
        state.history.push(ChatTurn::user(question));
        let recent = state.recommendations.latest(ctx.config.bot.context_records);
        CompletionRequest {
            system: Some(prompts::ask_system(&ctx.config.bot.persona, recent)),
            turns: state.history.snapshot(),
            max_tokens: ASK_MAX_TOKENS,
        }
    };

    let text = ctx.completer.complete(request).await?;
    ctx.state
        .lock()
        .await
        .history
        .push(ChatTurn::assistant(text.clone()));
    Ok(text)
}
