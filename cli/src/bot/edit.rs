//! # Edit / Delete Sequence
//!
//! File: cli/src/bot/edit.rs
//! Author: Christi Mahu
//!
//! `edit` asks for a record id, then a field selector (1-6), then the new
//! value. Selector 6 deletes the record. Any user may edit any record.
//!
use super::prompts::{self, SUMMARY_MAX_TOKENS};
use super::session::{Advance, Session};
use super::{BotContext, Incoming};
use crate::core::config::TimeoutConfig;
use crate::core::error::Result;
use crate::services::completion::CompletionRequest;
use crate::store::records::{parse_id, parse_rating, FieldEdit};
use anyhow::Context;
use async_trait::async_trait;
use std::time::Duration;
use tracing::info;

const FIELD_MENU: &str = "What would you like to edit?\n\
1. URL\n\
2. Name\n\
3. Cuisine\n\
4. Rating\n\
5. Write new review\n\
6. Delete this recommendation";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Url,
    Name,
    Cuisine,
    Rating,
    Review,
}

impl Field {
    fn prompt(self) -> &'static str {
        match self {
            Field::Url => "Enter new URL:",
            Field::Name => "Enter new name:",
            Field::Cuisine => "Enter new cuisine:",
            Field::Rating => "Enter new rating out of 10:",
            Field::Review => "Enter new review:",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Id,
    Selector { id: u32 },
    Value { id: u32, field: Field },
}

pub struct EditSession {
    step: Step,
}

impl EditSession {
    pub fn start() -> (String, Self) {
        (
            "Please enter the ID of the recommendation you want to edit/delete:".to_string(),
            Self { step: Step::Id },
        )
    }
}

/// Turns the typed value into an edit; a new review is summarised first.
async fn field_edit(ctx: &BotContext, field: Field, reply: &str) -> Result<FieldEdit> {
    let edit = match field {
        Field::Url => FieldEdit::Url(reply.to_string()),
        Field::Name => FieldEdit::Name(reply.to_string()),
        Field::Cuisine => FieldEdit::Cuisine(reply.to_string()),
        Field::Rating => FieldEdit::Rating(parse_rating(reply)?),
        Field::Review => {
            let request =
                CompletionRequest::prompt(prompts::review_rewrite(reply), SUMMARY_MAX_TOKENS);
            let summary = ctx
                .completer
                .complete(request)
                .await
                .context("Failed to summarise the review")?;
            FieldEdit::Review(summary)
        }
    };
    Ok(edit)
}

#[async_trait]
impl Session for EditSession {
    fn command(&self) -> &'static str {
        "edit"
    }

    fn failure_prefix(&self) -> &'static str {
        "Edit failed"
    }

    fn timeout(&self, timeouts: &TimeoutConfig) -> Duration {
        match self.step {
            Step::Value {
                field: Field::Review,
                ..
            } => timeouts.long_reply(),
            _ => timeouts.reply(),
        }
    }

    async fn advance(&mut self, ctx: &BotContext, msg: &Incoming) -> Result<Advance> {
        let reply = msg.content.trim();
        match self.step {
            Step::Id => {
                let id = parse_id(reply)?;
                if ctx.state.lock().await.recommendations.get(id).is_none() {
                    return Ok(Advance::Finished(vec!["Invalid ID.".to_string()]));
                }
                self.step = Step::Selector { id };
                Ok(Advance::Continue(vec![FIELD_MENU.to_string()]))
            }
            Step::Selector { id } => {
                let field = match reply {
                    "1" => Field::Url,
                    "2" => Field::Name,
                    "3" => Field::Cuisine,
                    "4" => Field::Rating,
                    "5" => Field::Review,
                    "6" => {
                        let mut state = ctx.state.lock().await;
                        let mut recommendations = state.recommendations.clone();
                        let removed = recommendations.remove(id)?;
                        ctx.store.save_recommendations(&recommendations)?;
                        state.recommendations = recommendations;
                        info!(
                            "{} deleted recommendation {} ({})",
                            msg.author.name, id, removed.name
                        );
                        return Ok(Advance::Finished(vec![
                            "Recommendation deleted.".to_string(),
                        ]));
                    }
                    _ => return Ok(Advance::Finished(vec!["Invalid choice.".to_string()])),
                };
                self.step = Step::Value { id, field };
                Ok(Advance::Continue(vec![field.prompt().to_string()]))
            }
            Step::Value { id, field } => {
                let edit = field_edit(ctx, field, reply).await?;
                let mut state = ctx.state.lock().await;
                let mut recommendations = state.recommendations.clone();
                recommendations.apply(id, edit)?;
                ctx.store.save_recommendations(&recommendations)?;
                state.recommendations = recommendations;
                info!("{} edited {:?} of recommendation {}", msg.author.name, field, id);
                Ok(Advance::Finished(vec!["Entry updated.".to_string()]))
            }
        }
    }
}
