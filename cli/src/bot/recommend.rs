//! # Recommendation Submission
//!
//! File: cli/src/bot/recommend.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! The `recommend` conversation as a state machine:
//!
//! 1. restaurant URL (its page title becomes the suggested name)
//! 2. confirm the name, or type the correct one
//! 3. cuisine by menu key, or a typed cuisine
//! 4. rating out of 10
//! 5. optional picture
//! 6. if the rating is above zero: offer the seven-question review interview
//!
//! Nothing is written until the last step. The commit then takes the state
//! lock once: it files a typed cuisine, appends the record with the next id,
//! awards points, and persists every document it changed. If any step fails
//! or times out, the draft is dropped and no document changes. The one
//! exception is an uploaded picture, which is saved to the image directory
//! when received.
//!
use super::prompts::{self, REVIEW_QUESTIONS, SUMMARY_MAX_TOKENS};
use super::session::{Advance, Session};
use super::{Author, BotContext, BotState, Incoming};
use crate::common::fs::io::ensure_dir_exists;
use crate::core::config::TimeoutConfig;
use crate::core::error::{MakanError, Result};
use crate::services::completion::CompletionRequest;
use crate::services::fetch::unique_image_name;
use crate::store::cuisines::{CuisineChoice, CuisineTaxonomy};
use crate::store::ranks::{RankTable, POINTS_PER_RECOMMENDATION, POINTS_PER_REVIEW};
use crate::store::records::{parse_rating, NewRecommendation, Recommendations};
use anyhow::{anyhow, Context};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Url,
    ConfirmName,
    Name,
    Cuisine,
    TypedCuisine,
    Rating,
    Image,
    ReviewConsent,
    /// Waiting for the answer to `REVIEW_QUESTIONS[n]`.
    Interview(usize),
}

#[derive(Debug, Default)]
struct Draft {
    url: String,
    suggested_name: String,
    name: String,
    cuisine: String,
    typed_cuisine: bool,
    rating: f64,
    image: Option<String>,
    answers: Vec<String>,
}

pub struct RecommendSession {
    author: Author,
    step: Step,
    draft: Draft,
}

impl RecommendSession {
    /// Opening prompt and a session waiting for the URL.
    pub async fn start(ctx: &BotContext, author: &Author) -> (String, Self) {
        let title = ctx.title_of(&author.id).await;
        let prompt = format!(
            "{} {}, let’s make a new recommendation!\nStep 1️⃣: Send the restaurant URL.",
            title, author.name
        );
        let session = Self {
            author: author.clone(),
            step: Step::Url,
            draft: Draft::default(),
        };
        (prompt, session)
    }

    async fn ask_cuisine(&mut self, ctx: &BotContext) -> Advance {
        let menu = ctx.state.lock().await.cuisines.menu();
        self.step = Step::Cuisine;
        Advance::Continue(vec![format!(
            "**Step 3️⃣: Choose the cuisine type by number:**\n{}",
            menu
        )])
    }

    fn ask_rating(&mut self) -> Advance {
        self.step = Step::Rating;
        Advance::Continue(vec![
            "Step 4️⃣: Rate this place out of 10 (0 if not tried):".to_string(),
        ])
    }

    async fn save_picture(&mut self, ctx: &BotContext, msg: &Incoming) -> Result<()> {
        let Some(attachment) = msg.attachments.first() else {
            debug!("No picture uploaded; the default image will be used");
            return Ok(());
        };
        let dir = ctx.config.storage.image_dir_path();
        ensure_dir_exists(&dir)?;
        let filename = unique_image_name(&attachment.filename);
        ctx.fetcher
            .save_attachment(attachment, &dir.join(&filename))
            .await?;
        info!("Saved picture '{}' as {}", attachment.filename, filename);
        self.draft.image = Some(filename);
        Ok(())
    }

    async fn summarise_interview(&self, ctx: &BotContext) -> Result<String> {
        let request = CompletionRequest::prompt(
            prompts::interview_summary(&self.draft.answers),
            SUMMARY_MAX_TOKENS,
        );
        ctx.completer
            .complete(request)
            .await
            .context("Failed to summarise the review")
    }

    /// Writes the finished draft in one critical section.
    async fn commit(&mut self, ctx: &BotContext, review: Option<String>) -> Result<Advance> {
        let draft = std::mem::take(&mut self.draft);
        let reviewed = review.is_some();
        let mut state = ctx.state.lock().await;

        // Work on copies so a failed write leaves the in-memory documents unchanged.
        let mut cuisines = state.cuisines.clone();
        let mut grew = false;
        let mut cuisine = draft.cuisine;
        if draft.typed_cuisine {
            let (key, added) = cuisines.add(&cuisine, ctx.config.storage.duplicate_cuisines);
            if let Some(filed) = cuisines.get(key) {
                cuisine = filed.to_string();
            }
            debug!("Cuisine '{}' filed under key {}", cuisine, key);
            grew = added;
        }

        let mut recommendations = state.recommendations.clone();
        let id = recommendations
            .push(NewRecommendation {
                url: draft.url,
                name: draft.name,
                cuisine,
                rating: draft.rating,
                review,
                user: self.author.name.clone(),
                image: draft.image,
            })
            .id;

        let mut ranks = state.ranks.clone();
        let mut earned = POINTS_PER_RECOMMENDATION;
        if reviewed {
            earned += POINTS_PER_REVIEW;
        }
        let total = ranks.add_points(&self.author.id, earned);

        persist(ctx, &state, grew.then_some(&cuisines), &recommendations, &ranks)?;

        state.cuisines = cuisines;
        state.recommendations = recommendations;
        state.ranks = ranks;
        let title = state.ranks.title_of(&self.author.id);
        drop(state);

        info!(
            "{} added recommendation {} (+{} points, {} total)",
            self.author.name, id, earned, total
        );
        Ok(Advance::Finished(vec![format!(
            "Thanks {} {}! Your recommendation has been saved. ✅",
            title, self.author.name
        )]))
    }
}

/// Writes the documents a commit changed, in order: cuisines (when given),
/// records, ranks. When a later write fails, the files already written are
/// put back to `previous`, so the disk never holds a record that memory does not.
fn persist(
    ctx: &BotContext,
    previous: &BotState,
    cuisines: Option<&CuisineTaxonomy>,
    recommendations: &Recommendations,
    ranks: &RankTable,
) -> Result<()> {
    if let Some(cuisines) = cuisines {
        ctx.store.save_cuisines(cuisines)?;
    }
    if let Err(e) = ctx.store.save_recommendations(recommendations) {
        if cuisines.is_some() {
            restore("cuisines", ctx.store.save_cuisines(&previous.cuisines));
        }
        return Err(e);
    }
    if let Err(e) = ctx.store.save_ranks(ranks) {
        restore("recommendations", ctx.store.save_recommendations(&previous.recommendations));
        if cuisines.is_some() {
            restore("cuisines", ctx.store.save_cuisines(&previous.cuisines));
        }
        return Err(e);
    }
    Ok(())
}

fn restore(document: &str, result: Result<()>) {
    if let Err(e) = result {
        warn!("Could not restore {} after a failed save: {:#}", document, e);
    }
}

fn is_yes(reply: &str) -> bool {
    reply.trim().eq_ignore_ascii_case("yes")
}

#[async_trait]
impl Session for RecommendSession {
    fn command(&self) -> &'static str {
        "recommend"
    }

    fn failure_prefix(&self) -> &'static str {
        "Something went wrong"
    }

    fn timeout(&self, timeouts: &TimeoutConfig) -> Duration {
        match self.step {
            Step::Url => timeouts.url(),
            Step::Image => timeouts.image(),
            Step::Interview(_) => timeouts.interview(),
            _ => timeouts.reply(),
        }
    }

    async fn advance(&mut self, ctx: &BotContext, msg: &Incoming) -> Result<Advance> {
        let reply = msg.content.trim();
        match self.step {
            Step::Url => {
                if reply.is_empty() {
                    return Err(anyhow!(MakanError::InvalidInput(
                        "expected a restaurant URL".to_string()
                    )));
                }
                let title = ctx.fetcher.fetch_title(reply).await?;
                self.draft.url = reply.to_string();
                self.step = Step::ConfirmName;
                let prompt = format!(
                    "Step 2️⃣: I found this name from the URL: **{}**. Is this correct? (yes/no)",
                    title
                );
                self.draft.suggested_name = title;
                Ok(Advance::Continue(vec![prompt]))
            }
            Step::ConfirmName => {
                if is_yes(reply) {
                    self.draft.name = std::mem::take(&mut self.draft.suggested_name);
                    Ok(self.ask_cuisine(ctx).await)
                } else {
                    self.step = Step::Name;
                    Ok(Advance::Continue(vec![
                        "Please provide the correct name:".to_string(),
                    ]))
                }
            }
            Step::Name => {
                if reply.is_empty() {
                    return Err(anyhow!(MakanError::InvalidInput(
                        "restaurant name cannot be empty".to_string()
                    )));
                }
                self.draft.name = reply.to_string();
                Ok(self.ask_cuisine(ctx).await)
            }
            Step::Cuisine => {
                let choice = ctx.state.lock().await.cuisines.select(reply);
                match choice {
                    CuisineChoice::Known(name) => {
                        self.draft.cuisine = name;
                        Ok(self.ask_rating())
                    }
                    CuisineChoice::NeedsName => {
                        self.step = Step::TypedCuisine;
                        Ok(Advance::Continue(vec![
                            "Please enter the cuisine type:".to_string(),
                        ]))
                    }
                }
            }
            Step::TypedCuisine => {
                if reply.is_empty() {
                    return Err(anyhow!(MakanError::InvalidInput(
                        "cuisine cannot be empty".to_string()
                    )));
                }
                self.draft.cuisine = reply.to_string();
                self.draft.typed_cuisine = true;
                Ok(self.ask_rating())
            }
            Step::Rating => {
                self.draft.rating = parse_rating(reply)?;
                self.step = Step::Image;
                Ok(Advance::Continue(vec![
                    "Step 5️⃣: Upload one picture from the restaurant.".to_string(),
                ]))
            }
            Step::Image => {
                self.save_picture(ctx, msg).await?;
                if self.draft.rating > 0.0 {
                    self.step = Step::ReviewConsent;
                    Ok(Advance::Continue(vec![
                        "Step 6️⃣: Would you like to answer a short review now? (yes/no)"
                            .to_string(),
                    ]))
                } else {
                    self.commit(ctx, None).await
                }
            }
            Step::ReviewConsent => {
                if is_yes(reply) {
                    self.step = Step::Interview(0);
                    Ok(Advance::Continue(vec![REVIEW_QUESTIONS[0].to_string()]))
                } else {
                    self.commit(ctx, None).await
                }
            }
            Step::Interview(n) => {
                self.draft.answers.push(reply.to_string());
                let next = n + 1;
                if next < REVIEW_QUESTIONS.len() {
                    self.step = Step::Interview(next);
                    Ok(Advance::Continue(vec![REVIEW_QUESTIONS[next].to_string()]))
                } else {
                    let summary = self.summarise_interview(ctx).await?;
                    self.commit(ctx, Some(summary)).await
                }
            }
        }
    }
}
