//! # Makan Bot Core
//!
//! File: cli/src/bot/mod.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! The chat bot, independent of the platform carrying its messages. A
//! transport (the console REPL or the HTTP endpoint) turns whatever it
//! receives into an `Incoming`, awaits `Bot::handle`, and delivers the
//! returned `Outgoing` replies.
//!
//! ## State
//!
//! - `BotContext` is shared by everything: configuration, the document
//!   store, the completion, fetch and user-directory services, and
//!   `BotState` (records, cuisine taxonomy, rank table, `ask` history)
//!   behind one async mutex.
//!   Every read-modify-persist of a document happens while holding it, so
//!   concurrent sessions cannot assign the same id or lose a point update.
//! - `Bot` owns the active sessions, keyed by (author, channel). Every
//!   author it hears from is recorded in the user directory, which names
//!   the leaderboard.
//!
//! The state lock is never held across a call to the completion service or
//! a network fetch.
//!
pub mod ask;
pub mod dispatch;
pub mod edit;
pub mod history;
pub mod prompts;
pub mod recommend;
pub mod session;
pub mod views;
pub mod web;

use crate::core::config::Config;
use crate::core::error::Result;
use crate::services::completion::Completer;
use crate::services::directory::{JsonUserDirectory, UserDirectory};
use crate::services::fetch::{Attachment, PageFetcher};
use crate::store::cuisines::CuisineTaxonomy;
use crate::store::ranks::RankTable;
use crate::store::records::Recommendations;
use crate::store::Store;
use history::HistoryWindow;
use serde::{Deserialize, Serialize};
use session::{ActiveSession, Advance, SessionKey};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Who sent a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    /// Stable platform id; ranks and sessions are keyed by it.
    pub id: String,
    /// Display name, stored on records and shown in replies.
    pub name: String,
}

/// A message delivered to the bot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Incoming {
    pub author: Author,
    pub channel: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

/// A reply to post in a channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outgoing {
    pub channel: String,
    pub content: String,
}

/// The mutable documents plus the `ask` window.
#[derive(Debug)]
pub struct BotState {
    pub recommendations: Recommendations,
    pub cuisines: CuisineTaxonomy,
    pub ranks: RankTable,
    pub history: HistoryWindow,
}

/// Shared services and state handed to command handlers and sessions.
pub struct BotContext {
    pub config: Config,
    pub store: Store,
    pub state: Mutex<BotState>,
    pub completer: Arc<dyn Completer>,
    pub fetcher: Arc<dyn PageFetcher>,
    pub directory: Arc<dyn UserDirectory>,
}

impl BotContext {
    /// Loads (or initializes) the documents named by `config`, including the
    /// user directory.
    pub fn load(
        config: Config,
        completer: Arc<dyn Completer>,
        fetcher: Arc<dyn PageFetcher>,
    ) -> Result<Self> {
        let store = Store::from_config(&config.storage);
        let docs = store.load_all()?;
        let directory = JsonUserDirectory::load(config.storage.users_path())?;
        debug!("{} user(s) have points", docs.ranks.leaderboard().len());
        let state = BotState {
            recommendations: docs.recommendations,
            cuisines: docs.cuisines,
            ranks: docs.ranks,
            history: HistoryWindow::new(config.bot.history_size),
        };
        Ok(Self {
            config,
            store,
            state: Mutex::new(state),
            completer,
            fetcher,
            directory: Arc::new(directory),
        })
    }

    /// Replaces the user directory.
    pub fn with_directory(mut self, directory: Arc<dyn UserDirectory>) -> Self {
        self.directory = directory;
        self
    }

    /// Current rank title of a user.
    pub async fn title_of(&self, user_id: &str) -> &'static str {
        self.state.lock().await.ranks.title_of(user_id)
    }

    pub fn prefix(&self) -> &str {
        &self.config.bot.prefix
    }
}

/// Message router: sessions first, then commands.
pub struct Bot {
    ctx: Arc<BotContext>,
    sessions: Mutex<HashMap<SessionKey, ActiveSession>>,
}

impl Bot {
    pub fn new(ctx: Arc<BotContext>) -> Self {
        Self {
            ctx,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    pub fn context(&self) -> &Arc<BotContext> {
        &self.ctx
    }

    /// Display name recorded for `user_id`, or the id itself.
    pub async fn display_name(&self, user_id: &str) -> String {
        self.ctx
            .directory
            .display_name(user_id)
            .await
            .unwrap_or_else(|| user_id.to_string())
    }

    /// Number of sessions currently waiting for a reply.
    pub async fn active_sessions(&self) -> usize {
        self.sessions.lock().await.len()
    }

    /// Processes one message and returns the replies to post.
    pub async fn handle(&self, msg: Incoming) -> Vec<Outgoing> {
        let author = &msg.author;
        if let Err(e) = self.ctx.directory.remember(&author.id, &author.name).await {
            warn!("Could not record the name of {}: {:#}", author.id, e);
        }

        let key = SessionKey::of(&msg);
        let mut out = Vec::new();

        // The session is taken out of the map while it runs, so the map lock
        // is not held across completion or fetch calls.
        let pending = self.sessions.lock().await.remove(&key);
        if let Some(mut active) = pending {
            if active.is_expired(Instant::now()) {
                info!(
                    "Session '{}' for {} in #{} expired",
                    active.session.command(),
                    key.user_id,
                    key.channel
                );
                out.push(self.reply(&msg, active.timeout_notice(self.ctx.prefix())));
            } else {
                match active.session.advance(&self.ctx, &msg).await {
                    Ok(Advance::Continue(replies)) => {
                        out.extend(replies.into_iter().map(|r| self.reply(&msg, r)));
                        let resumed = ActiveSession::new(active.session, &self.ctx.config.timeouts);
                        self.sessions.lock().await.insert(key, resumed);
                    }
                    Ok(Advance::Finished(replies)) => {
                        debug!("Session '{}' finished", active.session.command());
                        out.extend(replies.into_iter().map(|r| self.reply(&msg, r)));
                    }
                    Err(e) => {
                        warn!("Session '{}' aborted: {:#}", active.session.command(), e);
                        let text = format!("{}: {:#}", active.session.failure_prefix(), e);
                        out.push(self.reply(&msg, text));
                    }
                }
                return out;
            }
        }

        let Some(command) = dispatch::parse(&msg.content, self.ctx.prefix()) else {
            return out;
        };
        let outcome = dispatch::run(self, command, &msg).await;
        out.extend(outcome.replies.into_iter().map(|r| self.reply(&msg, r)));
        if let Some(session) = outcome.session {
            let active = ActiveSession::new(session, &self.ctx.config.timeouts);
            self.sessions.lock().await.insert(key, active);
        }
        out
    }

    /// Drops every session whose deadline is at or before `now` and returns
    /// the timeout notices for their channels.
    pub async fn expire_sessions(&self, now: Instant) -> Vec<Outgoing> {
        let mut sessions = self.sessions.lock().await;
        let expired: Vec<SessionKey> = sessions
            .iter()
            .filter(|(_, active)| active.is_expired(now))
            .map(|(key, _)| key.clone())
            .collect();

        let mut notices = Vec::with_capacity(expired.len());
        for key in expired {
            if let Some(active) = sessions.remove(&key) {
                info!(
                    "Session '{}' for {} in #{} timed out",
                    active.session.command(),
                    key.user_id,
                    key.channel
                );
                notices.push(Outgoing {
                    content: active.timeout_notice(self.ctx.prefix()),
                    channel: key.channel,
                });
            }
        }
        notices
    }

    fn reply(&self, msg: &Incoming, content: String) -> Outgoing {
        Outgoing {
            channel: msg.channel.clone(),
            content,
        }
    }
}
