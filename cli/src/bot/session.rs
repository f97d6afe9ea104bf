//! # Conversation Sessions
//!
//! File: cli/src/bot/session.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Multi-step commands (`recommend`, `edit`) are explicit state machines
//! rather than tasks blocked on "wait for the next message". A session is
//! stored between messages, keyed by author and channel, together with a
//! deadline. Each reply from that author in that channel advances it by one
//! step; the deadline is then reset using the timeout of the new step.
//!
//! A session ends when it returns `Advance::Finished`, when `advance` returns
//! an error (the sequence is aborted and the error shown), or when its
//! deadline passes. In every case its in-progress state is simply dropped.
//!
use super::{BotContext, Incoming};
use crate::core::config::TimeoutConfig;
use crate::core::error::Result;
use async_trait::async_trait;
use std::time::Duration;
use tokio::time::Instant;

/// Outcome of feeding one message to a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance {
    /// Send these replies and wait for the next message.
    Continue(Vec<String>),
    /// Send these replies; the session is over.
    Finished(Vec<String>),
}

#[async_trait]
pub trait Session: Send {
    /// Command that started the session, without prefix.
    fn command(&self) -> &'static str;

    /// Prefix for the error message shown when the session aborts.
    fn failure_prefix(&self) -> &'static str;

    /// How long to wait for the reply to the current step.
    fn timeout(&self, timeouts: &TimeoutConfig) -> Duration;

    /// Consumes one message from the session's author.
    async fn advance(&mut self, ctx: &BotContext, msg: &Incoming) -> Result<Advance>;
}

/// Sessions are private to one author in one channel.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionKey {
    pub user_id: String,
    pub channel: String,
}

impl SessionKey {
    pub fn of(msg: &Incoming) -> Self {
        Self {
            user_id: msg.author.id.clone(),
            channel: msg.channel.clone(),
        }
    }
}

/// A stored session and the instant it expires.
pub struct ActiveSession {
    pub session: Box<dyn Session>,
    pub deadline: Instant,
}

impl ActiveSession {
    pub fn new(session: Box<dyn Session>, timeouts: &TimeoutConfig) -> Self {
        let deadline = Instant::now() + session.timeout(timeouts);
        Self { session, deadline }
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.deadline
    }

    /// Notice sent to the channel when the session times out.
    pub fn timeout_notice(&self, prefix: &str) -> String {
        format!(
            "⏰ Timed out waiting for your reply. Start again with {}{}.",
            prefix,
            self.session.command()
        )
    }
}
