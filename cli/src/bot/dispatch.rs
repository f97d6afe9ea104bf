//! # Command Dispatch
//!
//! File: cli/src/bot/dispatch.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Parses prefixed messages into `Command`s and runs them. One-shot commands
//! reply immediately; `recommend` and `edit` also return a session that
//! receives the author's following messages.
//!
//! Messages without the prefix and unknown command names are ignored.
//!
use super::edit::EditSession;
use super::recommend::RecommendSession;
use super::session::Session;
use super::{ask, views, web, Bot, Incoming};
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Rank,
    Recommend,
    /// Free-form question; may be empty.
    Ask(String),
    ViewAll,
    /// Cuisine filter; may be empty.
    View(String),
    ViewWeb,
    Edit,
}

/// What running a command produced.
pub struct CommandOutcome {
    pub replies: Vec<String>,
    pub session: Option<Box<dyn Session>>,
}

impl CommandOutcome {
    fn reply(text: String) -> Self {
        Self {
            replies: vec![text],
            session: None,
        }
    }

    fn start(text: String, session: Box<dyn Session>) -> Self {
        Self {
            replies: vec![text],
            session: Some(session),
        }
    }
}

/// Returns the command in `content`, or `None` when it is not one.
pub fn parse(content: &str, prefix: &str) -> Option<Command> {
    let body = content.trim_start().strip_prefix(prefix)?;
    let (name, rest) = match body.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (body.trim_end(), ""),
    };
    let command = match name {
        "help" => Command::Help,
        "rank" => Command::Rank,
        "recommend" => Command::Recommend,
        "ask" => Command::Ask(rest.to_string()),
        "viewall" => Command::ViewAll,
        "view" => Command::View(rest.to_string()),
        "viewweb" => Command::ViewWeb,
        "edit" => Command::Edit,
        other => {
            debug!("Ignoring unknown command '{}{}'", prefix, other);
            return None;
        }
    };
    Some(command)
}

/// Executes `command` on behalf of `msg.author`.
pub async fn run(bot: &Bot, command: Command, msg: &Incoming) -> CommandOutcome {
    let ctx = bot.context();
    let prefix = ctx.prefix();
    info!("{} ran {:?} in #{}", msg.author.name, command, msg.channel);

    match command {
        Command::Help => CommandOutcome::reply(views::help_text(prefix)),
        Command::Rank => {
            let (points, board) = {
                let state = ctx.state.lock().await;
                let board: Vec<(String, u32)> = state
                    .ranks
                    .leaderboard()
                    .into_iter()
                    .map(|(id, pts)| (id.to_string(), pts))
                    .collect();
                (state.ranks.points_of(&msg.author.id), board)
            };
            let mut named = Vec::with_capacity(board.len());
            for (id, pts) in board {
                named.push((bot.display_name(&id).await, pts));
            }
            CommandOutcome::reply(views::rank_text(&msg.author.name, points, &named))
        }
        Command::Recommend => {
            let (prompt, session) = RecommendSession::start(ctx, &msg.author).await;
            CommandOutcome::start(prompt, Box::new(session))
        }
        Command::Ask(question) => {
            if question.is_empty() {
                return CommandOutcome::reply(format!("Usage: {}ask <question>", prefix));
            }
            CommandOutcome::reply(ask::answer(ctx, &msg.author, &question).await)
        }
        Command::ViewAll => {
            let state = ctx.state.lock().await;
            CommandOutcome::reply(views::view_all(&state.recommendations))
        }
        Command::View(cuisine) => {
            if cuisine.is_empty() {
                return CommandOutcome::reply(format!("Usage: {}view <cuisine>", prefix));
            }
            let state = ctx.state.lock().await;
            CommandOutcome::reply(views::view_cuisine(&state.recommendations, &cuisine))
        }
        Command::ViewWeb => CommandOutcome::reply(web::handle_viewweb(ctx).await),
        Command::Edit => {
            let (prompt, session) = EditSession::start();
            CommandOutcome::start(prompt, Box::new(session))
        }
    }
}
