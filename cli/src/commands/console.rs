//! # Console Transport
//!
//! File: cli/src/commands/console.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! `makan console` runs the bot in a terminal. Every line typed is one chat
//! message from the configured console user in the configured channel.
//!
//! - `/attach <path> [text]` sends `text` with a local file attached (used for
//!   the picture step of `!recommend`).
//! - `/quit` (or end of input) exits.
//!
//! A one-second ticker expires stalled sessions so that timeout notices are
//! printed even while nobody types.
//!
//! ```bash
//! makan console
//! makan console --user-name aisyah --channel makan-kaki
//! ```
//!
use super::build_bot;
use crate::bot::{Author, Incoming, Outgoing};
use crate::core::config::Config;
use crate::core::error::Result;
use crate::services::fetch::Attachment;
use anyhow::Context;
use chrono::Local;
use clap::Args;
use std::path::Path;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::time::Instant;
use tracing::info;

#[derive(Args, Debug)]
pub struct ConsoleArgs {
    /// Display name to chat as (defaults to `console.user_name`)
    #[arg(long)]
    pub user_name: Option<String>,
    /// User id to chat as (defaults to `console.user_id`)
    #[arg(long)]
    pub user_id: Option<String>,
    /// Channel name (defaults to `console.channel`)
    #[arg(long)]
    pub channel: Option<String>,
}

pub async fn handle_console(args: ConsoleArgs, config: Config) -> Result<()> {
    let author = Author {
        id: args.user_id.unwrap_or_else(|| config.console.user_id.clone()),
        name: args
            .user_name
            .unwrap_or_else(|| config.console.user_name.clone()),
    };
    let channel = args
        .channel
        .unwrap_or_else(|| config.console.channel.clone());
    let persona = config.bot.persona.clone();
    let prefix = config.bot.prefix.clone();

    let bot = build_bot(config)?;
    info!("Console session for {} in #{}", author.name, channel);

    println!(
        "Chatting with {} as {} in #{}. Try {}help, /attach <path> or /quit.",
        persona, author.name, channel, prefix
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    prompt_marker().await;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read from stdin")? else {
                    break;
                };
                let Some((content, attachments)) = parse_console_line(&line) else {
                    println!("{}: Goodbye!", persona);
                    break;
                };
                let msg = Incoming {
                    author: author.clone(),
                    channel: channel.clone(),
                    content,
                    attachments,
                };
                print_replies(&persona, &bot.handle(msg).await);
                prompt_marker().await;
            }
            _ = ticker.tick() => {
                let notices = bot.expire_sessions(Instant::now()).await;
                if !notices.is_empty() {
                    println!();
                    print_replies(&persona, &notices);
                    prompt_marker().await;
                }
            }
        }
    }
    Ok(())
}

/// Splits a typed line into message text and attachments.
///
/// Returns `None` for `/quit`.
pub fn parse_console_line(line: &str) -> Option<(String, Vec<Attachment>)> {
    let trimmed = line.trim();
    if trimmed.eq_ignore_ascii_case("/quit") {
        return None;
    }
    let Some(rest) = trimmed.strip_prefix("/attach ") else {
        return Some((trimmed.to_string(), Vec::new()));
    };
    let rest = rest.trim_start();
    let (path, text) = match rest.split_once(char::is_whitespace) {
        Some((path, text)) => (path, text.trim()),
        None => (rest, ""),
    };
    let filename = Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string());
    let attachment = Attachment {
        filename,
        url: path.to_string(),
    };
    Some((text.to_string(), vec![attachment]))
}

fn print_replies(persona: &str, replies: &[Outgoing]) {
    let stamp = Local::now().format("%H:%M");
    for reply in replies {
        println!("[{}] {}: {}", stamp, persona, reply.content);
    }
}

async fn prompt_marker() {
    let mut stdout = tokio::io::stdout();
    // A failed flush only delays the marker.
    let _ = stdout.write_all(b"> ").await;
    let _ = stdout.flush().await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_lines_pass_through() {
        let (content, attachments) = parse_console_line("  !viewall \n").unwrap();
        assert_eq!(content, "!viewall");
        assert!(attachments.is_empty());
    }

    #[test]
    fn attach_with_and_without_text() {
        let (content, attachments) = parse_console_line("/attach /tmp/food/laksa.jpg").unwrap();
        assert_eq!(content, "");
        assert_eq!(
            attachments,
            vec![Attachment {
                filename: "laksa.jpg".into(),
                url: "/tmp/food/laksa.jpg".into()
            }]
        );

        let (content, attachments) = parse_console_line("/attach pic.png look at this").unwrap();
        assert_eq!(content, "look at this");
        assert_eq!(attachments[0].filename, "pic.png");
    }

    #[test]
    fn quit_ends_the_session() {
        assert!(parse_console_line("/quit").is_none());
        assert!(parse_console_line("/QUIT").is_none());
    }
}
