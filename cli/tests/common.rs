//! # Makan Integration Test Common Helpers
//!
//! File: cli/tests/common.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Shared helpers for the integration tests: the compiled `makan` binary,
//! a scratch data directory with a config file, and offline stand-ins for
//! the completion and fetch services so conversations can be driven
//! end-to-end without network access.
//!

// Different test files use different helpers.
#![allow(dead_code)]

pub use assert_cmd::Command;

use async_trait::async_trait;
use makan::bot::{Author, Bot, BotContext, Incoming, Outgoing};
use makan::core::config::Config;
use makan::core::error::Result;
use makan::services::completion::{Completer, CompletionRequest};
use makan::services::fetch::{Attachment, PageFetcher};
use std::collections::VecDeque;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

pub fn makan_cmd() -> Command {
    Command::cargo_bin("makan").expect("Failed to find makan binary for testing")
}

/// Writes a `makan.toml` pointing all storage into `dir` and returns its path.
pub fn write_config(dir: &Path, extra: &str) -> std::path::PathBuf {
    let path = dir.join("makan.toml");
    let body = format!(
        "[storage]\ndata_dir = \"{}\"\n{}",
        dir.display().to_string().replace('\\', "/"),
        extra
    );
    std::fs::write(&path, body).expect("write config");
    path
}

/// Completer that pops scripted answers and records every request.
#[derive(Default)]
pub struct ScriptedCompleter {
    answers: Mutex<VecDeque<String>>,
    pub requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedCompleter {
    pub fn with_answers(answers: &[&str]) -> Self {
        Self {
            answers: Mutex::new(answers.iter().map(|a| a.to_string()).collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Completer for ScriptedCompleter {
    async fn complete(&self, request: CompletionRequest) -> Result<String> {
        self.requests.lock().unwrap().push(request);
        Ok(self
            .answers
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| "A fine meal.".to_string()))
    }
}

/// Fetcher that answers every URL with one title and writes fixed bytes
/// for attachments.
pub struct StaticFetcher {
    pub title: String,
}

#[async_trait]
impl PageFetcher for StaticFetcher {
    async fn fetch_title(&self, url: &str) -> Result<String> {
        if url.starts_with("http") {
            Ok(self.title.clone())
        } else {
            anyhow::bail!("Could not fetch '{}': relative URL without a base", url)
        }
    }

    async fn save_attachment(&self, _attachment: &Attachment, dest: &Path) -> Result<()> {
        std::fs::write(dest, b"\xFF\xD8\xFFjpeg")?;
        Ok(())
    }
}

/// A bot over a fresh temp directory, plus handles to inspect it.
pub struct Harness {
    pub dir: TempDir,
    pub config: Config,
    pub bot: Bot,
    pub completer: Arc<ScriptedCompleter>,
}

impl Harness {
    pub fn new(answers: &[&str]) -> Self {
        Self::with_config(answers, |_| {})
    }

    pub fn with_config(answers: &[&str], tweak: impl FnOnce(&mut Config)) -> Self {
        let dir = TempDir::new().expect("temp dir");
        let mut config = Config::default();
        config.storage.data_dir = dir.path().to_string_lossy().into_owned();
        tweak(&mut config);

        let completer = Arc::new(ScriptedCompleter::with_answers(answers));
        let ctx = Self::context(&config, &completer);
        Self {
            dir,
            config,
            bot: Bot::new(Arc::new(ctx)),
            completer,
        }
    }

    /// Replaces the bot with a fresh one loaded from the same data directory,
    /// as after a process restart.
    pub fn restart(&mut self) {
        let ctx = Self::context(&self.config, &self.completer);
        self.bot = Bot::new(Arc::new(ctx));
    }

    fn context(config: &Config, completer: &Arc<ScriptedCompleter>) -> BotContext {
        let fetcher = Arc::new(StaticFetcher {
            title: "Hawker Chan".to_string(),
        });
        BotContext::load(config.clone(), completer.clone(), fetcher).expect("bot context")
    }

    /// Sends `content` as `user` in channel `food` and returns the reply texts.
    pub async fn say(&self, user: &str, content: &str) -> Vec<String> {
        self.say_in(user, "food", content, Vec::new()).await
    }

    pub async fn say_in(
        &self,
        user: &str,
        channel: &str,
        content: &str,
        attachments: Vec<Attachment>,
    ) -> Vec<String> {
        let msg = Incoming {
            author: Author {
                id: format!("id-{}", user),
                name: user.to_string(),
            },
            channel: channel.to_string(),
            content: content.to_string(),
            attachments,
        };
        self.bot
            .handle(msg)
            .await
            .into_iter()
            .map(|Outgoing { content, .. }| content)
            .collect()
    }

    /// Parsed contents of a JSON document in the data directory.
    pub fn document(&self, name: &str) -> serde_json::Value {
        let text = std::fs::read_to_string(self.dir.path().join(name)).expect("read document");
        serde_json::from_str(&text).expect("parse document")
    }
}
