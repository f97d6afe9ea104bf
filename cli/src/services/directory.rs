//! # User Directory
//!
//! File: cli/src/services/directory.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Resolves user ids to display names for the leaderboard. The chat
//! platform only tells the bot who is speaking right now, so every author
//! is remembered as they speak. `JsonUserDirectory` keeps the map in
//! `users.json` next to the other documents, which lets `rank` show names
//! for users who have not spoken since the last restart.
//!
use crate::common::fs::io;
use crate::core::error::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tokio::sync::Mutex;
use tracing::debug;

#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Display name recorded for `user_id`, if any.
    async fn display_name(&self, user_id: &str) -> Option<String>;

    /// Records the current display name of `user_id`.
    async fn remember(&self, user_id: &str, name: &str) -> Result<()>;
}

/// `UserDirectory` persisted as a JSON object of id → name.
#[derive(Debug)]
pub struct JsonUserDirectory {
    path: PathBuf,
    names: Mutex<BTreeMap<String, String>>,
}

impl JsonUserDirectory {
    /// Loads the directory at `path`, creating an empty one if missing.
    pub fn load(path: PathBuf) -> Result<Self> {
        let names: BTreeMap<String, String> = io::load_json_or_init(&path, BTreeMap::new)?;
        debug!("Loaded {} display name(s) from {}", names.len(), path.display());
        Ok(Self {
            path,
            names: Mutex::new(names),
        })
    }
}

#[async_trait]
impl UserDirectory for JsonUserDirectory {
    async fn display_name(&self, user_id: &str) -> Option<String> {
        self.names.lock().await.get(user_id).cloned()
    }

    async fn remember(&self, user_id: &str, name: &str) -> Result<()> {
        let mut names = self.names.lock().await;
        if names.get(user_id).map(String::as_str) == Some(name) {
            return Ok(());
        }
        let mut updated = names.clone();
        updated.insert(user_id.to_string(), name.to_string());
        io::save_json_pretty(&self.path, &updated)?;
        *names = updated;
        Ok(())
    }
}
