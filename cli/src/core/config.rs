//! # Makan Configuration System
//!
//! File: cli/src/core/config.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! This module implements the configuration system for Makan, handling loading,
//! validation, and access to configuration data. Every setting has a built-in
//! default, so the bot runs without any configuration file at all.
//!
//! ## Architecture
//!
//! Configuration sources (first one found wins):
//! 1. An explicit `--config <path>` given on the command line
//! 2. Project-specific `makan.toml` in the current directory or an ancestor
//!    (the search stops at a directory containing `.git`)
//! 3. User-specific `<config dir>/makan/config.toml`
//! 4. Default values defined in the code
//!
//! After loading, `~` is expanded in every path setting and the result is
//! validated before use.
//!
//! ## Examples
//!
//! ```toml
//! [bot]
//! prefix = "!"
//! history_size = 20
//!
//! [storage]
//! data_dir = "~/makan-data"
//! duplicate_cuisines = "reuse"
//!
//! [timeouts]
//! reply_secs = 30
//! ```
//!
//! ```ignore
//! let cfg = config::load_config(None)?;
//! let records = cfg.storage.recommendations_path();
//! ```
//!
use crate::core::error::{MakanError, Result};
use crate::store::cuisines::CuisinePolicy;
use anyhow::{anyhow, Context};
use directories::ProjectDirs;
use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, info, warn};

/// Name of the project-level configuration file.
pub const PROJECT_CONFIG_FILENAME: &str = "makan.toml";

/// Represents the main configuration structure, loaded from TOML files.
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub bot: BotConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub timeouts: TimeoutConfig,
    #[serde(default)]
    pub console: ConsoleConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// Chat behaviour settings.
#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct BotConfig {
    /// Prefix that marks a message as a command (e.g. `!` in `!help`).
    #[serde(default = "default_prefix")]
    pub prefix: String,
    /// Persona name used in replies and prompts.
    #[serde(default = "default_persona")]
    pub persona: String,
    /// Maximum number of question/answer turns kept for `ask`.
    #[serde(default = "default_history_size")]
    pub history_size: usize,
    /// How many of the newest recommendations are given to `ask` as context.
    #[serde(default = "default_context_records")]
    pub context_records: usize,
}

/// Where the JSON documents and the images live.
#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Base directory; relative file and directory settings resolve against it.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_recommendations_file")]
    pub recommendations_file: String,
    #[serde(default = "default_cuisines_file")]
    pub cuisines_file: String,
    #[serde(default = "default_ranks_file")]
    pub ranks_file: String,
    /// Display names by user id, for the leaderboard.
    #[serde(default = "default_users_file")]
    pub users_file: String,
    /// Directory receiving uploaded images.
    #[serde(default = "default_image_dir")]
    pub image_dir: String,
    /// Placeholder image name used when a recommendation has no picture.
    #[serde(default = "default_image")]
    pub default_image: String,
    /// What happens when a user types a cuisine that is already in the taxonomy.
    #[serde(default)]
    pub duplicate_cuisines: CuisinePolicy,
}

/// Text-completion backend settings.
#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct LlmConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// Name of the environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

/// Static web page output.
#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct SiteConfig {
    #[serde(default = "default_site_dir")]
    pub directory: String,
    #[serde(default = "default_index_file")]
    pub index_file: String,
    /// Public address announced after the page is regenerated.
    #[serde(default)]
    pub public_url: Option<String>,
    /// Commit and push the site directory after every regeneration.
    #[serde(default)]
    pub push_to_git: bool,
}

/// Per-step wait limits for multi-step conversations, in seconds.
#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct TimeoutConfig {
    #[serde(default = "default_url_secs")]
    pub url_secs: u64,
    #[serde(default = "default_reply_secs")]
    pub reply_secs: u64,
    #[serde(default = "default_image_secs")]
    pub image_secs: u64,
    #[serde(default = "default_interview_secs")]
    pub interview_secs: u64,
    #[serde(default = "default_long_reply_secs")]
    pub long_reply_secs: u64,
}

/// Identity of the local operator in `makan console`.
#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct ConsoleConfig {
    #[serde(default = "default_console_user_id")]
    pub user_id: String,
    #[serde(default = "default_console_user_name")]
    pub user_name: String,
    #[serde(default = "default_console_channel")]
    pub channel: String,
}

/// Bind address for `makan serve`.
#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_prefix() -> String {
    "!".to_string()
}
fn default_persona() -> String {
    "Mr. Makan".to_string()
}
fn default_history_size() -> usize {
    20
}
fn default_context_records() -> usize {
    5
}
fn default_data_dir() -> String {
    ".".to_string()
}
fn default_recommendations_file() -> String {
    "recommend.json".to_string()
}
fn default_cuisines_file() -> String {
    "cuisines.json".to_string()
}
fn default_ranks_file() -> String {
    "ranks.json".to_string()
}
fn default_users_file() -> String {
    "users.json".to_string()
}
fn default_image_dir() -> String {
    "static/images".to_string()
}
fn default_image() -> String {
    "default.png".to_string()
}
fn default_provider() -> String {
    "openai".to_string()
}
fn default_model() -> String {
    "gpt-4o-mini".to_string()
}
fn default_api_key_env() -> String {
    "OPENAI_KEY".to_string()
}
fn default_site_dir() -> String {
    "static".to_string()
}
fn default_index_file() -> String {
    "index.html".to_string()
}
fn default_url_secs() -> u64 {
    120
}
fn default_reply_secs() -> u64 {
    60
}
fn default_image_secs() -> u64 {
    120
}
fn default_interview_secs() -> u64 {
    90
}
fn default_long_reply_secs() -> u64 {
    120
}
fn default_console_user_id() -> String {
    "local".to_string()
}
fn default_console_user_name() -> String {
    std::env::var("USER").unwrap_or_else(|_| "foodie".to_string())
}
fn default_console_channel() -> String {
    "console".to_string()
}
fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::LOCALHOST)
}
fn default_port() -> u16 {
    8080
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            persona: default_persona(),
            history_size: default_history_size(),
            context_records: default_context_records(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            recommendations_file: default_recommendations_file(),
            cuisines_file: default_cuisines_file(),
            ranks_file: default_ranks_file(),
            users_file: default_users_file(),
            image_dir: default_image_dir(),
            default_image: default_image(),
            duplicate_cuisines: CuisinePolicy::default(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            api_key_env: default_api_key_env(),
        }
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            directory: default_site_dir(),
            index_file: default_index_file(),
            public_url: None,
            push_to_git: false,
        }
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            url_secs: default_url_secs(),
            reply_secs: default_reply_secs(),
            image_secs: default_image_secs(),
            interview_secs: default_interview_secs(),
            long_reply_secs: default_long_reply_secs(),
        }
    }
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            user_id: default_console_user_id(),
            user_name: default_console_user_name(),
            channel: default_console_channel(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl StorageConfig {
    fn resolve(&self, path: &str) -> PathBuf {
        // `join` keeps absolute paths as they are.
        PathBuf::from(&self.data_dir).join(path)
    }

    pub fn recommendations_path(&self) -> PathBuf {
        self.resolve(&self.recommendations_file)
    }

    pub fn cuisines_path(&self) -> PathBuf {
        self.resolve(&self.cuisines_file)
    }

    pub fn ranks_path(&self) -> PathBuf {
        self.resolve(&self.ranks_file)
    }

    pub fn users_path(&self) -> PathBuf {
        self.resolve(&self.users_file)
    }

    pub fn image_dir_path(&self) -> PathBuf {
        self.resolve(&self.image_dir)
    }
}

impl SiteConfig {
    /// Site directory, resolved against the storage data directory.
    pub fn directory_path(&self, storage: &StorageConfig) -> PathBuf {
        storage.resolve(&self.directory)
    }

    pub fn index_path(&self, storage: &StorageConfig) -> PathBuf {
        self.directory_path(storage).join(&self.index_file)
    }
}

impl TimeoutConfig {
    pub fn url(&self) -> Duration {
        Duration::from_secs(self.url_secs)
    }
    pub fn reply(&self) -> Duration {
        Duration::from_secs(self.reply_secs)
    }
    pub fn image(&self) -> Duration {
        Duration::from_secs(self.image_secs)
    }
    pub fn interview(&self) -> Duration {
        Duration::from_secs(self.interview_secs)
    }
    pub fn long_reply(&self) -> Duration {
        Duration::from_secs(self.long_reply_secs)
    }
}

impl LlmConfig {
    /// Reads the API key from the configured environment variable.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }
}

/// Loads, expands and validates the effective configuration.
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let mut config = match explicit {
        Some(path) => {
            info!("Loading configuration from: {}", path.display());
            load_config_from_path(path)?
        }
        None => match load_project_config()? {
            Some(cfg) => cfg,
            None => load_user_config()?.unwrap_or_default(),
        },
    };
    expand_config_paths(&mut config).context("Failed to expand paths in configuration")?;
    validate_config(&config).context("Configuration validation failed")?;
    debug!("Final loaded configuration: {:?}", config);
    Ok(config)
}

fn load_user_config() -> Result<Option<Config>> {
    if let Some(proj_dirs) = ProjectDirs::from("com", "Makan", "makan") {
        let config_path = proj_dirs.config_dir().join("config.toml");
        if config_path.exists() {
            info!("Loading user configuration from: {}", config_path.display());
            load_config_from_path(&config_path).map(Some)
        } else {
            debug!(
                "User configuration file not found at {}",
                config_path.display()
            );
            Ok(None)
        }
    } else {
        warn!("Could not determine user config directory.");
        Ok(None)
    }
}

fn load_project_config() -> Result<Option<Config>> {
    let current_dir = std::env::current_dir().context("Failed to get current directory")?;
    if let Some(path) = find_project_config_path(&current_dir) {
        info!("Loading project configuration from: {}", path.display());
        load_config_from_path(&path).map(Some)
    } else {
        debug!("No {} found in current directory or ancestors.", PROJECT_CONFIG_FILENAME);
        Ok(None)
    }
}

fn find_project_config_path(start: &Path) -> Option<PathBuf> {
    let mut path = start;
    loop {
        let candidate = path.join(PROJECT_CONFIG_FILENAME);
        if candidate.is_file() {
            return Some(candidate);
        }
        if path.join(".git").is_dir() {
            debug!(
                "Found .git directory at {}, stopping project config search.",
                path.display()
            );
            return None;
        }
        path = path.parent()?;
    }
}

fn load_config_from_path(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("Failed to parse TOML from file: {}", path.display()))
}

fn expand_config_paths(config: &mut Config) -> Result<()> {
    config.storage.data_dir = shellexpand::tilde(&config.storage.data_dir).into_owned();
    config.storage.image_dir = shellexpand::tilde(&config.storage.image_dir).into_owned();
    config.site.directory = shellexpand::tilde(&config.site.directory).into_owned();
    debug!("Expanded data directory: {}", config.storage.data_dir);
    Ok(())
}

fn validate_config(config: &Config) -> Result<()> {
    if config.bot.prefix.trim().is_empty() {
        return Err(anyhow!(MakanError::Config(
            "bot.prefix cannot be empty.".to_string()
        )));
    }
    if config.bot.history_size == 0 {
        return Err(anyhow!(MakanError::Config(
            "bot.history_size must be at least 1.".to_string()
        )));
    }
    let t = &config.timeouts;
    if [t.url_secs, t.reply_secs, t.image_secs, t.interview_secs, t.long_reply_secs]
        .contains(&0)
    {
        return Err(anyhow!(MakanError::Config(
            "Timeouts must be greater than zero seconds.".to_string()
        )));
    }
    crate::services::completion::map_backend(&config.llm.provider)
        .map_err(|e| anyhow!(MakanError::Config(e)))?;
    let data_dir = PathBuf::from(&config.storage.data_dir);
    if data_dir.exists() && !data_dir.is_dir() {
        return Err(anyhow!(MakanError::Config(format!(
            "Configured data directory '{}' exists but is not a directory.",
            data_dir.display()
        ))));
    }
    Ok(())
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_without_file() {
        let config = Config::default();
        assert_eq!(config.bot.prefix, "!");
        assert_eq!(config.bot.history_size, 20);
        assert_eq!(config.storage.default_image, "default.png");
        assert_eq!(config.storage.duplicate_cuisines, CuisinePolicy::Append);
        assert_eq!(config.timeouts.url(), Duration::from_secs(120));
        assert_eq!(config.timeouts.interview(), Duration::from_secs(90));
        assert_eq!(config.llm.model, "gpt-4o-mini");
    }

    #[test]
    fn test_deserialize_partial_toml() {
        let toml_content = r#"
            [bot]
            prefix = "?"

            [storage]
            data_dir = "/srv/makan"
            duplicate_cuisines = "reuse"

            [timeouts]
            reply_secs = 5
        "#;

        let config: Config = toml::from_str(toml_content).expect("Failed to parse TOML");
        assert_eq!(config.bot.prefix, "?");
        assert_eq!(config.bot.history_size, 20);
        assert_eq!(config.storage.duplicate_cuisines, CuisinePolicy::Reuse);
        assert_eq!(
            config.storage.recommendations_path(),
            PathBuf::from("/srv/makan/recommend.json")
        );
        assert_eq!(config.timeouts.reply_secs, 5);
        assert_eq!(config.timeouts.url_secs, 120);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result: std::result::Result<Config, _> = toml::from_str("[bot]\ncolour = \"red\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_path_expansion() {
        let mut config = Config::default();
        config.storage.data_dir = "~/makan".to_string();
        expand_config_paths(&mut config).unwrap();
        let home_dir = dirs::home_dir().unwrap();
        assert_eq!(
            config.storage.data_dir,
            home_dir.join("makan").to_string_lossy()
        );
    }

    #[test]
    fn test_site_paths_resolve_against_data_dir() {
        let mut config = Config::default();
        config.storage.data_dir = "/data".to_string();
        assert_eq!(
            config.site.index_path(&config.storage),
            PathBuf::from("/data/static/index.html")
        );
        assert_eq!(
            config.storage.image_dir_path(),
            PathBuf::from("/data/static/images")
        );
    }

    #[test]
    fn test_validate_rejects_empty_prefix() {
        let mut config = Config::default();
        config.bot.prefix = "  ".to_string();
        let result = validate_config(&config);
        assert!(result.unwrap_err().to_string().contains("prefix"));
    }

    #[test]
    fn test_validate_rejects_unknown_provider() {
        let mut config = Config::default();
        config.llm.provider = "carrier-pigeon".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = Config::default();
        config.timeouts.image_secs = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_find_project_config_stops_at_git() {
        let root = tempdir().unwrap();
        fs::write(root.path().join(PROJECT_CONFIG_FILENAME), "").unwrap();
        let repo = root.path().join("repo");
        fs::create_dir_all(repo.join(".git")).unwrap();
        let nested = repo.join("src");
        fs::create_dir_all(&nested).unwrap();
        assert!(find_project_config_path(&nested).is_none());

        fs::write(repo.join(PROJECT_CONFIG_FILENAME), "[bot]\nprefix = \"$\"\n").unwrap();
        assert_eq!(
            find_project_config_path(&nested),
            Some(repo.join(PROJECT_CONFIG_FILENAME))
        );
    }

    #[test]
    fn test_load_explicit_config_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        let data_dir = dir.path().to_string_lossy().to_string();
        fs::write(
            &path,
            format!("[storage]\ndata_dir = {:?}\n[bot]\nhistory_size = 4\n", data_dir),
        )
        .unwrap();
        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.bot.history_size, 4);
        assert_eq!(config.storage.data_dir, data_dir);
    }
}
