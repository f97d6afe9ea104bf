//! # Makan External Services
//!
//! File: cli/src/services/mod.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Narrow seams over the outside world the bot talks to:
//! - `completion`: the language-model text-completion service
//! - `fetch`: restaurant page titles and image attachments over HTTP
//! - `directory`: display names of users by id
//!
//! All three are traits so that the bot can be exercised offline in tests.
//!

/// Text completion (`Completer`, `LlmCompleter`).
pub mod completion;
/// Page title and attachment fetching (`PageFetcher`, `HttpFetcher`).
pub mod fetch;
/// Display names by user id (`UserDirectory`, `JsonUserDirectory`).
pub mod directory;
