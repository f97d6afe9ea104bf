//! # Makan Library
//!
//! File: cli/src/lib.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Mr. Makan is a group-chat bot for a circle of friends who share
//! restaurant recommendations. Members submit places through a guided
//! conversation, browse and edit them, ask food questions answered by a
//! language model, earn rank titles for contributing, and regenerate a
//! static page listing everything.
//!
//! ## Layout
//!
//! - `core`: configuration, errors, templating
//! - `common`: filesystem helpers and external processes (git)
//! - `store`: the three JSON documents (records, cuisines, ranks)
//! - `services`: language-model completion and page/attachment fetching
//! - `bot`: command dispatch, conversation sessions, shared state
//! - `commands`: the `makan` subcommands (console, serve, page)
//!
pub mod bot;
pub mod commands;
pub mod common;
pub mod core;
pub mod services;
pub mod store;
