//! # Makan Core Infrastructure
//!
//! File: cli/src/core/mod.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! This module aggregates the core infrastructure shared by the bot and the
//! command-line front end:
//! - `config`: Configuration loading, path expansion, and validation
//! - `error`: Error types and the crate-wide `Result` alias
//! - `templating`: Tera rendering of the recommendation card block
//!
//! ## Usage
//!
//! ```ignore
//! use crate::core::config; // For loading configuration
//! use crate::core::error::{MakanError, Result}; // For error handling
//! ```
//!
pub mod config;
pub mod error;
pub mod templating;
