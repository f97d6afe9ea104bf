//! # Makan Common Utilities
//!
//! File: cli/src/common/mod.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Shared, domain-agnostic helpers used across the crate.
//!

/// Utilities for filesystem operations (directories, text files, JSON documents).
pub mod fs;
/// Utilities for executing external processes (git publishing).
pub mod process;
