//! # Makan Filesystem Utilities
//!
//! File: cli/src/common/fs/mod.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Filesystem helpers shared by the storage layer, the attachment saver and
//! the web page writer.
//!
//! ```ignore
//! use crate::common::fs::io;
//! io::ensure_dir_exists(image_dir)?;
//! ```
//!

/// Contains basic file and JSON document I/O (e.g., `ensure_dir_exists`, `save_json_pretty`).
pub mod io;
