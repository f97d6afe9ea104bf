//! # Makan Filesystem I/O Operations
//!
//! File: cli/src/common/fs/io.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! This module centralizes the filesystem operations behind the bot's flat-file
//! storage: making sure directories exist, reading and writing text files, and
//! loading/saving the pretty-printed JSON documents.
//!
//! ## Architecture
//!
//! - **`ensure_dir_exists`**: Creates a directory (and parents) if missing; errors if the path is a file.
//! - **`read_file_to_string`** / **`write_string_to_file`**: Thin wrappers that add context to I/O errors.
//! - **`load_json_or_init`**: Reads a JSON document, first writing the supplied default if the file is missing.
//! - **`save_json_pretty`**: Rewrites a JSON document wholesale with two-space indentation.
//!
//! ## Usage
//!
//! ```ignore
//! use crate::common::fs::io;
//!
//! let ranks: RankTable = io::load_json_or_init(&path, RankTable::default)?;
//! io::save_json_pretty(&path, &ranks)?;
//! ```
//!
use crate::core::error::{MakanError, Result};
use anyhow::Context;
use serde::{de::DeserializeOwned, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Ensures that a directory exists at the specified path.
///
/// Creates the directory and any missing parents. Returns an error if the path
/// already exists but is not a directory.
pub fn ensure_dir_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("Failed to create directory {:?}", path))?;
        info!("Created directory: {:?}", path);
    } else if !path.is_dir() {
        anyhow::bail!(MakanError::Storage(format!(
            "Path exists but is not a directory: {:?}",
            path
        )));
    } else {
        debug!("Directory already exists: {:?}", path);
    }
    Ok(())
}

/// Reads the entire content of a file into a string.
pub fn read_file_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read file {:?}", path))
}

/// Writes string content to a file, creating the parent directory if needed.
///
/// The content is written to a sibling temporary file first and then renamed
/// over the target, so readers never observe a half-written document.
pub fn write_string_to_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            ensure_dir_exists(parent)?;
        }
    }
    let mut tmp_name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_default();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);
    fs::write(&tmp_path, content)
        .with_context(|| format!("Failed to write to file {:?}", tmp_path))?;
    fs::rename(&tmp_path, path)
        .with_context(|| format!("Failed to replace file {:?}", path))?;
    debug!("Wrote content to file: {:?}", path);
    Ok(())
}

/// Loads a JSON document, creating it from `default` when the file does not exist.
pub fn load_json_or_init<T, F>(path: &Path, default: F) -> Result<T>
where
    T: DeserializeOwned + Serialize,
    F: FnOnce() -> T,
{
    if !path.exists() {
        let value = default();
        save_json_pretty(path, &value)?;
        info!("Initialised {:?} with default content", path);
        return Ok(value);
    }
    let raw = read_file_to_string(path)?;
    serde_json::from_str(&raw).with_context(|| {
        MakanError::Storage(format!("File {:?} does not contain a valid document", path))
    })
}

/// Serialises `value` as indented JSON and rewrites `path` with it.
pub fn save_json_pretty<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)
        .with_context(|| format!("Failed to serialise document for {:?}", path))?;
    write_string_to_file(path, &json)
}
