//! # Makan Error Types
//!
//! File: cli/src/core/error.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! This module defines the error types used throughout the Makan bot. Chat
//! sequences never branch on the kind of failure: any error aborts the
//! running sequence and its message is shown to the user verbatim. The enum
//! exists so those messages are consistent and so tests can match on the
//! failure that was raised.
//!
//! ## Architecture
//!
//! The error system consists of two main components:
//! - `MakanError`: A custom error enum using `thiserror` for domain failures
//! - `Result<T>`: A type alias for `anyhow::Result<T>` for flexible propagation
//!
//! ## Examples
//!
//! ```ignore
//! // Reject a reply that is not a number.
//! let rating: f64 = text
//!     .parse()
//!     .map_err(|_| MakanError::InvalidInput(format!("'{}' is not a number", text)))?;
//!
//! // Add context to I/O errors using anyhow.
//! let raw = fs::read_to_string(&path)
//!     .with_context(|| format!("Failed to read {}", path.display()))?;
//! ```
//!
use thiserror::Error;

/// Custom error type for the Makan bot.
#[derive(Error, Debug)]
pub enum MakanError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Recommendation {id} not found.")]
    RecordNotFound { id: u32 },

    #[error("Text completion failed: {0}")]
    Completion(String),

    #[error("Could not fetch '{url}': {reason}")]
    Fetch { url: String, reason: String },

    #[error("Could not save attachment '{filename}': {reason}")]
    Attachment { filename: String, reason: String },

    #[error("Template rendering error: {source}")]
    Template {
        #[from]
        source: tera::Error,
    },

    #[error("External command failed: {cmd}, Status: {status}, Output:\n{output}")]
    ExternalCommand {
        cmd: String,
        status: String,
        output: String,
    },
}

/// Type alias for Result using anyhow::Error for broad compatibility.
pub type Result<T> = anyhow::Result<T>;
