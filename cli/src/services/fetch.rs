//! # Page and Attachment Fetching
//!
//! File: cli/src/services/fetch.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Network access needed by the `recommend` sequence:
//! - fetching a restaurant URL and reading its `<title>` as a name suggestion
//! - saving an image attachment under the image directory
//!
//! `PageFetcher` is the seam; `HttpFetcher` implements it with `reqwest`.
//! Attachments whose source is not an `http(s)` URL are treated as local
//! file paths and copied, which is how the console transport uploads files.
//!
use crate::core::error::{MakanError, Result};
use anyhow::anyhow;
use async_trait::async_trait;
use scraper::{Html, Selector};
use std::path::Path;
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

/// Name suggested when a page has no usable `<title>`.
pub const UNKNOWN_TITLE: &str = "Unknown";

/// A file attached to a chat message.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct Attachment {
    /// Original filename as uploaded; only its extension is kept.
    pub filename: String,
    /// `http(s)://` URL or local path of the content.
    pub url: String,
}

#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetches `url` and returns its trimmed title, or `"Unknown"`.
    async fn fetch_title(&self, url: &str) -> Result<String>;

    /// Writes the attachment's bytes to `dest`.
    async fn save_attachment(&self, attachment: &Attachment, dest: &Path) -> Result<()>;
}

/// `PageFetcher` over HTTP.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("makan/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| anyhow!(MakanError::Config(format!("HTTP client: {e}"))))?;
        Ok(Self { client })
    }
}

fn is_remote(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch_title(&self, url: &str) -> Result<String> {
        let fetch_err = |reason: String| {
            anyhow!(MakanError::Fetch {
                url: url.to_string(),
                reason,
            })
        };
        let html = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| fetch_err(e.to_string()))?
            .text()
            .await
            .map_err(|e| fetch_err(e.to_string()))?;
        let title = extract_title(&html).unwrap_or_else(|| UNKNOWN_TITLE.to_string());
        debug!("Title for {}: {}", url, title);
        Ok(title)
    }

    async fn save_attachment(&self, attachment: &Attachment, dest: &Path) -> Result<()> {
        let attach_err = |reason: String| {
            anyhow!(MakanError::Attachment {
                filename: attachment.filename.clone(),
                reason,
            })
        };
        if is_remote(&attachment.url) {
            let bytes = self
                .client
                .get(&attachment.url)
                .send()
                .await
                .and_then(|r| r.error_for_status())
                .map_err(|e| attach_err(e.to_string()))?
                .bytes()
                .await
                .map_err(|e| attach_err(e.to_string()))?;
            tokio::fs::write(dest, &bytes)
                .await
                .map_err(|e| attach_err(e.to_string()))?;
        } else {
            tokio::fs::copy(&attachment.url, dest)
                .await
                .map_err(|e| attach_err(e.to_string()))?;
        }
        debug!("Saved attachment {} to {}", attachment.filename, dest.display());
        Ok(())
    }
}

/// First `<title>` of an HTML document, trimmed; `None` if missing or blank.
pub fn extract_title(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("title").ok()?;
    let text: String = document.select(&selector).next()?.text().collect();
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// A fresh `<uuid><ext>` filename keeping the original extension.
pub fn unique_image_name(original: &str) -> String {
    let ext = Path::new(original)
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    format!("{}{}", Uuid::new_v4(), ext)
}
