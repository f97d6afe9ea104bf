//! # Recommendation Records
//!
//! File: cli/src/store/records.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! The `RecommendationEntry` record and the ordered `Recommendations`
//! collection persisted as `recommend.json` (a JSON array). The collection
//! owns id assignment, lookup, in-place field edits, deletion and the
//! cuisine filter used by `view`.
//!
//! Ids are 1-based and never renumbered: deleting a record leaves a gap, and a
//! new record always receives one more than the highest id in use.
//!
use crate::core::error::{MakanError, Result};
use anyhow::anyhow;
use serde::{Deserialize, Deserializer, Serialize};

/// Highest accepted rating.
pub const MAX_RATING: f64 = 10.0;

/// A single stored restaurant recommendation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationEntry {
    pub id: u32,
    pub url: String,
    pub name: String,
    pub cuisine: String,
    pub rating: f64,
    /// Critic-style summary, absent when the submitter skipped the interview.
    #[serde(
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub review: Option<String>,
    /// Display name of the submitting user.
    pub user: String,
    /// Saved image filename, absent when no picture was uploaded.
    #[serde(
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub image: Option<String>,
}

/// Older documents store `""` for a missing review or image.
fn empty_as_none<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

/// Everything a new record needs except its id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRecommendation {
    pub url: String,
    pub name: String,
    pub cuisine: String,
    pub rating: f64,
    pub review: Option<String>,
    pub user: String,
    pub image: Option<String>,
}

/// Replacement value for one editable field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldEdit {
    Url(String),
    Name(String),
    Cuisine(String),
    Rating(f64),
    Review(String),
}

impl RecommendationEntry {
    /// Image filename, or `default` when none was uploaded.
    pub fn image_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.image.as_deref().unwrap_or(default)
    }
}

/// Ordered collection of recommendations, serialised as a bare JSON array.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Recommendations {
    entries: Vec<RecommendationEntry>,
}

impl Recommendations {
    pub fn new(entries: Vec<RecommendationEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[RecommendationEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The id the next appended record will receive.
    pub fn next_id(&self) -> u32 {
        self.entries.iter().map(|e| e.id).max().unwrap_or(0) + 1
    }

    /// Appends a record with the next id and returns it.
    pub fn push(&mut self, new: NewRecommendation) -> &RecommendationEntry {
        let entry = RecommendationEntry {
            id: self.next_id(),
            url: new.url,
            name: new.name,
            cuisine: new.cuisine,
            rating: new.rating,
            review: new.review,
            user: new.user,
            image: new.image,
        };
        self.entries.push(entry);
        &self.entries[self.entries.len() - 1]
    }

    pub fn get(&self, id: u32) -> Option<&RecommendationEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Replaces one field of record `id` in place.
    pub fn apply(&mut self, id: u32, edit: FieldEdit) -> Result<&RecommendationEntry> {
        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| anyhow!(MakanError::RecordNotFound { id }))?;
        match edit {
            FieldEdit::Url(url) => entry.url = url,
            FieldEdit::Name(name) => entry.name = name,
            FieldEdit::Cuisine(cuisine) => entry.cuisine = cuisine,
            FieldEdit::Rating(rating) => entry.rating = rating,
            FieldEdit::Review(review) => entry.review = Some(review),
        }
        Ok(entry)
    }

    /// Removes record `id`; other ids are left untouched.
    pub fn remove(&mut self, id: u32) -> Result<RecommendationEntry> {
        let index = self
            .entries
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| anyhow!(MakanError::RecordNotFound { id }))?;
        Ok(self.entries.remove(index))
    }

    /// Records whose cuisine equals `cuisine`, ignoring case. Substrings do not match.
    pub fn by_cuisine(&self, cuisine: &str) -> Vec<&RecommendationEntry> {
        let wanted = cuisine.trim().to_lowercase();
        self.entries
            .iter()
            .filter(|e| e.cuisine.to_lowercase() == wanted)
            .collect()
    }

    /// The `n` most recently appended records, oldest first.
    pub fn latest(&self, n: usize) -> &[RecommendationEntry] {
        let start = self.entries.len().saturating_sub(n);
        &self.entries[start..]
    }
}

/// Formats a rating with at least one decimal place (`8.0`, `7.5`).
pub fn format_rating(rating: f64) -> String {
    if rating.fract() == 0.0 {
        format!("{:.1}", rating)
    } else {
        format!("{}", rating)
    }
}

/// Parses a chat reply as a rating between 0 and 10 inclusive.
pub fn parse_rating(text: &str) -> Result<f64> {
    let trimmed = text.trim();
    let rating: f64 = trimmed.parse().map_err(|_| {
        anyhow!(MakanError::InvalidInput(format!(
            "could not convert '{}' to a rating",
            trimmed
        )))
    })?;
    if !rating.is_finite() || !(0.0..=MAX_RATING).contains(&rating) {
        return Err(anyhow!(MakanError::InvalidInput(format!(
            "rating must be between 0 and 10, got {}",
            trimmed
        ))));
    }
    Ok(rating)
}

/// Parses a chat reply as a record id.
pub fn parse_id(text: &str) -> Result<u32> {
    let trimmed = text.trim();
    trimmed.parse().map_err(|_| {
        anyhow!(MakanError::InvalidInput(format!(
            "'{}' is not a valid recommendation id",
            trimmed
        )))
    })
}
