//! # Cuisine Taxonomy
//!
//! File: cli/src/store/cuisines.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! The numbered list of cuisines offered during `recommend`, persisted as
//! `cuisines.json` (`{"1": "Chinese", ...}`). Users pick a number; an unknown
//! number or the "Others" entry asks them to type a cuisine, which is then
//! added under the next unused key.
//!
//! Whether a typed cuisine that already exists gets a second key is decided
//! by `CuisinePolicy`. `Append` (the default) always adds a new key, so the
//! same name typed twice produces two entries; `Reuse` maps a
//! case-insensitive match onto the existing entry.
//!
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Catch-all entry that asks the user to type the cuisine.
pub const OTHERS: &str = "Others";

/// How typed cuisines that already exist in the taxonomy are handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CuisinePolicy {
    /// Always add a new key, even for a name that is already listed.
    #[default]
    Append,
    /// Reuse the existing key when the name matches ignoring case.
    Reuse,
}

/// Result of matching a user's menu reply against the taxonomy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CuisineChoice {
    Known(String),
    /// The reply was not a listed key, or picked "Others".
    NeedsName,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CuisineTaxonomy {
    entries: BTreeMap<u32, String>,
}

impl Default for CuisineTaxonomy {
    fn default() -> Self {
        Self::seed()
    }
}

impl CuisineTaxonomy {
    /// The taxonomy written when no cuisine file exists yet.
    pub fn seed() -> Self {
        let names = [
            "Chinese",
            "Indian",
            "Malay",
            "Western/Cafe",
            "Steakhouse",
            "Italian",
            "French",
            "Fish 'n' Chips",
            "Mexican",
            "Thai",
            "Indonesian",
            "Vietnamese",
            OTHERS,
        ];
        Self {
            entries: (1u32..).zip(names.iter().map(|n| n.to_string())).collect(),
        }
    }

    pub fn from_entries(entries: BTreeMap<u32, String>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: u32) -> Option<&str> {
        self.entries.get(&key).map(String::as_str)
    }

    /// Matches a reply such as `"3"` against the listed keys.
    pub fn select(&self, reply: &str) -> CuisineChoice {
        match reply.trim().parse::<u32>().ok().and_then(|k| self.get(k)) {
            Some(name) if name != OTHERS => CuisineChoice::Known(name.to_string()),
            _ => CuisineChoice::NeedsName,
        }
    }

    /// The key a newly added cuisine would receive.
    pub fn next_key(&self) -> u32 {
        self.entries.keys().next_back().copied().unwrap_or(0) + 1
    }

    /// Adds a typed cuisine according to `policy`.
    ///
    /// Returns the key the cuisine is filed under and whether the taxonomy grew.
    pub fn add(&mut self, name: &str, policy: CuisinePolicy) -> (u32, bool) {
        let name = name.trim();
        if policy == CuisinePolicy::Reuse {
            let wanted = name.to_lowercase();
            if let Some((key, _)) = self
                .entries
                .iter()
                .find(|(_, existing)| existing.to_lowercase() == wanted)
            {
                return (*key, false);
            }
        }
        let key = self.next_key();
        self.entries.insert(key, name.to_string());
        (key, true)
    }

    /// One `key. name` line per entry, in key order.
    pub fn menu(&self) -> String {
        self.entries
            .iter()
            .map(|(key, name)| format!("{}. {}\n", key, name))
            .collect()
    }
}
