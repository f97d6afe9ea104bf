//! # Makan Flat-File Storage
//!
//! File: cli/src/store/mod.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Three independent JSON documents back the bot:
//! - `recommend.json`: array of recommendation records (`records`)
//! - `cuisines.json`: numbered cuisine taxonomy (`cuisines`)
//! - `ranks.json`: user id → `{points}` (`ranks`)
//!
//! Each document is loaded once at startup (created with its default if
//! missing) and rewritten wholesale, pretty-printed, after every change.
//! There is no coupling between the files; callers decide which ones to save.
//!
use crate::common::fs::io;
use crate::core::config::StorageConfig;
use crate::core::error::Result;
use std::path::PathBuf;
use tracing::info;

pub mod cuisines;
pub mod ranks;
pub mod records;

use cuisines::CuisineTaxonomy;
use ranks::RankTable;
use records::Recommendations;

/// Locations of the three documents.
#[derive(Debug, Clone)]
pub struct Store {
    recommendations: PathBuf,
    cuisines: PathBuf,
    ranks: PathBuf,
}

/// All documents, as loaded at startup.
#[derive(Debug, Clone, Default)]
pub struct Documents {
    pub recommendations: Recommendations,
    pub cuisines: CuisineTaxonomy,
    pub ranks: RankTable,
}

impl Store {
    pub fn from_config(storage: &StorageConfig) -> Self {
        Self {
            recommendations: storage.recommendations_path(),
            cuisines: storage.cuisines_path(),
            ranks: storage.ranks_path(),
        }
    }

    /// Loads every document, writing defaults for the ones that do not exist yet.
    pub fn load_all(&self) -> Result<Documents> {
        let docs = Documents {
            recommendations: io::load_json_or_init(&self.recommendations, Recommendations::default)?,
            cuisines: io::load_json_or_init(&self.cuisines, CuisineTaxonomy::seed)?,
            ranks: io::load_json_or_init(&self.ranks, RankTable::default)?,
        };
        info!(
            "Loaded {} recommendation(s), {} cuisine(s)",
            docs.recommendations.len(),
            docs.cuisines.len()
        );
        Ok(docs)
    }

    pub fn save_recommendations(&self, recommendations: &Recommendations) -> Result<()> {
        io::save_json_pretty(&self.recommendations, recommendations)
    }

    pub fn save_cuisines(&self, cuisines: &CuisineTaxonomy) -> Result<()> {
        io::save_json_pretty(&self.cuisines, cuisines)
    }

    pub fn save_ranks(&self, ranks: &RankTable) -> Result<()> {
        io::save_json_pretty(&self.ranks, ranks)
    }
}
