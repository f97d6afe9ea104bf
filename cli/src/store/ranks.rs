//! # Points and Ranks
//!
//! File: cli/src/store/ranks.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Gamification for contributors. Each user id maps to `{"points": n}` in
//! `ranks.json`; points are only ever added. `get_rank` turns a total into a
//! title via fixed descending thresholds.
//!
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Points for each saved recommendation.
pub const POINTS_PER_RECOMMENDATION: u32 = 1;
/// Bonus points for completing the review interview.
pub const POINTS_PER_REVIEW: u32 = 3;

/// `(minimum points, title)`, highest threshold first.
pub const RANK_TITLES: [(u32, &str); 5] = [
    (36, "Michelin Inspector"),
    (26, "Food Critique"),
    (16, "Master Foodie"),
    (6, "Senior Foodie"),
    (0, "Foodie"),
];

/// Title for a point total: the first threshold the total reaches.
pub fn get_rank(points: u32) -> &'static str {
    RANK_TITLES
        .iter()
        .find(|(threshold, _)| points >= *threshold)
        .map(|(_, title)| *title)
        .unwrap_or("Foodie")
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPoints {
    pub points: u32,
}

/// User id → accumulated points.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RankTable {
    users: BTreeMap<String, UserPoints>,
}

impl RankTable {
    pub fn points_of(&self, user_id: &str) -> u32 {
        self.users.get(user_id).map(|u| u.points).unwrap_or(0)
    }

    pub fn title_of(&self, user_id: &str) -> &'static str {
        get_rank(self.points_of(user_id))
    }

    /// Adds `points` to the user's total and returns the new total.
    pub fn add_points(&mut self, user_id: &str, points: u32) -> u32 {
        let entry = self.users.entry(user_id.to_string()).or_default();
        entry.points = entry.points.saturating_add(points);
        entry.points
    }

    /// `(user id, points)` pairs, highest total first; ties keep id order.
    pub fn leaderboard(&self) -> Vec<(&str, u32)> {
        let mut rows: Vec<(&str, u32)> = self
            .users
            .iter()
            .map(|(id, u)| (id.as_str(), u.points))
            .collect();
        rows.sort_by(|a, b| b.1.cmp(&a.1));
        rows
    }
}
