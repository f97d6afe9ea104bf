//! # Read-Only Replies
//!
//! File: cli/src/bot/views.rs
//! Author: Christi Mahu
//!
//! Formatting for `help`, `rank`, `viewall` and `view <cuisine>`. Pure
//! functions over the documents, so they are tested directly.
//!
use crate::store::ranks::get_rank;
use crate::store::records::{format_rating, Recommendations};

pub fn help_text(prefix: &str) -> String {
    let view_example = format!(
        "View only specific cuisine recommendations (e.g. `{}view chinese`).",
        prefix
    );
    let commands = [
        ("ask", "Ask any food/cooking question. Mr. Makan will reply using his wisdom."),
        ("recommend", "Add a food recommendation. Mr. Makan will guide you step-by-step."),
        ("viewall", "View all stored recommendations."),
        ("view <cuisine>", view_example.as_str()),
        ("viewweb", "Regenerate the webpage version of all recommendations."),
        ("edit", "Edit or delete a previous recommendation using its ID."),
        ("rank", "View your rank and the leaderboard."),
    ];
    let mut text = String::from("**Mr. Makan Bot Commands 🍜**\n\n");
    for (name, about) in commands {
        text.push_str(&format!("`{}{}` – {}\n", prefix, name, about));
    }
    text
}

/// Caller's title and points, then everyone ranked by points.
///
/// `board` must already be sorted; names are whatever the caller resolved
/// for each user id.
pub fn rank_text(caller: &str, caller_points: u32, board: &[(String, u32)]) -> String {
    let mut leaderboard = String::from("**🍽️ Leaderboard 🍽️**\n");
    for (i, (name, points)) in board.iter().enumerate() {
        leaderboard.push_str(&format!(
            "{}. {} {} – {} points\n",
            i + 1,
            get_rank(*points),
            name,
            points
        ));
    }
    format!(
        "{} {}, you have {} points.\n\n{}",
        get_rank(caller_points),
        caller,
        caller_points,
        leaderboard
    )
}

pub fn view_all(records: &Recommendations) -> String {
    if records.is_empty() {
        return "No recommendations yet 😢".to_string();
    }
    let mut msg = String::from("**All Recommendations:**\n");
    for entry in records.entries() {
        msg.push_str(&format!(
            "ID {}: [{}]({}) | Cuisine: {} | Rating: {}/10\n",
            entry.id,
            entry.name,
            entry.url,
            entry.cuisine,
            format_rating(entry.rating)
        ));
    }
    msg
}

pub fn view_cuisine(records: &Recommendations, cuisine: &str) -> String {
    let found = records.by_cuisine(cuisine);
    if found.is_empty() {
        return format!("No recommendations for **{}** cuisine.", cuisine);
    }
    let mut msg = format!("**Recommendations for {}:**\n", capitalize(cuisine));
    for entry in found {
        msg.push_str(&format!(
            "ID {}: [{}]({}) | Rating: {}/10\n",
            entry.id,
            entry.name,
            entry.url,
            format_rating(entry.rating)
        ));
    }
    msg
}

/// First character upper-cased, the rest lower-cased.
pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}
