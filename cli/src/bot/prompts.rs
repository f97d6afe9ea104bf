//! # Prompts
//!
//! File: cli/src/bot/prompts.rs
//! Author: Christi Mahu
//!
//! Every piece of text sent to the completion service, plus the review
//! interview questions.
//!
use crate::store::records::{format_rating, RecommendationEntry};

pub const SUMMARY_MAX_TOKENS: u32 = 100;
pub const ASK_MAX_TOKENS: u32 = 250;
pub const PAGE_MAX_TOKENS: u32 = 1500;

/// Questions of the optional review interview, asked in order.
pub const REVIEW_QUESTIONS: [&str; 7] = [
    "What did you or your party eat?",
    "Favourite dish and why?",
    "Least favourite dish and why?",
    "Ambience?",
    "Price thoughts?",
    "Will you return?",
    "Any other comments?",
];

/// Summary request for the interview answers.
pub fn interview_summary(answers: &[String]) -> String {
    format!(
        "Summarise this review in 50 words like a food critic:\n{}",
        answers.join(" | ")
    )
}

/// Summary request for a free-form review typed during `edit`.
pub fn review_rewrite(review: &str) -> String {
    format!(
        "Summarize the following in 50 words as a food critic:\n{}",
        review
    )
}

/// System prompt for `ask`, grounded in the given recommendations.
pub fn ask_system(persona: &str, recent: &[RecommendationEntry]) -> String {
    let mut context = String::from("Here are some recommendations:\n");
    for entry in recent {
        context.push_str(&format!(
            "- {} ({}), Rating: {}/10. {}\n",
            entry.name,
            entry.cuisine,
            format_rating(entry.rating),
            entry.review.as_deref().unwrap_or("")
        ));
    }
    format!(
        "You are {}, a Malaysian foodie and cooking enthusiast. Use the recommendations and reviews below to help answer:\n{}",
        persona, context
    )
}

/// Page synthesis request wrapping the rendered cards.
pub fn web_page(persona: &str, cards_html: &str) -> String {
    format!(
        "Generate a dark-themed HTML page using Yelp-style cards titled \"{} Food Recommendations\".\n\
         Only include the HTML without any comments or markdown.\n\
         Use this content block:\n{}\n",
        persona, cards_html
    )
}
