//! # Makan Conversation Integration Tests
//!
//! File: cli/tests/conversations.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Drives the bot through complete chat conversations with offline
//! services and checks both the replies and the JSON documents on disk.
//!
mod common;
use common::*;

use makan::bot::{Bot, BotContext};
use makan::services::directory::UserDirectory;
use makan::services::fetch::Attachment;
use makan::store::cuisines::CuisinePolicy;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Runs `!recommend` up to and including the picture step.
async fn recommend_until_picture(h: &Harness, user: &str, cuisine: &[&str], rating: &str) {
    h.say(user, "!recommend").await;
    h.say(user, "https://hawker.example/chan").await;
    h.say(user, "yes").await;
    for reply in cuisine {
        h.say(user, reply).await;
    }
    h.say(user, rating).await;
}

#[tokio::test]
async fn unrated_recommendation_skips_interview() {
    let h = Harness::new(&[]);

    let replies = h.say("amy", "!recommend").await;
    assert_eq!(
        replies,
        vec!["Foodie amy, let’s make a new recommendation!\nStep 1️⃣: Send the restaurant URL."]
    );

    let replies = h.say("amy", "https://hawker.example/chan").await;
    assert!(replies[0].contains("**Hawker Chan**"));

    let replies = h.say("amy", "YES").await;
    assert!(replies[0].starts_with("**Step 3️⃣: Choose the cuisine type by number:**\n1. Chinese\n"));

    let replies = h.say("amy", "1").await;
    assert_eq!(replies, vec!["Step 4️⃣: Rate this place out of 10 (0 if not tried):"]);

    let replies = h.say("amy", "0").await;
    assert_eq!(replies, vec!["Step 5️⃣: Upload one picture from the restaurant."]);

    let replies = h.say("amy", "no picture, sorry").await;
    assert_eq!(
        replies,
        vec!["Thanks Foodie amy! Your recommendation has been saved. ✅"]
    );

    let records = h.document("recommend.json");
    assert_eq!(records.as_array().unwrap().len(), 1);
    assert_eq!(records[0]["id"], 1);
    assert_eq!(records[0]["name"], "Hawker Chan");
    assert_eq!(records[0]["cuisine"], "Chinese");
    assert_eq!(records[0]["user"], "amy");
    assert!(records[0].get("review").is_none());
    assert!(records[0].get("image").is_none());

    assert_eq!(h.document("ranks.json")["id-amy"]["points"], 1);
    assert!(h.completer.requests().is_empty());
    assert_eq!(h.bot.active_sessions().await, 0);
}

#[tokio::test]
async fn reviewed_recommendation_with_typed_cuisine_and_picture() {
    let h = Harness::new(&["Silky noodles, smoky char, worth the queue."]);

    h.say("bob", "!recommend").await;
    h.say("bob", "https://hawker.example/chan").await;
    let replies = h.say("bob", "no").await;
    assert_eq!(replies, vec!["Please provide the correct name:"]);
    h.say("bob", "Liao Fan Hawker Chan").await;

    let replies = h.say("bob", "13").await;
    assert_eq!(replies, vec!["Please enter the cuisine type:"]);
    h.say("bob", "Peranakan").await;
    h.say("bob", "8.5").await;

    let photo = Attachment {
        filename: "chicken rice.JPG".into(),
        url: "https://cdn.example/chicken.jpg".into(),
    };
    let replies = h.say_in("bob", "food", "", vec![photo]).await;
    assert_eq!(
        replies,
        vec!["Step 6️⃣: Would you like to answer a short review now? (yes/no)"]
    );

    let replies = h.say("bob", "yes").await;
    assert_eq!(replies, vec!["What did you or your party eat?"]);
    let answers = [
        "Soya sauce chicken",
        "The chicken, tender",
        "Char siew, dry",
        "Hawker buzz",
        "Cheap",
        "Yes",
    ];
    for answer in answers {
        let replies = h.say("bob", answer).await;
        assert_eq!(replies.len(), 1);
    }
    let replies = h.say("bob", "Go early").await;
    assert_eq!(
        replies,
        vec!["Thanks Foodie bob! Your recommendation has been saved. ✅"]
    );

    let requests = h.completer.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].max_tokens, 100);
    assert_eq!(
        requests[0].turns[0].content,
        "Summarise this review in 50 words like a food critic:\n\
         Soya sauce chicken | The chicken, tender | Char siew, dry | Hawker buzz | Cheap | Yes | Go early"
    );

    let records = h.document("recommend.json");
    let record = &records[0];
    assert_eq!(record["name"], "Liao Fan Hawker Chan");
    assert_eq!(record["cuisine"], "Peranakan");
    assert_eq!(record["rating"], 8.5);
    assert_eq!(record["review"], "Silky noodles, smoky char, worth the queue.");
    let image = record["image"].as_str().unwrap();
    assert!(image.ends_with(".JPG"));
    assert!(h.dir.path().join("static/images").join(image).is_file());

    assert_eq!(h.document("ranks.json")["id-bob"]["points"], 4);
    assert_eq!(h.document("cuisines.json")["14"], "Peranakan");
}

#[tokio::test]
async fn typed_cuisine_is_appended_each_time_by_default() {
    let h = Harness::new(&[]);
    for _ in 0..2 {
        recommend_until_picture(&h, "amy", &["99", "Nyonya"], "0").await;
        h.say("amy", "").await;
    }
    let cuisines = h.document("cuisines.json");
    assert_eq!(cuisines["14"], "Nyonya");
    assert_eq!(cuisines["15"], "Nyonya");
    assert_eq!(h.document("recommend.json")[1]["id"], 2);
    assert_eq!(h.document("ranks.json")["id-amy"]["points"], 2);
}

#[tokio::test]
async fn reuse_policy_files_known_cuisine_once() {
    let h = Harness::with_config(&[], |c| c.storage.duplicate_cuisines = CuisinePolicy::Reuse);
    recommend_until_picture(&h, "amy", &["13", "thai"], "0").await;
    h.say("amy", "").await;
    let cuisines = h.document("cuisines.json");
    assert_eq!(cuisines.as_object().unwrap().len(), 13);
    assert_eq!(h.document("recommend.json")[0]["cuisine"], "Thai");

    // The record carries the taxonomy's spelling, so `view` finds it either way.
    assert!(h.say("amy", "!view thai").await[0].contains("Hawker Chan"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_submissions_get_distinct_ids_and_points() {
    let h = Harness::new(&[]);
    let users = ["amy", "bob", "cat", "dan"];
    for user in users {
        recommend_until_picture(&h, user, &["1"], "0").await;
    }
    assert_eq!(h.bot.active_sessions().await, 4);

    let (a, b, c, d) = tokio::join!(
        h.say("amy", ""),
        h.say("bob", ""),
        h.say("cat", ""),
        h.say("dan", ""),
    );
    for replies in [a, b, c, d] {
        assert!(replies[0].ends_with("Your recommendation has been saved. ✅"));
    }

    let records = h.document("recommend.json");
    let mut ids: Vec<u64> = records
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_u64().unwrap())
        .collect();
    ids.sort_unstable();
    assert_eq!(ids, vec![1, 2, 3, 4]);

    let ranks = h.document("ranks.json");
    for user in users {
        assert_eq!(ranks[format!("id-{}", user)]["points"], 1);
    }
}

#[cfg(unix)]
#[tokio::test]
async fn failed_rank_save_leaves_records_untouched() {
    let h = Harness::new(&[]);
    let ranks_path = h.dir.path().join("ranks.json");
    std::fs::remove_file(&ranks_path).unwrap();
    std::fs::create_dir(&ranks_path).unwrap();

    recommend_until_picture(&h, "amy", &["1"], "0").await;
    let replies = h.say("amy", "").await;
    assert!(replies[0].starts_with("Something went wrong: "));
    assert!(h.document("recommend.json").as_array().unwrap().is_empty());
    assert_eq!(h.say("amy", "!viewall").await, vec!["No recommendations yet 😢"]);

    std::fs::remove_dir(&ranks_path).unwrap();
    recommend_until_picture(&h, "amy", &["1"], "0").await;
    h.say("amy", "").await;
    assert_eq!(h.document("recommend.json")[0]["id"], 1);
    assert_eq!(h.document("ranks.json")["id-amy"]["points"], 1);
}

#[tokio::test]
async fn invalid_rating_aborts_without_saving() {
    let h = Harness::new(&[]);
    recommend_until_picture(&h, "amy", &["2"], "eleven").await;

    let records = h.document("recommend.json");
    assert!(records.as_array().unwrap().is_empty());
    assert_eq!(h.bot.active_sessions().await, 0);

    let h = Harness::new(&[]);
    h.say("amy", "!recommend").await;
    h.say("amy", "https://hawker.example/chan").await;
    h.say("amy", "yes").await;
    h.say("amy", "2").await;
    let replies = h.say("amy", "11").await;
    assert_eq!(replies.len(), 1);
    assert!(replies[0].starts_with("Something went wrong: "));
    assert!(replies[0].contains("between 0 and 10"));
}

#[tokio::test]
async fn unreachable_url_aborts() {
    let h = Harness::new(&[]);
    h.say("amy", "!recommend").await;
    let replies = h.say("amy", "not a url").await;
    assert!(replies[0].starts_with("Something went wrong: "));
    assert_eq!(h.bot.active_sessions().await, 0);
}

#[tokio::test]
async fn sessions_are_per_author_and_channel() {
    let h = Harness::new(&[]);
    h.say("amy", "!recommend").await;

    // Another user in the same channel is not captured.
    let replies = h.say("bob", "!viewall").await;
    assert_eq!(replies, vec!["No recommendations yet 😢"]);

    // The same user elsewhere is not captured either.
    let replies = h.say_in("amy", "other", "!viewall", Vec::new()).await;
    assert_eq!(replies, vec!["No recommendations yet 😢"]);

    let replies = h.say("amy", "https://hawker.example/chan").await;
    assert!(replies[0].starts_with("Step 2️⃣"));
}

#[tokio::test]
async fn expired_session_is_dropped_with_notice() {
    let h = Harness::new(&[]);
    h.say("amy", "!recommend").await;
    h.say("amy", "https://hawker.example/chan").await;

    let notices = h
        .bot
        .expire_sessions(Instant::now() + Duration::from_secs(3600))
        .await;
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].channel, "food");
    assert_eq!(
        notices[0].content,
        "⏰ Timed out waiting for your reply. Start again with !recommend."
    );

    // The next reply is no longer part of a conversation.
    assert!(h.say("amy", "yes").await.is_empty());
    assert!(h.document("recommend.json").as_array().unwrap().is_empty());
}

#[tokio::test]
async fn lazily_expired_session_reports_timeout_then_runs_command() {
    let h = Harness::with_config(&[], |c| c.timeouts.url_secs = 1);
    h.say("amy", "!recommend").await;
    tokio::time::sleep(Duration::from_millis(1100)).await;
    let replies = h.say("amy", "!viewall").await;
    assert_eq!(
        replies,
        vec![
            "⏰ Timed out waiting for your reply. Start again with !recommend.",
            "No recommendations yet 😢"
        ]
    );
}

#[tokio::test]
async fn edit_updates_and_deletes_records() {
    let h = Harness::new(&["Crisp skin, juicy meat."]);
    for _ in 0..2 {
        recommend_until_picture(&h, "amy", &["1"], "0").await;
        h.say("amy", "").await;
    }

    h.say("bob", "!edit").await;
    let replies = h.say("bob", "1").await;
    assert!(replies[0].starts_with("What would you like to edit?"));
    assert_eq!(h.say("bob", "4").await, vec!["Enter new rating out of 10:"]);
    assert_eq!(h.say("bob", "7").await, vec!["Entry updated."]);
    assert_eq!(h.document("recommend.json")[0]["rating"], 7.0);

    h.say("bob", "!edit").await;
    h.say("bob", "2").await;
    assert_eq!(h.say("bob", "5").await, vec!["Enter new review:"]);
    assert_eq!(h.say("bob", "loved the duck").await, vec!["Entry updated."]);
    assert_eq!(h.document("recommend.json")[1]["review"], "Crisp skin, juicy meat.");
    assert!(h.completer.requests()[0].turns[0]
        .content
        .starts_with("Summarize the following in 50 words as a food critic:\nloved the duck"));

    h.say("bob", "!edit").await;
    h.say("bob", "1").await;
    assert_eq!(h.say("bob", "6").await, vec!["Recommendation deleted."]);
    let records = h.document("recommend.json");
    assert_eq!(records.as_array().unwrap().len(), 1);
    assert_eq!(records[0]["id"], 2);

    // Deleted ids are not reused.
    recommend_until_picture(&h, "amy", &["1"], "0").await;
    h.say("amy", "").await;
    assert_eq!(h.document("recommend.json")[1]["id"], 3);
}

#[tokio::test]
async fn edit_rejects_bad_input() {
    let h = Harness::new(&[]);
    recommend_until_picture(&h, "amy", &["1"], "0").await;
    h.say("amy", "").await;

    h.say("amy", "!edit").await;
    assert_eq!(h.say("amy", "42").await, vec!["Invalid ID."]);

    h.say("amy", "!edit").await;
    h.say("amy", "1").await;
    assert_eq!(h.say("amy", "9").await, vec!["Invalid choice."]);

    h.say("amy", "!edit").await;
    let replies = h.say("amy", "first one").await;
    assert!(replies[0].starts_with("Edit failed: "));

    assert_eq!(h.bot.active_sessions().await, 0);
    assert_eq!(h.document("recommend.json")[0]["name"], "Hawker Chan");
}

#[tokio::test]
async fn view_filters_by_exact_cuisine() {
    let h = Harness::new(&[]);
    recommend_until_picture(&h, "amy", &["1"], "9").await;
    h.say("amy", "").await;
    h.say("amy", "no").await;
    recommend_until_picture(&h, "amy", &["3"], "0").await;
    h.say("amy", "").await;

    let replies = h.say("bob", "!view chinese").await;
    assert!(replies[0].starts_with("**Recommendations for Chinese:**\n"));
    assert!(replies[0].contains("ID 1: [Hawker Chan](https://hawker.example/chan) | Rating: 9.0/10"));
    assert!(!replies[0].contains("ID 2"));

    assert_eq!(
        h.say("bob", "!view chin").await,
        vec!["No recommendations for **chin** cuisine."]
    );
    assert_eq!(h.say("bob", "!view").await, vec!["Usage: !view <cuisine>"]);

    let all = h.say("bob", "!viewall").await;
    assert!(all[0].contains("| Cuisine: Malay | Rating: 0.0/10"));
}

#[tokio::test]
async fn ask_answers_in_persona_with_bounded_history() {
    let h = Harness::with_config(&["a1", "a2", "a3"], |c| c.bot.history_size = 4);

    let replies = h.say("amy", "!ask best laksa?").await;
    assert_eq!(replies, vec!["Foodie amy, here's what I think:\na1"]);
    h.say("amy", "!ask and chendol?").await;
    h.say("amy", "!ask and satay?").await;

    let requests = h.completer.requests();
    assert_eq!(requests.len(), 3);
    assert_eq!(requests[0].max_tokens, 250);
    assert_eq!(requests[0].turns.len(), 1);
    assert_eq!(requests[1].turns.len(), 3);
    // q1 a1 q2 a2 q3 exceeds four turns, so q1 is gone.
    let last: Vec<&str> = requests[2].turns.iter().map(|t| t.content.as_str()).collect();
    assert_eq!(last, vec!["a1", "and chendol?", "a2", "and satay?"]);
    assert!(requests[2]
        .system
        .as_deref()
        .unwrap()
        .contains("You are Mr. Makan, a Malaysian foodie and cooking enthusiast."));

    assert_eq!(h.say("amy", "!ask").await, vec!["Usage: !ask <question>"]);
}

#[tokio::test]
async fn rank_shows_points_and_leaderboard() {
    let h = Harness::new(&[]);
    for _ in 0..6 {
        recommend_until_picture(&h, "amy", &["1"], "0").await;
        h.say("amy", "").await;
    }
    recommend_until_picture(&h, "bob", &["1"], "0").await;
    h.say("bob", "").await;

    let replies = h.say("bob", "!rank").await;
    assert_eq!(
        replies,
        vec![
            "Foodie bob, you have 1 points.\n\n**🍽️ Leaderboard 🍽️**\n\
             1. Senior Foodie amy – 6 points\n2. Foodie bob – 1 points\n"
        ]
    );

    let replies = h.say("amy", "!recommend").await;
    assert!(replies[0].starts_with("Senior Foodie amy"));
}

#[tokio::test]
async fn leaderboard_names_survive_restart() {
    let mut h = Harness::new(&[]);
    recommend_until_picture(&h, "amy", &["1"], "0").await;
    h.say("amy", "").await;
    assert_eq!(h.document("users.json")["id-amy"], "amy");

    h.restart();
    let replies = h.say("bob", "!rank").await;
    assert!(replies[0].contains("1. Foodie amy – 1 points\n"));
    assert!(!replies[0].contains("id-amy"));
}

struct FixedDirectory;

#[async_trait::async_trait]
impl UserDirectory for FixedDirectory {
    async fn display_name(&self, user_id: &str) -> Option<String> {
        (user_id == "id-amy").then(|| "Aunty Amy".to_string())
    }

    async fn remember(&self, _user_id: &str, _name: &str) -> makan::core::error::Result<()> {
        Ok(())
    }
}

#[tokio::test]
async fn leaderboard_uses_injected_directory() {
    let mut h = Harness::new(&[]);
    recommend_until_picture(&h, "amy", &["1"], "0").await;
    h.say("amy", "").await;

    let ctx = BotContext::load(
        h.config.clone(),
        h.completer.clone(),
        Arc::new(StaticFetcher {
            title: "Hawker Chan".to_string(),
        }),
    )
    .unwrap()
    .with_directory(Arc::new(FixedDirectory));
    h.bot = Bot::new(Arc::new(ctx));

    let replies = h.say("bob", "!rank").await;
    assert!(replies[0].contains("1. Foodie Aunty Amy – 1 points\n"));
}

#[tokio::test]
async fn viewweb_writes_page_from_cards() {
    let h = Harness::new(&["```html\n<html><body>cards</body></html>\n```"]);
    recommend_until_picture(&h, "amy", &["1"], "0").await;
    h.say("amy", "").await;

    let replies = h.say("amy", "!viewweb").await;
    assert!(replies[0].starts_with("Webpage updated!"));

    let page = std::fs::read_to_string(h.dir.path().join("static/index.html")).unwrap();
    assert_eq!(page, "<html><body>cards</body></html>");

    let prompt = &h.completer.requests()[0];
    assert_eq!(prompt.max_tokens, 1500);
    assert!(prompt.turns[0].content.contains("Mr. Makan Food Recommendations"));
    assert!(prompt.turns[0].content.contains("Hawker Chan"));
    assert!(prompt.turns[0].content.contains("default.png"));
}

#[tokio::test]
async fn unknown_commands_and_chatter_are_ignored() {
    let h = Harness::new(&[]);
    assert!(h.say("amy", "!dance").await.is_empty());
    assert!(h.say("amy", "lunch anyone?").await.is_empty());
    assert!(h.say("amy", "!help").await[0].contains("`!recommend`"));
}
