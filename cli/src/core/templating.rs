//! # Makan Templating
//!
//! File: cli/src/core/templating.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Renders the HTML content block that describes every stored recommendation
//! as a card. The block is handed to the completion service, which wraps it
//! into a full page (see `bot::web`). Rendering goes through Tera with
//! autoescaping on, so names and reviews typed in chat cannot inject markup.
//! Link targets are escaped separately with `escape_href`, which leaves `/`
//! alone so the URLs the model reads stay legible.
//!
use crate::core::error::{MakanError, Result};
use crate::store::records::{format_rating, RecommendationEntry};
use anyhow::anyhow;
use serde::Serialize;
use tera::{Context, Tera};
use tracing::debug;

const CARDS_TEMPLATE: &str = r#"{% for card in cards %}
<div class="card">
    <img src="images/{{ card.image }}" alt="{{ card.name }}">
    <div class="info">
        <h2><a href="{{ card.href | safe }}" target="_blank">{{ card.name }}</a></h2>
        <p>{{ card.cuisine }} – Rating: {{ card.rating }}/10</p>
        <p>{{ card.review }}</p>
    </div>
</div>
{% endfor %}"#;

#[derive(Serialize)]
struct CardView<'a> {
    image: &'a str,
    name: &'a str,
    href: String,
    cuisine: &'a str,
    rating: String,
    review: &'a str,
}

/// Escapes a URL for a double-quoted attribute value.
fn escape_href(url: &str) -> String {
    let mut out = String::with_capacity(url.len());
    for c in url.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Renders one card per recommendation, using `default_image` for entries without a picture.
pub fn render_cards(entries: &[RecommendationEntry], default_image: &str) -> Result<String> {
    let cards: Vec<CardView<'_>> = entries
        .iter()
        .map(|entry| CardView {
            image: entry.image_or(default_image),
            name: &entry.name,
            href: escape_href(&entry.url),
            cuisine: &entry.cuisine,
            rating: format_rating(entry.rating),
            review: entry.review.as_deref().unwrap_or(""),
        })
        .collect();

    let mut context = Context::new();
    context.insert("cards", &cards);
    let rendered = Tera::one_off(CARDS_TEMPLATE, &context, true).map_err(|e| {
        anyhow!(MakanError::Template { source: e }).context("Failed to render recommendation cards")
    })?;
    debug!("Rendered {} recommendation card(s)", cards.len());
    Ok(rendered)
}
