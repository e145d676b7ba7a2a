// src/scout/relevance.rs
//! Topic relevance: a single, non-additive containment check.
//! Title hit = 1.0, else description hit = 0.5, else 0.0.

use crate::scout::types::VideoCandidate;

pub const TITLE_MATCH: f64 = 1.0;
pub const DESCRIPTION_MATCH: f64 = 0.5;
pub const NO_MATCH: f64 = 0.0;

/// Case-insensitive containment. Empty text never matches.
fn contains_topic(text: &str, topic_lower: &str) -> bool {
    !text.is_empty() && text.to_lowercase().contains(topic_lower)
}

pub fn relevance_for(topic: &str, title: &str, description: &str) -> f64 {
    let topic_lower = topic.to_lowercase();
    if contains_topic(title, &topic_lower) {
        TITLE_MATCH
    } else if contains_topic(description, &topic_lower) {
        DESCRIPTION_MATCH
    } else {
        NO_MATCH
    }
}

/// Attach `relevance_score` to every candidate. Reads only title/description.
pub fn score_candidates(topic: &str, candidates: &mut [VideoCandidate]) {
    for c in candidates.iter_mut() {
        c.relevance_score = relevance_for(topic, &c.title, &c.description);
    }
}
