//! Question frequency: collapse repeated questions across papers by a hash of
//! their normalized text and count how often (and when) each one appeared.

use chrono::Datelike;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::{BTreeSet, HashMap};

use crate::pyq::parse::ParsedQuestion;
use crate::pyq::plan::{self, StudyPlan, SubjectStats};

static RE_PUNCT: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s]").unwrap());
static RE_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static RE_YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(19|20)\d{2}\b").unwrap());

/// Lowercase, strip punctuation, collapse whitespace.
pub fn normalize_question_text(text: &str) -> String {
    let lower = text.to_lowercase();
    let stripped = RE_PUNCT.replace_all(&lower, "");
    RE_WS.replace_all(&stripped, " ").trim().to_string()
}

/// SHA-256 (hex) of the normalized text.
pub fn question_hash(text: &str) -> String {
    let digest = Sha256::digest(normalize_question_text(text).as_bytes());
    let mut out = String::with_capacity(64);
    for b in digest.iter() {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

/// Most recent 19xx/20xx year mentioned (exam year beats scheme year), else `fallback`.
pub fn extract_year(appeared_in: &str, fallback: i32) -> i32 {
    RE_YEAR
        .find_iter(appeared_in)
        .filter_map(|m| m.as_str().parse::<i32>().ok())
        .max()
        .unwrap_or(fallback)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestionStats {
    pub normalized_hash: String,
    /// Text of the first appearance.
    pub question_text: String,
    pub marks: Option<u8>,
    pub appearance_count: usize,
    pub years: BTreeSet<i32>,
    pub last_appeared_year: i32,
    /// Highest parse confidence seen, clamped to [0, 1].
    pub confidence: f64,
}

#[derive(Debug, Default)]
pub struct QuestionFrequency {
    by_hash: HashMap<String, usize>,
    stats: Vec<QuestionStats>,
    skipped_empty: usize,
}

impl QuestionFrequency {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one appearance, defaulting the year to the current one.
    pub fn add(&mut self, q: &ParsedQuestion) {
        self.add_with_fallback_year(q, chrono::Utc::now().year());
    }

    pub fn add_with_fallback_year(&mut self, q: &ParsedQuestion, fallback_year: i32) {
        let text = q.question_text.trim();
        if text.is_empty() {
            self.skipped_empty += 1;
            return;
        }
        let hash = question_hash(text);
        let year = extract_year(&q.appeared_in, fallback_year);
        let confidence = q.confidence.clamp(0.0, 1.0);

        match self.by_hash.get(&hash) {
            Some(&i) => {
                let s = &mut self.stats[i];
                s.appearance_count += 1;
                s.years.insert(year);
                s.last_appeared_year = s.last_appeared_year.max(year);
                s.confidence = s.confidence.max(confidence);
                if s.marks.is_none() {
                    s.marks = q.marks;
                }
            }
            None => {
                self.by_hash.insert(hash.clone(), self.stats.len());
                self.stats.push(QuestionStats {
                    normalized_hash: hash,
                    question_text: text.to_string(),
                    marks: q.marks,
                    appearance_count: 1,
                    years: BTreeSet::from([year]),
                    last_appeared_year: year,
                    confidence,
                });
            }
        }
    }

    pub fn unique_questions(&self) -> usize {
        self.stats.len()
    }

    pub fn skipped_empty(&self) -> usize {
        self.skipped_empty
    }

    /// Most frequent first, then most recent; otherwise first-seen order.
    pub fn ranked(&self) -> Vec<QuestionStats> {
        let mut out = self.stats.clone();
        out.sort_by(|a, b| {
            b.appearance_count
                .cmp(&a.appearance_count)
                .then(b.last_appeared_year.cmp(&a.last_appeared_year))
        });
        out
    }

    /// Hour-budgeted plan over `ranked()`.
    pub fn study_plan(&self, hours_available: f64) -> StudyPlan {
        plan::study_plan(&self.ranked(), hours_available)
    }

    pub fn subject_stats(&self) -> SubjectStats {
        plan::subject_stats(&self.stats)
    }
}
