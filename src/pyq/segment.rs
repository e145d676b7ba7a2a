//! Deterministic segmentation of past-year-question paper text.
//!
//! Papers look like `Q.1 ... a) ... b) ... OR ... Q.2 ...`. Each `Q.<n>` body is
//! split on the word `OR`, then on `a)`..`f)` sub-markers at line starts.
//! Fragments that are too short to be a question are dropped.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Minimum trimmed length of a question with no sub-parts.
pub const MIN_WHOLE_LEN: usize = 30;
/// Minimum trimmed length of a single sub-part.
pub const MIN_SUB_LEN: usize = 20;

static RE_MAIN_Q: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)Q\.\s*\d+").unwrap());
static RE_OR: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bOR\b").unwrap());
static RE_SUB: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\n\s*([a-f])\)").unwrap());
static RE_HSPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]+").unwrap());

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionBlock {
    pub q_number: String,
    pub sub_part: Option<String>,
    pub raw_text: String,
    pub marks: u8,
}

/// Drop OCR noise lines (trimmed length ≤ 1). Everything else is kept verbatim.
pub fn clean_extracted_text(text: &str) -> String {
    text.lines()
        .filter(|line| line.trim().chars().count() > 1)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Marks from wording: definitions 2, explanations 10, otherwise by length.
pub fn infer_marks(text: &str) -> u8 {
    let lower = text.to_lowercase();
    if lower.contains("define") || lower.contains("what is") {
        return 2;
    }
    if lower.contains("explain") || lower.contains("describe") {
        return 10;
    }
    if text.chars().count() < 120 {
        return 5;
    }
    10
}

/// Split `text` at every match of `re`; yields (captured delimiter, following segment).
/// Text before the first match is returned separately.
fn split_keeping<'t>(re: &Regex, group: usize, text: &'t str) -> (&'t str, Vec<(&'t str, &'t str)>) {
    let caps: Vec<_> = re.captures_iter(text).collect();
    if caps.is_empty() {
        return (text, Vec::new());
    }
    let mut out = Vec::with_capacity(caps.len());
    let lead_end = caps[0].get(0).map(|m| m.start()).unwrap_or(0);
    for (i, c) in caps.iter().enumerate() {
        let (whole, delim) = match (c.get(0), c.get(group)) {
            (Some(w), Some(d)) => (w, d.as_str()),
            _ => continue,
        };
        let end = caps
            .get(i + 1)
            .and_then(|n| n.get(0))
            .map(|m| m.start())
            .unwrap_or(text.len());
        out.push((delim, &text[whole.end()..end]));
    }
    (&text[..lead_end], out)
}

pub fn extract_question_blocks(text: &str) -> Vec<QuestionBlock> {
    let mut blocks = Vec::new();
    if text.is_empty() {
        return blocks;
    }

    let text = text.replace('\r', "");
    let text = RE_HSPACE.replace_all(&text, " ");

    // Header text before Q.1 is ignored.
    let (_header, questions) = split_keeping(&RE_MAIN_Q, 0, &text);

    for (marker, body) in questions {
        let q_number = marker.trim().to_string();

        for alternative in RE_OR.split(body) {
            let (lead, subs) = split_keeping(&RE_SUB, 1, alternative);

            if subs.is_empty() {
                let raw = lead.trim();
                if raw.chars().count() < MIN_WHOLE_LEN {
                    continue;
                }
                blocks.push(QuestionBlock {
                    q_number: q_number.clone(),
                    sub_part: None,
                    raw_text: raw.to_string(),
                    marks: infer_marks(raw),
                });
                continue;
            }

            // With sub-parts present, text before `a)` is instructions.
            for (letter, sub_text) in subs {
                let raw = sub_text.trim();
                if raw.chars().count() < MIN_SUB_LEN {
                    continue;
                }
                blocks.push(QuestionBlock {
                    q_number: q_number.clone(),
                    sub_part: Some(letter.to_lowercase()),
                    raw_text: raw.to_string(),
                    marks: infer_marks(raw),
                });
            }
        }
    }

    blocks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noise_lines_are_removed() {
        let out = clean_extracted_text("Q.1 Explain paging\n|\n \n.\nDefine TLB");
        assert_eq!(out, "Q.1 Explain paging\nDefine TLB");
    }

    #[test]
    fn marks_from_wording_then_length() {
        assert_eq!(infer_marks("Define deadlock."), 2);
        assert_eq!(infer_marks("What is a semaphore?"), 2);
        assert_eq!(infer_marks("Explain demand paging with a diagram."), 10);
        assert_eq!(infer_marks("Compare FCFS and SJF scheduling."), 5);
        assert_eq!(infer_marks(&"Compare ".repeat(20)), 10);
    }

    #[test]
    fn whole_question_without_sub_parts() {
        let text = "University of Mumbai\nQ.1 Discuss the various page replacement algorithms in detail.";
        let blocks = extract_question_blocks(text);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].q_number, "Q.1");
        assert_eq!(blocks[0].sub_part, None);
        assert!(blocks[0].raw_text.starts_with("Discuss"));
    }

    #[test]
    fn sub_parts_and_or_alternatives() {
        let text = "Q.2 Attempt any two\n\
                    a) Explain the process state diagram clearly.\n\
                    B) Define critical section problem and its needs.\n\
                    OR\n\
                    c) Describe the banker's algorithm with example.\n\
                    Q.3 short";
        let blocks = extract_question_blocks(text);
        let subs: Vec<_> = blocks.iter().map(|b| b.sub_part.clone().unwrap()).collect();
        assert_eq!(subs, vec!["a", "b", "c"]);
        assert!(blocks.iter().all(|b| b.q_number == "Q.2"));
        assert_eq!(blocks[1].marks, 2);
        assert_eq!(blocks[2].marks, 10);
    }

    #[test]
    fn short_fragments_are_dropped() {
        let text = "Q.1\na) too short\nb) This one is long enough to keep.";
        let blocks = extract_question_blocks(text);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].sub_part.as_deref(), Some("b"));
    }

    #[test]
    fn no_markers_no_blocks() {
        assert!(extract_question_blocks("").is_empty());
        assert!(extract_question_blocks("just some header text with no questions").is_empty());
    }
}
