//! Two-phase question parsing.
//!
//! Phase 1 is `segment::extract_question_blocks` (no model involved).
//! Phase 2 asks a `TextGenerator` to tidy one block at a time; any failure
//! falls back to the raw block text. When phase 1 finds nothing, the whole
//! paper goes to the generator in a single call.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::pyq::salvage::{extract_json_array, extract_json_object, strip_code_fences};
use crate::pyq::segment::{clean_extracted_text, extract_question_blocks, QuestionBlock};

pub const FALLBACK_CONFIDENCE: f64 = 0.6;

/// Opaque prompt → text generation.
#[async_trait::async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
    fn name(&self) -> &'static str;
}

/// Always fails, so every block keeps its raw text.
pub struct DisabledGenerator;

#[async_trait::async_trait]
impl TextGenerator for DisabledGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String> {
        Err(anyhow!("text generation disabled"))
    }
    fn name(&self) -> &'static str {
        "disabled"
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParsedQuestion {
    pub q_number: Option<String>,
    pub sub_part: Option<String>,
    pub question_text: String,
    pub marks: Option<u8>,
    pub topic_guess: String,
    pub module_number: Option<u8>,
    pub confidence: f64,
    pub appeared_in: String,
}

impl Default for ParsedQuestion {
    fn default() -> Self {
        Self {
            q_number: None,
            sub_part: None,
            question_text: String::new(),
            marks: None,
            topic_guess: String::new(),
            module_number: None,
            confidence: FALLBACK_CONFIDENCE,
            appeared_in: String::new(),
        }
    }
}

impl ParsedQuestion {
    fn raw(block: &QuestionBlock, appeared_in: &str) -> Self {
        Self {
            q_number: Some(block.q_number.clone()),
            sub_part: block.sub_part.clone(),
            question_text: block.raw_text.clone(),
            marks: Some(block.marks),
            appeared_in: appeared_in.to_string(),
            ..Self::default()
        }
    }
}

fn block_prompt(block: &QuestionBlock, subject: &str, exam_info: &str) -> String {
    format!(
        "Normalize one exam sub-question. Do not change marks or merge questions. \
         Return only a JSON object with keys question_text, topic_guess, module_number (1-6 or null), confidence (0-1).\n\
         q_number: {}\nsub_part: {}\nsubject: {}\nexam_info: {}\n\nRAW SUB-QUESTION TEXT:\n{}",
        block.q_number,
        block.sub_part.as_deref().unwrap_or(""),
        subject,
        if exam_info.is_empty() { "Not specified" } else { exam_info },
        block.raw_text
    )
}

fn paper_prompt(text: &str, subject: &str, exam_info: &str) -> String {
    format!(
        "Extract every question from this exam paper. Ignore instructions, headers and page numbers. \
         Both sides of an OR are separate questions. Return only a JSON array of objects with keys \
         question_text, marks, topic_guess, module_number, confidence.\n\
         SUBJECT: {}\nEXAM INFO: {}\n\nEXTRACTED TEXT:\n{}",
        subject,
        if exam_info.is_empty() { "Not specified" } else { exam_info },
        text
    )
}

/// Non-negative integer from a JSON number (`10`, `10.0`) or numeric string (`"10"`).
fn lenient_u64(v: Option<&Value>) -> Option<u64> {
    match v? {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= 0.0)
                .map(|f| f as u64)
        }),
        Value::String(s) => s.trim().parse::<f64>().ok().and_then(|f| {
            (f.fract() == 0.0 && f >= 0.0).then_some(f as u64)
        }),
        _ => None,
    }
}

fn lenient_f64(v: Option<&Value>) -> Option<f64> {
    let f = match v? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    f.filter(|f| f.is_finite())
}

fn lenient_str(v: Option<&Value>) -> Option<String> {
    match v? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn module_number(v: Option<&Value>) -> Option<u8> {
    lenient_u64(v)
        .filter(|n| (1..=6).contains(n))
        .map(|n| n as u8)
}

/// One element of a whole-paper reply. Bad or missing fields fall back to defaults;
/// only an element without question text is rejected.
fn question_from_value(v: &Value, appeared_in: &str) -> Option<ParsedQuestion> {
    let obj = v.as_object()?;
    let question_text = lenient_str(obj.get("question_text"))?;
    Some(ParsedQuestion {
        q_number: lenient_str(obj.get("q_number")),
        sub_part: lenient_str(obj.get("sub_part")).map(|s| s.to_lowercase()),
        question_text,
        marks: lenient_u64(obj.get("marks")).and_then(|m| u8::try_from(m).ok()),
        topic_guess: lenient_str(obj.get("topic_guess")).unwrap_or_default(),
        module_number: module_number(obj.get("module_number")),
        confidence: lenient_f64(obj.get("confidence")).unwrap_or(FALLBACK_CONFIDENCE),
        appeared_in: appeared_in.to_string(),
    })
}

/// Apply a normalization object to a raw block; missing keys keep the raw values.
fn merge_normalized(block: &QuestionBlock, appeared_in: &str, norm: &serde_json::Map<String, Value>) -> ParsedQuestion {
    let mut q = ParsedQuestion::raw(block, appeared_in);
    if let Some(t) = norm.get("question_text").and_then(Value::as_str) {
        if !t.trim().is_empty() {
            q.question_text = t.trim().to_string();
        }
    }
    if let Some(t) = norm.get("topic_guess").and_then(Value::as_str) {
        q.topic_guess = t.trim().to_string();
    }
    q.module_number = module_number(norm.get("module_number"));
    if let Some(c) = lenient_f64(norm.get("confidence")) {
        q.confidence = c;
    }
    q
}

async fn normalize_block(
    generator: &dyn TextGenerator,
    block: &QuestionBlock,
    subject: &str,
    exam_info: &str,
) -> Result<serde_json::Map<String, Value>> {
    let out = generator
        .generate(&block_prompt(block, subject, exam_info))
        .await?;
    let body = strip_code_fences(&out);
    if body.is_empty() {
        return Err(anyhow!("empty generator response"));
    }
    extract_json_object(body).ok_or_else(|| anyhow!("no JSON object in generator output"))
}

/// Single whole-paper call used when segmentation finds no blocks.
async fn parse_whole_paper(
    generator: &dyn TextGenerator,
    text: &str,
    subject: &str,
    exam_info: &str,
) -> Vec<ParsedQuestion> {
    let out = match generator.generate(&paper_prompt(text, subject, exam_info)).await {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(target: "pyq", error = %e, generator = generator.name(), "whole-paper extraction failed");
            return Vec::new();
        }
    };
    let items = extract_json_array(strip_code_fences(&out));
    let total = items.len();
    let questions: Vec<ParsedQuestion> = items
        .iter()
        .filter_map(|v| question_from_value(v, exam_info))
        .collect();
    if questions.len() < total {
        tracing::warn!(
            target: "pyq",
            dropped = total - questions.len(),
            "whole-paper items without question text skipped"
        );
    }
    questions
}

/// Turn raw paper text into structured questions.
pub async fn parse_pyq_text(
    generator: &dyn TextGenerator,
    text: &str,
    subject: &str,
    exam_info: &str,
) -> Vec<ParsedQuestion> {
    let text = clean_extracted_text(text);
    let blocks = extract_question_blocks(&text);

    if blocks.is_empty() {
        tracing::warn!(target: "pyq", "no question blocks found; falling back to a single generation call");
        return parse_whole_paper(generator, &text, subject, exam_info).await;
    }

    let mut results = Vec::with_capacity(blocks.len());
    for block in &blocks {
        let q = match normalize_block(generator, block, subject, exam_info).await {
            Ok(norm) => merge_normalized(block, exam_info, &norm),
            Err(e) => {
                tracing::warn!(
                    target: "pyq",
                    q_number = %block.q_number,
                    sub_part = block.sub_part.as_deref().unwrap_or(""),
                    error = %e,
                    "normalization failed; keeping raw text"
                );
                ParsedQuestion::raw(block, exam_info)
            }
        };
        results.push(q);
    }

    tracing::info!(target: "pyq", count = results.len(), "parsed questions (two-phase)");
    results
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(&'static str);

    #[async_trait::async_trait]
    impl TextGenerator for Fixed {
        async fn generate(&self, _prompt: &str) -> Result<String> {
            Ok(self.0.to_string())
        }
        fn name(&self) -> &'static str {
            "fixed"
        }
    }

    const PAPER: &str = "Q.1 Explain the concept of virtual memory and demand paging.";

    #[tokio::test]
    async fn disabled_generator_keeps_raw_blocks() {
        let out = parse_pyq_text(&DisabledGenerator, PAPER, "OS", "Dec 2022").await;
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].question_text, "Explain the concept of virtual memory and demand paging.");
        assert_eq!(out[0].marks, Some(10));
        assert_eq!(out[0].confidence, FALLBACK_CONFIDENCE);
        assert_eq!(out[0].appeared_in, "Dec 2022");
    }

    #[tokio::test]
    async fn normalization_overrides_text_but_not_marks() {
        let gen = Fixed(
            "```json\n{\"question_text\":\"Explain virtual memory.\",\"topic_guess\":\"Memory\",\"module_number\":4,\"confidence\":0.9,\"marks\":2}\n```",
        );
        let out = parse_pyq_text(&gen, PAPER, "OS", "").await;
        assert_eq!(out[0].question_text, "Explain virtual memory.");
        assert_eq!(out[0].topic_guess, "Memory");
        assert_eq!(out[0].module_number, Some(4));
        assert_eq!(out[0].marks, Some(10));
        assert!((out[0].confidence - 0.9).abs() < 1e-9);
    }

    #[tokio::test]
    async fn whole_paper_fields_decode_leniently() {
        let gen = Fixed(
            r#"[{"question_text":"Define kernel.","marks":2,"confidence":null},
                {"question_text":"Explain paging.","marks":10.0,"module_number":"4"},
                {"question_text":"Explain IPC.","module_number":9,"marks":"5","confidence":"0.8"},
                {"question_text":"Compare RAID levels.","marks":2.5},
                {"marks":10}]"#,
        );
        let out = parse_pyq_text(&gen, "no markers at all here", "OS", "Dec 2022").await;
        assert_eq!(out.len(), 4);

        assert_eq!(out[0].marks, Some(2));
        assert_eq!(out[0].confidence, FALLBACK_CONFIDENCE);
        assert_eq!(out[1].marks, Some(10));
        assert_eq!(out[1].module_number, Some(4));
        assert_eq!(out[2].module_number, None);
        assert_eq!(out[2].marks, Some(5));
        assert!((out[2].confidence - 0.8).abs() < 1e-9);
        assert_eq!(out[3].marks, None);
        assert!(out.iter().all(|q| q.appeared_in == "Dec 2022"));
    }

    #[tokio::test]
    async fn no_blocks_uses_whole_paper_call() {
        let gen = Fixed(r#"[{"question_text":"Define kernel.","marks":2},{"question_text":""}]"#);
        let out = parse_pyq_text(&gen, "scanned page with no markers", "OS", "May 2023").await;
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].question_text, "Define kernel.");
        assert_eq!(out[0].marks, Some(2));
        assert_eq!(out[0].appeared_in, "May 2023");
    }
}
