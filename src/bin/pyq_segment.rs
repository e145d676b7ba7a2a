//! Segment an extracted PYQ paper into question blocks and print them as JSON.
//! Usage: pyq-segment <text_file> <subject_name> [exam_info] [hours_available]

use anyhow::{bail, Context};
use exam_scout::pyq::{parse_pyq_text, DisabledGenerator, QuestionFrequency};
use serde_json::json;
use std::path::PathBuf;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_target(false).init();

    let mut args = std::env::args().skip(1);
    let (Some(path), Some(subject)) = (args.next(), args.next()) else {
        bail!("usage: pyq-segment <text_file> <subject_name> [exam_info] [hours_available]");
    };
    let exam_info = args.next().unwrap_or_default();
    let hours = args
        .next()
        .map(|h| h.parse::<f64>().with_context(|| format!("hours_available {h:?}")))
        .transpose()?;

    let path = PathBuf::from(path);
    let text = std::fs::read_to_string(&path)
        .with_context(|| format!("reading {}", path.display()))?;

    let questions = parse_pyq_text(&DisabledGenerator, &text, &subject, &exam_info).await;

    let mut freq = QuestionFrequency::new();
    for q in &questions {
        freq.add(q);
    }
    tracing::info!(
        parsed = questions.len(),
        unique = freq.unique_questions(),
        "segmentation done"
    );

    let out = json!({
        "questions": questions,
        "stats": freq.subject_stats(),
        "study_plan": hours.map(|h| freq.study_plan(h)),
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}
