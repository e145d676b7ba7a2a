//! Survival study plan: take questions in ranked order and pack them into an
//! hour budget by estimated study time per marks value.

use serde::Serialize;

use crate::pyq::frequency::QuestionStats;

/// A question appearing at least this often counts as high-frequency.
pub const HIGH_FREQ_MIN_APPEARANCES: usize = 2;

/// Estimated study hours for a question worth `marks`. Unknown values have no estimate.
pub fn hours_for_marks(marks: u8) -> Option<f64> {
    match marks {
        10 => Some(0.75),
        5 => Some(0.4),
        2 => Some(0.15),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlannedQuestion {
    #[serde(flatten)]
    pub question: QuestionStats,
    pub estimated_hours: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudyPlan {
    pub total_questions: usize,
    /// Sum of `estimated_hours`, rounded to two decimals.
    pub estimated_hours: f64,
    pub hours_available: f64,
    /// Questions passed over because their marks have no time estimate.
    pub skipped_unknown_marks: usize,
    /// Share (0..=1) of all recorded appearances covered by the selected questions.
    pub appearance_coverage: f64,
    pub questions: Vec<PlannedQuestion>,
}

/// Greedy fill in `ranked` order. Stops at the first question that would
/// overflow the budget; questions with unknown marks are skipped, not fatal.
pub fn study_plan(ranked: &[QuestionStats], hours_available: f64) -> StudyPlan {
    // NaN and negative budgets plan nothing.
    let budget = hours_available.max(0.0);

    let mut questions = Vec::new();
    let mut total = 0.0_f64;
    let mut skipped = 0usize;

    for q in ranked {
        let Some(hours) = q.marks.and_then(hours_for_marks) else {
            tracing::debug!(target: "pyq", marks = ?q.marks, hash = %q.normalized_hash, "no time estimate for marks");
            skipped += 1;
            continue;
        };
        if total + hours > budget {
            break;
        }
        total += hours;
        questions.push(PlannedQuestion {
            question: q.clone(),
            estimated_hours: hours,
        });
    }

    let all: usize = ranked.iter().map(|q| q.appearance_count).sum();
    let covered: usize = questions.iter().map(|p| p.question.appearance_count).sum();
    let appearance_coverage = if all == 0 {
        0.0
    } else {
        covered as f64 / all as f64
    };

    StudyPlan {
        total_questions: questions.len(),
        estimated_hours: (total * 100.0).round() / 100.0,
        hours_available: budget,
        skipped_unknown_marks: skipped,
        appearance_coverage,
        questions,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubjectStats {
    pub total_questions: usize,
    pub high_freq_questions: usize,
    /// Percentage (0..=100), rounded to one decimal.
    pub high_freq_percentage: f64,
}

pub fn subject_stats(stats: &[QuestionStats]) -> SubjectStats {
    let total = stats.len();
    let high = stats
        .iter()
        .filter(|q| q.appearance_count >= HIGH_FREQ_MIN_APPEARANCES)
        .count();
    let pct = if total == 0 {
        0.0
    } else {
        ((high as f64 / total as f64) * 1_000.0).round() / 10.0
    };
    SubjectStats {
        total_questions: total,
        high_freq_questions: high,
        high_freq_percentage: pct,
    }
}
