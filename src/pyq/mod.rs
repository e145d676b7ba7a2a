//! Past-year-question (PYQ) processing: segmentation of raw paper text,
//! optional model-assisted normalization, cross-paper frequency counts, and
//! hour-budgeted study plans.

pub mod frequency;
pub mod parse;
pub mod plan;
pub mod salvage;
pub mod segment;

pub use frequency::{question_hash, QuestionFrequency, QuestionStats};
pub use plan::{hours_for_marks, study_plan, StudyPlan, SubjectStats};
pub use parse::{parse_pyq_text, DisabledGenerator, ParsedQuestion, TextGenerator};
pub use segment::{clean_extracted_text, extract_question_blocks, infer_marks, QuestionBlock};
