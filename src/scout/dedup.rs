// src/scout/dedup.rs
use std::collections::HashMap;

use crate::scout::types::VideoCandidate;

/// Merge candidates keyed by `external_id`.
///
/// On collision the entry with strictly greater `engagement_score` wins; ties keep
/// the first-seen entry. Keys keep their first-seen position in the output.
/// Returns (merged, duplicates_removed).
pub fn dedup_by_video_id(candidates: Vec<VideoCandidate>) -> (Vec<VideoCandidate>, usize) {
    let mut slot_of: HashMap<String, usize> = HashMap::with_capacity(candidates.len());
    let mut merged: Vec<VideoCandidate> = Vec::with_capacity(candidates.len());
    let mut removed = 0usize;

    for cand in candidates {
        match slot_of.get(&cand.external_id) {
            Some(&slot) => {
                removed += 1;
                if cand.engagement_score > merged[slot].engagement_score {
                    merged[slot] = cand;
                }
            }
            None => {
                slot_of.insert(cand.external_id.clone(), merged.len());
                merged.push(cand);
            }
        }
    }

    (merged, removed)
}
