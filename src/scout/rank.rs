// src/scout/rank.rs
//! Ranking: a fixed chain of multiplicative stages folded into `engagement_score`,
//! then a stable descending sort and truncation.
//!
//! Order matters: relevance adjustment runs before the trust boost, so a
//! whitelisted channel can never lift an irrelevant video out of demotion.
//! Each stage truncates toward zero.

use std::collections::HashSet;

use crate::scout::types::{RankedVideo, VideoCandidate};

pub const IRRELEVANT_FACTOR: f64 = 0.3;
pub const TRUST_BOOST: f64 = 1.25;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankStage {
    /// ×(1 + relevance) when relevant, ×0.3 otherwise.
    Relevance,
    /// ×1.25 for whitelisted channels.
    TrustBoost,
}

pub const STAGES: [RankStage; 2] = [RankStage::Relevance, RankStage::TrustBoost];

fn scale(score: u64, factor: f64) -> u64 {
    // `as` saturates and truncates toward zero.
    (score as f64 * factor) as u64
}

impl RankStage {
    fn apply(self, c: &mut VideoCandidate, whitelist: &HashSet<String>) {
        match self {
            RankStage::Relevance => {
                let factor = if c.relevance_score > 0.0 {
                    1.0 + c.relevance_score
                } else {
                    IRRELEVANT_FACTOR
                };
                c.engagement_score = scale(c.engagement_score, factor);
            }
            RankStage::TrustBoost => {
                if whitelist.contains(&c.channel_id) {
                    c.engagement_score = scale(c.engagement_score, TRUST_BOOST);
                }
            }
        }
    }
}

/// Fold `stages` into every candidate, then stable-sort descending.
pub fn apply_stages(
    candidates: &mut [VideoCandidate],
    stages: &[RankStage],
    whitelist: &HashSet<String>,
) {
    for c in candidates.iter_mut() {
        for stage in stages {
            stage.apply(c, whitelist);
        }
    }
    // `sort_by` is stable: equal scores keep their relative order.
    candidates.sort_by(|a, b| b.engagement_score.cmp(&a.engagement_score));
}

/// Full ranking run in the fixed stage order. Output carries no relevance field.
pub fn rank_candidates(
    mut candidates: Vec<VideoCandidate>,
    whitelist: &HashSet<String>,
    limit: usize,
) -> Vec<RankedVideo> {
    apply_stages(&mut candidates, &STAGES, whitelist);
    candidates.truncate(limit);
    candidates.into_iter().map(RankedVideo::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scout::types::SearchHit;

    fn cand(id: &str, channel: &str, base: u64, relevance: f64) -> VideoCandidate {
        let mut c = VideoCandidate::from_hit(SearchHit {
            channel_id: channel.into(),
            source_url: format!("https://www.youtube.com/watch?v={id}"),
            views: base,
            ..Default::default()
        });
        c.relevance_score = relevance;
        c
    }

    fn wl(ids: &[&str]) -> HashSet<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn relevance_multipliers() {
        let mut v = vec![cand("a", "x", 100, 1.0), cand("b", "x", 50, 0.5), cand("c", "x", 7, 0.0)];
        apply_stages(&mut v, &STAGES, &wl(&[]));
        let scores: Vec<u64> = v.iter().map(|c| c.engagement_score).collect();
        assert_eq!(scores, vec![200, 75, 2]);
    }

    #[test]
    fn trust_boost_applies_after_relevance() {
        let mut v = vec![cand("a", "wl", 80, 1.0)];
        apply_stages(&mut v, &STAGES, &wl(&["wl"]));
        assert_eq!(v[0].engagement_score, 200);
    }

    #[test]
    fn equal_scores_keep_input_order() {
        let out = rank_candidates(
            vec![cand("first", "x", 10, 1.0), cand("second", "y", 10, 1.0)],
            &wl(&[]),
            10,
        );
        assert_eq!(out[0].external_id, "first");
        assert_eq!(out[1].external_id, "second");
    }

    #[test]
    fn truncates_to_limit() {
        let v = (0..5).map(|i| cand(&i.to_string(), "x", i, 1.0)).collect();
        let out = rank_candidates(v, &wl(&[]), 2);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].external_id, "4");
    }
}
