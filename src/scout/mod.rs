// src/scout/mod.rs
//! Video scouting pipeline: fetch → dedup → score → rank → cache.

pub mod dedup;
pub mod error;
pub mod fetch;
pub mod providers;
pub mod rank;
pub mod relevance;
pub mod types;
pub mod whitelist;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use once_cell::sync::OnceCell;
use std::collections::HashSet;
use std::sync::Arc;

use crate::cache::{videos_key, ResultCache, CACHE_TTL_SECS};
use crate::scout::error::{ScoutError, SourceKind};
use crate::scout::fetch::{fetch_all, FetchOutcome, VideoSource};
use crate::scout::types::{RankedPayload, ScoutResponse};
use crate::scout::whitelist::{active_channel_ids, WhitelistSource};

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("scout_requests_total", "Ranking requests received.");
        describe_counter!("scout_cache_hits_total", "Requests served from cache.");
        describe_counter!("scout_cache_misses_total", "Requests that ran the pipeline.");
        describe_counter!(
            "scout_candidates_total",
            "Candidates normalized from search results."
        );
        describe_counter!("scout_dedup_total", "Candidates removed as duplicate video ids.");
        describe_counter!("scout_source_errors_total", "Failed search calls.");
        describe_histogram!("scout_rank_ms", "Pipeline time after fetch, in milliseconds.");
        describe_histogram!("scout_fetch_ms", "Search + statistics call time in milliseconds.");
        describe_gauge!("scout_cache_ttl_secs", "Absolute TTL of cached rankings.");
        gauge!("scout_cache_ttl_secs").set(CACHE_TTL_SECS as f64);
    });
}

#[derive(Debug, Clone, Copy)]
pub struct ScoutCaps {
    pub per_channel: usize,
    pub global: usize,
}

impl Default for ScoutCaps {
    fn default() -> Self {
        Self {
            per_channel: fetch::MAX_PER_CHANNEL,
            global: fetch::MAX_GLOBAL,
        }
    }
}

/// Owns the collaborators for ranking requests. Construct once and share.
#[derive(Clone)]
pub struct VideoScout {
    source: Arc<dyn VideoSource>,
    whitelist: Arc<dyn WhitelistSource>,
    cache: Arc<ResultCache>,
    caps: ScoutCaps,
}

impl VideoScout {
    pub fn new(
        source: Arc<dyn VideoSource>,
        whitelist: Arc<dyn WhitelistSource>,
        cache: Arc<ResultCache>,
        caps: ScoutCaps,
    ) -> Self {
        Self {
            source,
            whitelist,
            cache,
            caps,
        }
    }

    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    /// Ranked videos for a topic, served from cache when fresh.
    pub async fn videos_for_topic(
        &self,
        topic_id: &str,
        limit: usize,
    ) -> Result<ScoutResponse, ScoutError> {
        ensure_metrics_described();
        counter!("scout_requests_total").increment(1);

        let topic_id = topic_id.trim();
        if topic_id.is_empty() {
            return Err(ScoutError::InvalidRequest("topic_id must not be empty".into()));
        }
        if limit == 0 {
            return Err(ScoutError::InvalidRequest("limit must be at least 1".into()));
        }

        let key = videos_key(topic_id);
        if let Some(payload) = self.cached_payload(&key) {
            counter!("scout_cache_hits_total").increment(1);
            tracing::debug!(target: "scout", topic = topic_id, "cache hit");
            return Ok(ScoutResponse {
                cached: true,
                payload,
            });
        }
        counter!("scout_cache_misses_total").increment(1);

        let (payload, degraded) = self.run_pipeline(topic_id, limit).await;

        // Degraded runs are returned but not memoized, so the next request refetches.
        if !degraded {
            match serde_json::to_value(&payload) {
                Ok(v) => self.cache.set(&key, v),
                Err(e) => tracing::warn!(target: "scout", error = %e, "cache encode failed"),
            }
        }

        Ok(ScoutResponse {
            cached: false,
            payload,
        })
    }

    /// Stored payload for `key`; entries that no longer decode are evicted and treated as a miss.
    fn cached_payload(&self, key: &str) -> Option<RankedPayload> {
        let raw = self.cache.get(key)?;
        match serde_json::from_value::<RankedPayload>(raw) {
            Ok(p) => Some(p),
            Err(e) => {
                tracing::warn!(target: "scout", key, error = %e, "discarding corrupt cache entry");
                self.cache.remove(key);
                None
            }
        }
    }

    /// Fetch + rank without touching the cache. Returns (payload, degraded).
    pub async fn run_pipeline(&self, topic_id: &str, limit: usize) -> (RankedPayload, bool) {
        let (channel_ids, whitelist_failed) = match self.whitelist.entries().await {
            Ok(entries) => (active_channel_ids(&entries), false),
            Err(e) => {
                let err = ScoutError::source_unavailable(SourceKind::Whitelist, None, e);
                tracing::warn!(target: "scout", error = %err, "whitelist unavailable; continuing without it");
                counter!("scout_source_errors_total", "branch" => "whitelist").increment(1);
                (Vec::new(), true)
            }
        };

        let FetchOutcome {
            candidates,
            failures,
        } = fetch_all(
            self.source.as_ref(),
            topic_id,
            &channel_ids,
            self.caps.per_channel,
            self.caps.global,
        )
        .await;

        let t0 = std::time::Instant::now();
        let fetched = candidates.len();
        let (mut merged, removed) = dedup::dedup_by_video_id(candidates);
        counter!("scout_dedup_total").increment(removed as u64);

        relevance::score_candidates(topic_id, &mut merged);

        let trusted: HashSet<String> = channel_ids.iter().cloned().collect();
        let videos = rank::rank_candidates(merged, &trusted, limit);
        histogram!("scout_rank_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);

        tracing::info!(
            target: "scout",
            topic = topic_id,
            channels = channel_ids.len(),
            fetched,
            duplicates = removed,
            returned = videos.len(),
            failures = failures.len(),
            "ranking run finished"
        );

        let payload = RankedPayload {
            topic_id: topic_id.to_string(),
            total_channels_considered: channel_ids.len(),
            videos_found: videos.len(),
            videos,
        };
        (payload, whitelist_failed || !failures.is_empty())
    }
}
