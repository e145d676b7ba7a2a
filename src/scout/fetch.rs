// src/scout/fetch.rs
//! Candidate fetching. Both branches (per whitelisted channel, and global with
//! exclusions) go through the single `fetch_scoped` operation so field mapping
//! cannot drift between them.

use anyhow::Result;
use metrics::counter;
use std::collections::HashSet;

use crate::scout::error::{ScoutError, SourceKind};
use crate::scout::types::{ChannelScope, SearchHit, VideoCandidate};

pub const MAX_PER_CHANNEL: usize = 3;
pub const MAX_GLOBAL: usize = 17;

#[async_trait::async_trait]
pub trait VideoSource: Send + Sync {
    /// One search call. Implementations must bound the call with a timeout.
    async fn search(
        &self,
        query: &str,
        scope: &ChannelScope,
        max_results: usize,
    ) -> Result<Vec<SearchHit>>;

    fn name(&self) -> &'static str;
}

/// Candidates gathered by one fetch run plus the failures that were isolated.
#[derive(Debug, Default)]
pub struct FetchOutcome {
    pub candidates: Vec<VideoCandidate>,
    pub failures: Vec<ScoutError>,
}

impl FetchOutcome {
    pub fn is_degraded(&self) -> bool {
        !self.failures.is_empty()
    }

    fn absorb(&mut self, other: FetchOutcome) {
        self.candidates.extend(other.candidates);
        self.failures.extend(other.failures);
    }
}

/// Unified fetch: one scope, capped, normalized, with excluded channels removed.
pub async fn fetch_scoped(
    source: &dyn VideoSource,
    query: &str,
    scope: &ChannelScope,
    max_results: usize,
) -> std::result::Result<Vec<VideoCandidate>, ScoutError> {
    let kind = match scope {
        ChannelScope::Channel(_) => SourceKind::Channel,
        ChannelScope::Global { .. } => SourceKind::Global,
    };

    let hits = source
        .search(query, scope, max_results)
        .await
        .map_err(|e| ScoutError::source_unavailable(kind, scope.channel_id(), e))?;

    let out: Vec<VideoCandidate> = hits
        .into_iter()
        .filter(|h| !scope.excludes(&h.channel_id))
        .take(max_results)
        .map(normalize_hit)
        .map(VideoCandidate::from_hit)
        .collect();

    counter!("scout_candidates_total", "branch" => kind.to_string()).increment(out.len() as u64);
    Ok(out)
}

/// Per-channel fetch over every whitelisted channel. One channel failing does not abort the rest.
pub async fn fetch_whitelisted(
    source: &dyn VideoSource,
    query: &str,
    channel_ids: &[String],
    per_channel_cap: usize,
) -> FetchOutcome {
    let mut outcome = FetchOutcome::default();
    for id in channel_ids {
        let scope = ChannelScope::Channel(id.clone());
        match fetch_scoped(source, query, &scope, per_channel_cap).await {
            Ok(v) => outcome.candidates.extend(v),
            Err(e) => {
                tracing::warn!(
                    target: "scout",
                    error = %e,
                    provider = source.name(),
                    channel_id = %id,
                    "channel fetch failed"
                );
                counter!("scout_source_errors_total", "branch" => "channel").increment(1);
                outcome.failures.push(e);
            }
        }
    }
    outcome
}

/// Global fetch excluding whitelisted channels. A failure drops only this branch.
pub async fn fetch_global(
    source: &dyn VideoSource,
    query: &str,
    exclude: &HashSet<String>,
    global_cap: usize,
) -> FetchOutcome {
    let scope = ChannelScope::Global {
        exclude: exclude.clone(),
    };
    match fetch_scoped(source, query, &scope, global_cap).await {
        Ok(candidates) => FetchOutcome {
            candidates,
            failures: Vec::new(),
        },
        Err(e) => {
            tracing::warn!(
                target: "scout",
                error = %e,
                provider = source.name(),
                "global fetch failed"
            );
            counter!("scout_source_errors_total", "branch" => "global").increment(1);
            FetchOutcome {
                candidates: Vec::new(),
                failures: vec![e],
            }
        }
    }
}

/// Run both branches. Whitelisted candidates come first in the returned list.
pub async fn fetch_all(
    source: &dyn VideoSource,
    query: &str,
    channel_ids: &[String],
    per_channel_cap: usize,
    global_cap: usize,
) -> FetchOutcome {
    let exclude: HashSet<String> = channel_ids.iter().cloned().collect();
    let (mut whitelisted, global) = tokio::join!(
        fetch_whitelisted(source, query, channel_ids, per_channel_cap),
        fetch_global(source, query, &exclude, global_cap),
    );
    whitelisted.absorb(global);
    whitelisted
}

/// Decode HTML entities the search API leaves in text fields and trim them.
fn normalize_hit(mut hit: SearchHit) -> SearchHit {
    hit.title = html_escape::decode_html_entities(hit.title.trim()).to_string();
    hit.description = html_escape::decode_html_entities(hit.description.trim()).to_string();
    hit.channel_name = html_escape::decode_html_entities(hit.channel_name.trim()).to_string();
    hit
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Canned(Vec<SearchHit>);

    #[async_trait::async_trait]
    impl VideoSource for Canned {
        async fn search(
            &self,
            _query: &str,
            _scope: &ChannelScope,
            _max_results: usize,
        ) -> Result<Vec<SearchHit>> {
            Ok(self.0.clone())
        }
        fn name(&self) -> &'static str {
            "canned"
        }
    }

    fn hit(id: &str, channel: &str) -> SearchHit {
        SearchHit {
            title: "Deadlocks &amp; OS".into(),
            channel_id: channel.into(),
            source_url: format!("https://www.youtube.com/watch?v={id}"),
            views: 10,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn global_scope_drops_excluded_channels() {
        let src = Canned(vec![hit("a", "wl"), hit("b", "other"), hit("c", "wl")]);
        let scope = ChannelScope::Global {
            exclude: ["wl".to_string()].into_iter().collect(),
        };
        let out = fetch_scoped(&src, "os", &scope, 17).await.unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].external_id, "b");
        assert_eq!(out[0].title, "Deadlocks & OS");
    }

    #[tokio::test]
    async fn results_never_exceed_cap() {
        let src = Canned((0..8).map(|i| hit(&i.to_string(), "c1")).collect());
        let out = fetch_scoped(&src, "os", &ChannelScope::Channel("c1".into()), 3)
            .await
            .unwrap();
        assert_eq!(out.len(), 3);
    }
}
