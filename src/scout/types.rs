// src/scout/types.rs
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Raw search hit as delivered by a `VideoSource`.
/// Every field is optional on the wire; missing text becomes "" and missing counts become 0.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SearchHit {
    pub title: String,
    pub description: String,
    pub channel_name: String,
    pub channel_id: String,
    pub source_url: String,
    pub views: u64,
    pub comment_count: u64,
}

/// A video fetched from a source, pre-ranking.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoCandidate {
    pub external_id: String,
    pub title: String,
    pub description: String,
    pub channel_name: String,
    pub channel_id: String,
    pub source_url: String,
    pub views: u64,
    pub comment_count: u64,
    /// Accumulator: starts at `views + comment_count`, rewritten by every ranking stage.
    pub engagement_score: u64,
    /// Internal only. Never leaves the ranking engine.
    pub relevance_score: f64,
}

impl VideoCandidate {
    pub fn from_hit(hit: SearchHit) -> Self {
        let external_id = extract_video_id(&hit.source_url).to_string();
        Self {
            external_id,
            engagement_score: hit.views.saturating_add(hit.comment_count),
            title: hit.title,
            description: hit.description,
            channel_name: hit.channel_name,
            channel_id: hit.channel_id,
            source_url: hit.source_url,
            views: hit.views,
            comment_count: hit.comment_count,
            relevance_score: 0.0,
        }
    }
}

/// Video id is whatever follows the last `v=` marker; URLs without it pass through whole.
pub fn extract_video_id(url: &str) -> &str {
    match url.rsplit_once("v=") {
        Some((_, id)) => id,
        None => url,
    }
}

/// Caller-facing video record. Has no relevance field, so it cannot leak.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RankedVideo {
    pub external_id: String,
    pub title: String,
    pub description: String,
    pub channel_name: String,
    pub channel_id: String,
    pub source_url: String,
    pub views: u64,
    pub comment_count: u64,
    pub engagement_score: u64,
}

impl From<VideoCandidate> for RankedVideo {
    fn from(c: VideoCandidate) -> Self {
        Self {
            external_id: c.external_id,
            title: c.title,
            description: c.description,
            channel_name: c.channel_name,
            channel_id: c.channel_id,
            source_url: c.source_url,
            views: c.views,
            comment_count: c.comment_count,
            engagement_score: c.engagement_score,
        }
    }
}

/// Ranking result for one topic. This is the value stored in the cache.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RankedPayload {
    pub topic_id: String,
    pub total_channels_considered: usize,
    pub videos_found: usize,
    pub videos: Vec<RankedVideo>,
}

/// Payload plus the freshness flag returned to callers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScoutResponse {
    pub cached: bool,
    #[serde(flatten)]
    pub payload: RankedPayload,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct WhitelistEntry {
    pub channel_id: String,
    pub status: String,
}

impl WhitelistEntry {
    pub fn active(channel_id: impl Into<String>) -> Self {
        Self {
            channel_id: channel_id.into(),
            status: "active".to_string(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == "active"
    }
}

/// Which channels a single search call covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelScope {
    /// Restrict to exactly one channel.
    Channel(String),
    /// Any channel, minus the excluded ids.
    Global { exclude: HashSet<String> },
}

impl ChannelScope {
    pub fn channel_id(&self) -> Option<&str> {
        match self {
            ChannelScope::Channel(id) => Some(id.as_str()),
            ChannelScope::Global { .. } => None,
        }
    }

    pub fn excludes(&self, channel_id: &str) -> bool {
        match self {
            ChannelScope::Channel(_) => false,
            ChannelScope::Global { exclude } => exclude.contains(channel_id),
        }
    }
}
