// tests/common/mod.rs
// Shared fakes for the scout integration tests.
#![allow(dead_code)]

use anyhow::{anyhow, Result};
use exam_scout::scout::fetch::VideoSource;
use exam_scout::scout::types::{ChannelScope, SearchHit, WhitelistEntry};
use exam_scout::scout::whitelist::{StaticWhitelist, WhitelistSource};
use exam_scout::scout::{ScoutCaps, VideoScout};
use exam_scout::ResultCache;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub fn hit(id: &str, channel: &str, title: &str, views: u64, comments: u64) -> SearchHit {
    SearchHit {
        title: title.into(),
        description: String::new(),
        channel_name: format!("{channel} name"),
        channel_id: channel.into(),
        source_url: format!("https://www.youtube.com/watch?v={id}"),
        views,
        comment_count: comments,
    }
}

/// In-memory search source with per-channel results, a global list, and injectable failures.
#[derive(Default)]
pub struct FakeSource {
    pub per_channel: HashMap<String, Vec<SearchHit>>,
    pub global: Vec<SearchHit>,
    pub failing_channels: HashSet<String>,
    pub global_fails: bool,
    pub calls: AtomicUsize,
}

impl FakeSource {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl VideoSource for FakeSource {
    async fn search(
        &self,
        _query: &str,
        scope: &ChannelScope,
        _max_results: usize,
    ) -> Result<Vec<SearchHit>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match scope {
            ChannelScope::Channel(id) => {
                if self.failing_channels.contains(id) {
                    return Err(anyhow!("quota exceeded"));
                }
                Ok(self.per_channel.get(id).cloned().unwrap_or_default())
            }
            ChannelScope::Global { .. } => {
                if self.global_fails {
                    return Err(anyhow!("connection reset"));
                }
                Ok(self.global.clone())
            }
        }
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}

pub struct FailingWhitelist;

#[async_trait::async_trait]
impl WhitelistSource for FailingWhitelist {
    async fn entries(&self) -> Result<Vec<WhitelistEntry>> {
        Err(anyhow!("record store offline"))
    }
}

pub fn whitelist(ids: &[&str]) -> StaticWhitelist {
    StaticWhitelist(ids.iter().map(|id| WhitelistEntry::active(*id)).collect())
}

pub fn scout_with(source: Arc<FakeSource>, wl: Arc<dyn WhitelistSource>) -> VideoScout {
    VideoScout::new(source, wl, Arc::new(ResultCache::new()), ScoutCaps::default())
}

/// The "os" scenario: two whitelisted channels with three hits each, and a
/// global search whose results include one duplicate of a whitelisted video
/// (80 there, 95 globally) plus two hits from whitelisted channels that must be excluded.
pub fn os_fixture() -> FakeSource {
    let mut per_channel = HashMap::new();
    per_channel.insert(
        "wl_a".to_string(),
        vec![
            hit("a1", "wl_a", "OS: process scheduling", 90, 10),
            hit("a2", "wl_a", "OS deadlocks", 50, 0),
            hit("a3", "wl_a", "OS paging", 10, 0),
        ],
    );
    per_channel.insert(
        "wl_b".to_string(),
        vec![
            hit("dup", "wl_b", "OS threads", 80, 0),
            hit("b2", "wl_b", "OS semaphores", 40, 0),
            hit("b3", "wl_b", "OS file systems", 5, 0),
        ],
    );

    let mut global = vec![
        hit("x1", "wl_a", "OS leaked from whitelist", 9_999, 0),
        hit("dup", "g_dup", "OS threads (mirror)", 95, 0),
    ];
    for i in 1..=16u64 {
        global.push(hit(
            &format!("g{i:02}"),
            &format!("g_{i}"),
            &format!("Linear algebra lecture {i}"),
            10 * i,
            0,
        ));
    }
    global.push(hit("x2", "wl_b", "OS leaked again", 9_999, 0));

    FakeSource {
        per_channel,
        global,
        ..Default::default()
    }
}
