use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use metrics::histogram;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

use crate::config::scout::ScoutConfig;
use crate::scout::fetch::VideoSource;
use crate::scout::types::{ChannelScope, SearchHit};

const SEARCH_URL: &str = "https://www.googleapis.com/youtube/v3/search";
const STATS_URL: &str = "https://www.googleapis.com/youtube/v3/videos";

#[derive(Debug, Deserialize)]
struct SearchResp {
    #[serde(default)]
    items: Vec<SearchItem>,
}
#[derive(Debug, Deserialize)]
struct SearchItem {
    #[serde(default)]
    id: SearchId,
    #[serde(default)]
    snippet: Snippet,
}
#[derive(Debug, Default, Deserialize)]
struct SearchId {
    #[serde(rename = "videoId")]
    video_id: Option<String>,
}
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Snippet {
    title: String,
    description: String,
    #[serde(rename = "channelTitle")]
    channel_title: String,
    #[serde(rename = "channelId")]
    channel_id: String,
}

#[derive(Debug, Deserialize)]
struct StatsResp {
    #[serde(default)]
    items: Vec<StatsItem>,
}
#[derive(Debug, Deserialize)]
struct StatsItem {
    id: String,
    #[serde(default)]
    statistics: Statistics,
}
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
struct Statistics {
    // The API sends counts as decimal strings.
    #[serde(rename = "viewCount")]
    view_count: Option<String>,
    #[serde(rename = "commentCount")]
    comment_count: Option<String>,
}

fn parse_count(raw: Option<&str>) -> u64 {
    raw.and_then(|s| s.trim().parse::<u64>().ok()).unwrap_or(0)
}

pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={video_id}")
}

/// YouTube Data API v3 search + statistics.
pub struct YoutubeSource {
    http: reqwest::Client,
    api_key: String,
}

impl YoutubeSource {
    pub fn new(api_key: impl Into<String>, connect: Duration, total: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent("exam-scout/0.1")
            .connect_timeout(connect)
            .timeout(total)
            .build()
            .context("building youtube http client")?;
        Ok(Self {
            http,
            api_key: api_key.into(),
        })
    }

    pub fn from_config(cfg: &ScoutConfig) -> Result<Self> {
        Self::new(
            cfg.api_key(),
            Duration::from_secs(cfg.connect_timeout_secs),
            Duration::from_secs(cfg.request_timeout_secs),
        )
    }

    async fn search_items(
        &self,
        query: &str,
        scope: &ChannelScope,
        max_results: usize,
    ) -> Result<Vec<SearchItem>> {
        let max = max_results.to_string();
        let mut params: Vec<(&str, &str)> = vec![
            ("part", "snippet"),
            ("q", query),
            ("type", "video"),
            ("maxResults", max.as_str()),
            ("key", self.api_key.as_str()),
        ];
        if let Some(id) = scope.channel_id() {
            params.push(("channelId", id));
        }

        let resp = self
            .http
            .get(SEARCH_URL)
            .query(&params)
            .send()
            .await
            .context("youtube search get()")?;
        let status = resp.status();
        if !status.is_success() {
            bail!("youtube search returned HTTP {status}");
        }
        let body: SearchResp = resp.json().await.context("youtube search .json()")?;
        Ok(body.items)
    }

    async fn statistics(&self, ids: &[String]) -> Result<HashMap<String, Statistics>> {
        let joined = ids.join(",");
        let resp = self
            .http
            .get(STATS_URL)
            .query(&[
                ("part", "statistics"),
                ("id", joined.as_str()),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await
            .context("youtube videos get()")?;
        let status = resp.status();
        if !status.is_success() {
            bail!("youtube videos returned HTTP {status}");
        }
        let body: StatsResp = resp.json().await.context("youtube videos .json()")?;
        Ok(body
            .items
            .into_iter()
            .map(|it| (it.id, it.statistics))
            .collect())
    }
}

#[async_trait]
impl VideoSource for YoutubeSource {
    async fn search(
        &self,
        query: &str,
        scope: &ChannelScope,
        max_results: usize,
    ) -> Result<Vec<SearchHit>> {
        if self.api_key.is_empty() {
            return Err(anyhow!("YOUTUBE_API_KEY is not set"));
        }
        let t0 = std::time::Instant::now();

        let items: Vec<(String, Snippet)> = self
            .search_items(query, scope, max_results)
            .await?
            .into_iter()
            .filter_map(|it| it.id.video_id.map(|id| (id, it.snippet)))
            .collect();
        if items.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<String> = items.iter().map(|(id, _)| id.clone()).collect();
        let stats = self.statistics(&ids).await?;

        let out = items
            .into_iter()
            .map(|(id, sn)| {
                let st = stats.get(&id).cloned().unwrap_or_default();
                SearchHit {
                    title: sn.title,
                    description: sn.description,
                    channel_name: sn.channel_title,
                    channel_id: sn.channel_id,
                    source_url: watch_url(&id),
                    views: parse_count(st.view_count.as_deref()),
                    comment_count: parse_count(st.comment_count.as_deref()),
                }
            })
            .collect();

        histogram!("scout_fetch_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
        Ok(out)
    }

    fn name(&self) -> &'static str {
        "youtube"
    }
}
