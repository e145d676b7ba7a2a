// src/config/scout.rs
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::{env, fs, path::Path, path::PathBuf};

use crate::scout::fetch::{MAX_GLOBAL, MAX_PER_CHANNEL};

pub const DEFAULT_SCOUT_CONFIG_PATH: &str = "config/scout.toml";
pub const ENV_SCOUT_CONFIG_PATH: &str = "SCOUT_CONFIG_PATH";

fn default_per_channel_cap() -> usize {
    MAX_PER_CHANNEL
}
fn default_global_cap() -> usize {
    MAX_GLOBAL
}
fn default_limit() -> usize {
    10
}
fn default_max_limit() -> usize {
    100
}
fn default_request_timeout_secs() -> u64 {
    8
}
fn default_connect_timeout_secs() -> u64 {
    4
}
fn default_whitelist_path() -> PathBuf {
    PathBuf::from("config/channel_whitelist.toml")
}
fn default_api_key() -> String {
    "ENV".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoutConfig {
    #[serde(default = "default_per_channel_cap")]
    pub per_channel_cap: usize,
    #[serde(default = "default_global_cap")]
    pub global_cap: usize,
    /// Result count when the caller does not pass `limit`.
    #[serde(default = "default_limit")]
    pub default_limit: usize,
    #[serde(default = "default_max_limit")]
    pub max_limit: usize,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_whitelist_path")]
    pub whitelist_path: PathBuf,
    /// "ENV" means: read from YOUTUBE_API_KEY
    #[serde(default = "default_api_key")]
    pub youtube_api_key: String,
}

impl Default for ScoutConfig {
    fn default() -> Self {
        Self {
            per_channel_cap: default_per_channel_cap(),
            global_cap: default_global_cap(),
            default_limit: default_limit(),
            max_limit: default_max_limit(),
            request_timeout_secs: default_request_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            whitelist_path: default_whitelist_path(),
            youtube_api_key: default_api_key(),
        }
    }
}

impl ScoutConfig {
    pub fn from_toml_str(s: &str) -> anyhow::Result<Self> {
        let mut cfg: ScoutConfig = toml::from_str(s)?;
        cfg.sanitize();
        Ok(cfg)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .with_context(|| format!("reading scout config from {}", path.display()))?;
        Self::from_toml_str(&data)
    }

    /// $SCOUT_CONFIG_PATH, else `config/scout.toml`; a missing file yields defaults.
    pub fn load_default() -> anyhow::Result<Self> {
        let path = env::var(ENV_SCOUT_CONFIG_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_SCOUT_CONFIG_PATH));
        if !path.exists() {
            let mut cfg = Self::default();
            cfg.sanitize();
            return Ok(cfg);
        }
        Self::load_from_file(path)
    }

    /// Resolved API key; "ENV" reads YOUTUBE_API_KEY and an unset var yields "".
    pub fn api_key(&self) -> String {
        if self.youtube_api_key.trim().eq_ignore_ascii_case("env") {
            env::var("YOUTUBE_API_KEY").unwrap_or_default()
        } else {
            self.youtube_api_key.trim().to_string()
        }
    }

    /// Clamp a caller-requested limit into `1..=max_limit`.
    pub fn clamp_limit(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.default_limit)
            .clamp(1, self.max_limit)
    }

    fn sanitize(&mut self) {
        if self.max_limit == 0 {
            self.max_limit = default_max_limit();
        }
        if self.default_limit == 0 || self.default_limit > self.max_limit {
            self.default_limit = default_limit().min(self.max_limit);
        }
        // A zero timeout would make every call fail instantly.
        if self.request_timeout_secs == 0 {
            self.request_timeout_secs = default_request_timeout_secs();
        }
        if self.connect_timeout_secs == 0 || self.connect_timeout_secs > self.request_timeout_secs
        {
            self.connect_timeout_secs = self
                .request_timeout_secs
                .min(default_connect_timeout_secs());
        }
    }
}
