// src/lib.rs
// Public library surface for the binaries and integration tests.

pub mod api;
pub mod cache;
pub mod config;
pub mod metrics;
pub mod pyq;
pub mod scout;

// ---- Re-exports for stable public API ----
pub use crate::api::{router, AppState};
pub use crate::cache::ResultCache;
pub use crate::config::ScoutConfig;
pub use crate::scout::VideoScout;

use std::sync::Arc;

use crate::scout::providers::youtube::YoutubeSource;
use crate::scout::whitelist::{resolve_whitelist_path, FileWhitelist};
use crate::scout::ScoutCaps;
use tracing::info;

/// Wire the production collaborators (YouTube search, file whitelist, fresh cache).
pub fn build_state(cfg: ScoutConfig) -> anyhow::Result<AppState> {
    let key_len = cfg.api_key().len();
    // Safe diagnostics: never log the key itself.
    info!(
        "scout cfg loaded: per_channel_cap={}, global_cap={}, timeout={}s, key_len={}",
        cfg.per_channel_cap, cfg.global_cap, cfg.request_timeout_secs, key_len
    );

    let source = YoutubeSource::from_config(&cfg)?;
    let whitelist = FileWhitelist::new(resolve_whitelist_path(&cfg.whitelist_path)?);
    let caps = ScoutCaps {
        per_channel: cfg.per_channel_cap,
        global: cfg.global_cap,
    };
    let scout = VideoScout::new(
        Arc::new(source),
        Arc::new(whitelist),
        Arc::new(ResultCache::new()),
        caps,
    );
    Ok(AppState {
        scout,
        config: Arc::new(cfg),
    })
}
