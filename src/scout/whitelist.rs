// src/scout/whitelist.rs
use anyhow::{anyhow, Context, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::scout::types::WhitelistEntry;

pub const ENV_WHITELIST_PATH: &str = "SCOUT_WHITELIST_PATH";

/// Read-only supplier of whitelisted channels (a record-store table in production).
#[async_trait::async_trait]
pub trait WhitelistSource: Send + Sync {
    async fn entries(&self) -> Result<Vec<WhitelistEntry>>;
}

/// Channel ids of the active entries, first-seen order, blanks and repeats dropped.
pub fn active_channel_ids(entries: &[WhitelistEntry]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for e in entries.iter().filter(|e| e.is_active()) {
        let id = e.channel_id.trim();
        if !id.is_empty() && !out.iter().any(|x| x == id) {
            out.push(id.to_string());
        }
    }
    out
}

/// Fixed in-memory whitelist (tests, or a snapshot loaded at boot).
#[derive(Debug, Clone, Default)]
pub struct StaticWhitelist(pub Vec<WhitelistEntry>);

#[async_trait::async_trait]
impl WhitelistSource for StaticWhitelist {
    async fn entries(&self) -> Result<Vec<WhitelistEntry>> {
        Ok(self.0.clone())
    }
}

/// Whitelist file re-read on every request, so edits apply without restart.
#[derive(Debug, Clone)]
pub struct FileWhitelist {
    path: PathBuf,
}

impl FileWhitelist {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait::async_trait]
impl WhitelistSource for FileWhitelist {
    async fn entries(&self) -> Result<Vec<WhitelistEntry>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        load_whitelist_from(&self.path)
    }
}

/// Load whitelist from an explicit path. Supports TOML or JSON formats.
pub fn load_whitelist_from(path: &Path) -> Result<Vec<WhitelistEntry>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading whitelist from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    parse_whitelist(&content, ext.as_str())
}

/// Resolve the whitelist path:
/// 1) $SCOUT_WHITELIST_PATH (must exist)
/// 2) the configured path
pub fn resolve_whitelist_path(configured: &Path) -> Result<PathBuf> {
    if let Ok(p) = std::env::var(ENV_WHITELIST_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return Ok(pb);
        }
        return Err(anyhow!("SCOUT_WHITELIST_PATH points to non-existent path"));
    }
    Ok(configured.to_path_buf())
}

fn parse_whitelist(s: &str, hint_ext: &str) -> Result<Vec<WhitelistEntry>> {
    let try_toml = hint_ext == "toml" || s.contains("[[channels]]");
    if try_toml {
        if let Ok(v) = parse_toml(s) {
            return Ok(v);
        }
    }
    if let Ok(v) = parse_json(s) {
        return Ok(v);
    }
    if !try_toml {
        if let Ok(v) = parse_toml(s) {
            return Ok(v);
        }
    }
    Err(anyhow!("unsupported whitelist format"))
}

fn parse_toml(s: &str) -> Result<Vec<WhitelistEntry>> {
    #[derive(serde::Deserialize)]
    struct TomlWl {
        #[serde(default)]
        channels: Vec<WhitelistEntry>,
    }
    let v: TomlWl = toml::from_str(s)?;
    Ok(clean_list(v.channels))
}

fn parse_json(s: &str) -> Result<Vec<WhitelistEntry>> {
    let v: Vec<WhitelistEntry> = serde_json::from_str(s)?;
    Ok(clean_list(v))
}

/// Trim ids and statuses, drop blank ids, collapse repeats (last status wins), sort by id.
/// Status case is kept, so only an exact `active` participates.
fn clean_list(items: Vec<WhitelistEntry>) -> Vec<WhitelistEntry> {
    let mut by_id: BTreeMap<String, String> = BTreeMap::new();
    for it in items {
        let id = it.channel_id.trim();
        if !id.is_empty() {
            by_id.insert(id.to_string(), it.status.trim().to_string());
        }
    }
    by_id
        .into_iter()
        .map(|(channel_id, status)| WhitelistEntry { channel_id, status })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toml_and_json_formats_work() {
        let toml = r#"
[[channels]]
channel_id = " UC_b "
status = "active"

[[channels]]
channel_id = ""
status = "active"

[[channels]]
channel_id = "UC_a"
status = "paused"
"#;
        let out = parse_whitelist(toml, "toml").unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].channel_id, "UC_a");
        assert_eq!(out[1].channel_id, "UC_b");

        let json = r#"[{"channel_id":"UC_x","status":" active "},{"channel_id":"UC_y"}]"#;
        let out = parse_whitelist(json, "json").unwrap();
        assert_eq!(active_channel_ids(&out), vec!["UC_x".to_string()]);
    }

    #[test]
    fn status_match_is_case_sensitive() {
        let json = r#"[{"channel_id":"UC_a","status":"ACTIVE"},{"channel_id":"UC_b","status":"Active"},{"channel_id":"UC_c","status":"active"}]"#;
        let out = parse_whitelist(json, "json").unwrap();
        assert_eq!(out[0].status, "ACTIVE");
        assert_eq!(active_channel_ids(&out), vec!["UC_c".to_string()]);
    }

    #[test]
    fn only_active_entries_participate() {
        let entries = vec![
            WhitelistEntry::active("a"),
            WhitelistEntry {
                channel_id: "b".into(),
                status: "inactive".into(),
            },
            WhitelistEntry::active("a"),
        ];
        assert_eq!(active_channel_ids(&entries), vec!["a".to_string()]);
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(parse_whitelist("not a whitelist", "txt").is_err());
    }
}
