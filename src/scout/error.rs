// src/scout/error.rs
use std::fmt;
use thiserror::Error;

/// Which fetch branch a failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Whitelist,
    Channel,
    Global,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SourceKind::Whitelist => "whitelist",
            SourceKind::Channel => "channel",
            SourceKind::Global => "global",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Error)]
pub enum ScoutError {
    #[error("{kind} source unavailable{}: {source:#}", channel_suffix(.channel_id))]
    SourceUnavailable {
        kind: SourceKind,
        channel_id: Option<String>,
        #[source]
        source: anyhow::Error,
    },

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

fn channel_suffix(channel_id: &Option<String>) -> String {
    match channel_id {
        Some(id) => format!(" (channel {id})"),
        None => String::new(),
    }
}

impl ScoutError {
    pub fn source_unavailable(
        kind: SourceKind,
        channel_id: Option<&str>,
        source: anyhow::Error,
    ) -> Self {
        ScoutError::SourceUnavailable {
            kind,
            channel_id: channel_id.map(str::to_string),
            source,
        }
    }

    pub fn kind(&self) -> Option<SourceKind> {
        match self {
            ScoutError::SourceUnavailable { kind, .. } => Some(*kind),
            ScoutError::InvalidRequest(_) => None,
        }
    }
}
