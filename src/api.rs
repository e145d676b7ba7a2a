use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{header::HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use tower_http::cors::CorsLayer;

use crate::config::scout::ScoutConfig;
use crate::scout::error::ScoutError;
use crate::scout::VideoScout;

/// Response header telling callers whether the ranking came from cache.
pub const CACHE_HEADER: &str = "x-videos-cache";

#[derive(Clone)]
pub struct AppState {
    pub scout: VideoScout,
    pub config: Arc<ScoutConfig>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/videos", get(get_videos))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(Debug, serde::Deserialize)]
struct VideosQuery {
    #[serde(default)]
    topic_id: Option<String>,
    /// Raw text, parsed by `parse_limit`.
    #[serde(default)]
    limit: Option<String>,
}

/// Blank → not given; negative → 0 (clamped up later); non-integer → error.
fn parse_limit(raw: Option<&str>) -> Result<Option<usize>, ScoutError> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    match raw.parse::<i64>() {
        Ok(n) => Ok(Some(usize::try_from(n.max(0)).unwrap_or(usize::MAX))),
        Err(_) => Err(ScoutError::InvalidRequest(format!(
            "limit must be an integer, got {raw:?}"
        ))),
    }
}

#[derive(serde::Serialize)]
struct ErrorBody {
    error: String,
}

fn error_response(status: StatusCode, msg: String) -> Response {
    (status, Json(ErrorBody { error: msg })).into_response()
}

impl IntoResponse for ScoutError {
    fn into_response(self) -> Response {
        let status = match &self {
            ScoutError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ScoutError::SourceUnavailable { .. } => StatusCode::BAD_GATEWAY,
        };
        error_response(status, self.to_string())
    }
}

async fn get_videos(State(state): State<AppState>, Query(q): Query<VideosQuery>) -> Response {
    let topic = q.topic_id.unwrap_or_default();
    let limit = match parse_limit(q.limit.as_deref()) {
        Ok(requested) => state.config.clamp_limit(requested),
        Err(e) => return e.into_response(),
    };

    match state.scout.videos_for_topic(&topic, limit).await {
        Ok(resp) => {
            let flag = if resp.cached { "HIT" } else { "MISS" };
            let mut out = Json(resp).into_response();
            out.headers_mut().insert(
                HeaderName::from_static(CACHE_HEADER),
                HeaderValue::from_static(flag),
            );
            out
        }
        Err(e) => {
            tracing::warn!(target: "api", error = %e, topic = %topic, "videos request failed");
            e.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_parsing() {
        assert_eq!(parse_limit(None).unwrap(), None);
        assert_eq!(parse_limit(Some("  ")).unwrap(), None);
        assert_eq!(parse_limit(Some("25")).unwrap(), Some(25));
        assert_eq!(parse_limit(Some("-4")).unwrap(), Some(0));
        assert!(parse_limit(Some("abc")).is_err());
        assert!(parse_limit(Some("2.5")).is_err());
    }
}
