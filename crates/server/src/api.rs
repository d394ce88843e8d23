//! HTTP surface of the recommendation service.
//!
//! Routes:
//! - `GET /` - liveness banner
//! - `GET /health` - model readiness (503 while degraded)
//! - `GET /recommend-players/` - ranked recommendations, also mounted under
//!   `/api/v1`, with or without the trailing slash

use axum::{
    Json, Router,
    extract::{RawQuery, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Serialize;
use serde_json::{Value, json};
use thiserror::Error;
use tracing::debug;

use pipeline::Recommendation;
use resolver::UnresolvedPlayer;
use upstream::{MatchId, PlayerId};

use crate::orchestrator::{RecommendError, RecommendationOrchestrator};

/// Errors returned to HTTP clients as `{"detail": "..."}`
#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Recommend(#[from] RecommendError),

    #[error("{0}")]
    InvalidQuery(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Recommend(RecommendError::MatchNotFound { .. }) => StatusCode::NOT_FOUND,
            ApiError::Recommend(RecommendError::ModelNotReady) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::InvalidQuery(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "detail": self.to_string() }))).into_response()
    }
}

/// Parsed query string of a recommendation request
#[derive(Debug, Clone, PartialEq)]
pub struct RecommendQuery {
    pub match_id: MatchId,
    pub player_ids: Vec<PlayerId>,
    pub include_unresolved: bool,
}

impl RecommendQuery {
    /// Parse `match_id=..&player_ids=..&player_ids=..`.
    ///
    /// `player_ids` repeats once per player; each value is a single integer.
    pub fn parse(raw: Option<&str>) -> Result<Self, ApiError> {
        let mut match_id = None;
        let mut player_ids = Vec::new();
        let mut include_unresolved = false;

        for (key, value) in url::form_urlencoded::parse(raw.unwrap_or_default().as_bytes()) {
            match key.as_ref() {
                "match_id" => match_id = Some(parse_id("match_id", &value)?),
                "player_ids" => player_ids.push(parse_id("player_ids", &value)?),
                "include_unresolved" => include_unresolved = parse_flag(&value)?,
                _ => {}
            }
        }

        let match_id = match_id
            .ok_or_else(|| ApiError::InvalidQuery("Missing query parameter: match_id".into()))?;
        if player_ids.is_empty() {
            return Err(ApiError::InvalidQuery(
                "Missing query parameter: player_ids".into(),
            ));
        }

        Ok(Self {
            match_id,
            player_ids,
            include_unresolved,
        })
    }
}

fn parse_id(name: &str, value: &str) -> Result<u64, ApiError> {
    value.trim().parse().map_err(|_| {
        ApiError::InvalidQuery(format!(
            "Invalid value for {name}: {value:?} is not a valid integer"
        ))
    })
}

fn parse_flag(value: &str) -> Result<bool, ApiError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" | "" => Ok(false),
        _ => Err(ApiError::InvalidQuery(format!(
            "Invalid value for include_unresolved: {value:?} is not a boolean"
        ))),
    }
}

#[derive(Debug, Serialize)]
struct RecommendResponse {
    recommendations: Vec<Recommendation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    unresolved: Option<Vec<UnresolvedPlayer>>,
}

/// Build the service router around `orchestrator`.
pub fn router(orchestrator: RecommendationOrchestrator) -> Router {
    let recommend = Router::new()
        .route("/recommend-players", get(recommend_players))
        .route("/recommend-players/", get(recommend_players));

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .nest("/api/v1", recommend.clone())
        .merge(recommend)
        .with_state(orchestrator)
}

async fn root() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "message": "Welcome to the Recommendation Service!"
    }))
}

async fn health(
    State(orchestrator): State<RecommendationOrchestrator>,
) -> (StatusCode, Json<Value>) {
    let scoring = orchestrator.scoring();
    let (status, code) = if scoring.is_ready() {
        ("ok", StatusCode::OK)
    } else {
        ("degraded", StatusCode::SERVICE_UNAVAILABLE)
    };

    (
        code,
        Json(json!({
            "status": status,
            "model_ready": scoring.is_ready(),
            "model": scoring.model_name(),
        })),
    )
}

async fn recommend_players(
    State(orchestrator): State<RecommendationOrchestrator>,
    RawQuery(raw): RawQuery,
) -> Result<Json<RecommendResponse>, ApiError> {
    let query = RecommendQuery::parse(raw.as_deref())?;
    debug!(
        match_id = query.match_id,
        players = query.player_ids.len(),
        "Received recommendation request"
    );

    let report = orchestrator
        .recommend(query.match_id, &query.player_ids)
        .await?;

    Ok(Json(RecommendResponse {
        recommendations: report.recommendations,
        unresolved: query.include_unresolved.then_some(report.unresolved),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_repeated_player_ids() {
        let query =
            RecommendQuery::parse(Some("match_id=10&player_ids=1&player_ids=2")).unwrap();

        assert_eq!(query.match_id, 10);
        assert_eq!(query.player_ids, vec![1, 2]);
        assert!(!query.include_unresolved);
    }

    #[test]
    fn test_parse_any_parameter_order_and_flag() {
        let query = RecommendQuery::parse(Some(
            "player_ids=3&match_id=7&player_ids=9&include_unresolved=true",
        ))
        .unwrap();

        assert_eq!(query.match_id, 7);
        assert_eq!(query.player_ids, vec![3, 9]);
        assert!(query.include_unresolved);
    }

    #[test]
    fn test_parse_rejects_bad_queries() {
        let cases = [
            None,
            Some("player_ids=1"),
            Some("match_id=10"),
            Some("match_id=ten&player_ids=1"),
            Some("match_id=10&player_ids=1&player_ids=x"),
            Some("match_id=10&player_ids="),
            Some("match_id=10&player_ids=1,2"),
            Some("match_id=-1&player_ids=1"),
            Some("match_id=10&player_ids=1&include_unresolved=maybe"),
        ];

        for raw in cases {
            let err = RecommendQuery::parse(raw).unwrap_err();
            assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY, "{raw:?}");
        }
    }

    #[test]
    fn test_error_status_codes() {
        let not_found = ApiError::from(RecommendError::MatchNotFound { match_id: 3 });
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);
        assert_eq!(not_found.to_string(), "Match with ID 3 not found.");

        let not_ready = ApiError::from(RecommendError::ModelNotReady);
        assert_eq!(not_ready.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
