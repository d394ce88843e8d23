//! Integration tests for the HTTP providers.
//!
//! A mock match/team service is served on a random local port and the real
//! `reqwest` clients are pointed at it.

use std::time::Duration;

use axum::extract::Path;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use tokio::net::TcpListener;
use upstream::{
    HttpRecordFetcher, MatchDataProvider, MatchServiceClient, PlayerStatsProvider,
    TeamServiceClient, UpstreamError,
};

// ============================================================================
// Mock upstream service
// ============================================================================

async fn match_handler(Path(match_id): Path<u64>) -> Response {
    match match_id {
        10 => Json(json!({"weather_condition": 1, "pitch_condition": 0})).into_response(),
        11 => (StatusCode::OK, "").into_response(),
        12 => StatusCode::NOT_FOUND.into_response(),
        13 => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        14 => Json(json!([1, 2])).into_response(),
        15 => {
            tokio::time::sleep(Duration::from_secs(2)).await;
            Json(json!({"weather_condition": 0})).into_response()
        }
        _ => Json(json!({})).into_response(),
    }
}

async fn stats_handler(Path(player_id): Path<u64>) -> Response {
    match player_id {
        1 => Json(json!({"historical_avg_points": 65})).into_response(),
        2 => Json(json!({"matches_played": 12})).into_response(),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Start the mock service on a random port and return its `/api/v1` base URL
async fn start_mock_upstream() -> (String, tokio::task::JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind mock upstream");
    let addr = listener.local_addr().expect("Failed to get local address");

    let app = Router::new()
        .route("/api/v1/matches/:match_id", get(match_handler))
        .route("/api/v1/players/:player_id/stats", get(stats_handler));

    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Mock upstream failed");
    });

    (format!("http://{}/api/v1", addr), handle)
}

fn fetcher(base_url: &str, timeout: Duration) -> HttpRecordFetcher {
    HttpRecordFetcher::new(reqwest::Client::new(), base_url, timeout)
}

// ============================================================================
// Match service
// ============================================================================

#[tokio::test]
async fn test_fetch_match_decodes_conditions() {
    let (base, handle) = start_mock_upstream().await;
    let client = MatchServiceClient::new(fetcher(&base, Duration::from_secs(2)));

    let context = client
        .fetch_match(10)
        .await
        .expect("fetch failed")
        .expect("match should exist");

    assert_eq!(context.match_id, 10);
    assert_eq!(context.weather_condition, Some(1.0));
    assert_eq!(context.pitch_condition, Some(0.0));

    handle.abort();
}

#[tokio::test]
async fn test_fetch_match_missing_records() {
    let (base, handle) = start_mock_upstream().await;
    let client = MatchServiceClient::new(fetcher(&base, Duration::from_secs(2)));

    // Empty body, 404 and `{}` all mean "no such match"
    assert!(client.fetch_match(11).await.unwrap().is_none());
    assert!(client.fetch_match(12).await.unwrap().is_none());
    assert!(client.fetch_match(99).await.unwrap().is_none());

    handle.abort();
}

#[tokio::test]
async fn test_fetch_match_error_status_and_bad_payload() {
    let (base, handle) = start_mock_upstream().await;
    let client = MatchServiceClient::new(fetcher(&base, Duration::from_secs(2)));

    let err = client.fetch_match(13).await.unwrap_err();
    assert!(matches!(err, UpstreamError::Status { status: 500, .. }));

    let err = client.fetch_match(14).await.unwrap_err();
    assert!(matches!(err, UpstreamError::InvalidRecord { .. }));

    handle.abort();
}

#[tokio::test]
async fn test_fetch_match_times_out() {
    let (base, handle) = start_mock_upstream().await;
    let client = MatchServiceClient::new(fetcher(&base, Duration::from_millis(100)));

    let err = client.fetch_match(15).await.unwrap_err();
    assert!(matches!(err, UpstreamError::Timeout { .. }), "got {err:?}");
    assert!(err.is_transport());

    handle.abort();
}

#[tokio::test]
async fn test_unreachable_service_is_transport_error() {
    // Bind then drop a listener so the port is very likely closed
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = TeamServiceClient::new(fetcher(
        &format!("http://{}/api/v1", addr),
        Duration::from_secs(2),
    ));

    let err = client.fetch_player_stats(1).await.unwrap_err();
    assert!(err.is_transport(), "got {err:?}");
}

// ============================================================================
// Team service
// ============================================================================

#[tokio::test]
async fn test_fetch_player_stats() {
    let (base, handle) = start_mock_upstream().await;
    let client = TeamServiceClient::new(fetcher(&base, Duration::from_secs(2)));

    let player = client.fetch_player_stats(1).await.unwrap().unwrap();
    assert_eq!(player.player_id, 1);
    assert_eq!(player.historical_avg_points, Some(65.0));

    // A record without the field still resolves; the default applies later
    let player = client.fetch_player_stats(2).await.unwrap().unwrap();
    assert_eq!(player.historical_avg_points, None);

    assert!(client.fetch_player_stats(3).await.unwrap().is_none());

    handle.abort();
}
