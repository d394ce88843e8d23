//! Integration tests for the pipeline.
//!
//! These tests run feature building and ranking together the way the
//! orchestrator does, with a simple stand-in for the scoring model.

use pipeline::{FeatureBuilder, FeatureVector, Recommendation, rank};
use upstream::{MatchContext, PlayerContext};

/// Deterministic stand-in for the model: rewards history, penalises cloud.
fn toy_score(features: &FeatureVector) -> f64 {
    features.historical_avg_points * 0.9 - features.weather_condition * 3.0
        + features.pitch_condition * 1.5
}

fn create_test_setup() -> (MatchContext, Vec<PlayerContext>) {
    let match_context = MatchContext::new(10).with_conditions(1.0, 0.0);
    let players = vec![
        PlayerContext::new(11).with_avg_points(50.0),
        PlayerContext::new(12),
        PlayerContext::new(13).with_avg_points(65.0),
        PlayerContext::new(14).with_avg_points(40.0),
        PlayerContext::new(15).with_avg_points(65.0),
    ];
    (match_context, players)
}

#[test]
fn test_build_score_rank() {
    let (match_context, players) = create_test_setup();
    let builder = FeatureBuilder::new();

    let scored: Vec<Recommendation> = builder
        .build_all(&match_context, &players)
        .iter()
        .map(|(player_id, features)| Recommendation::new(*player_id, toy_score(features)))
        .collect();
    let ranked = rank(scored);

    let ids: Vec<_> = ranked.iter().map(|r| r.player_id).collect();
    // 13 and 15 tie, 12 and 14 tie (12 has the default 40 points)
    assert_eq!(ids, vec![13, 15, 11, 12, 14]);
    assert_eq!(ranked[0].predicted_score, 55.5);
    assert_eq!(ranked[3].predicted_score, 33.0);
}

#[test]
fn test_ranked_output_is_non_increasing_and_complete() {
    let (match_context, players) = create_test_setup();
    let builder = FeatureBuilder::new();

    let ranked = rank(
        builder
            .build_all(&match_context, &players)
            .iter()
            .map(|(id, f)| Recommendation::new(*id, toy_score(f)))
            .collect(),
    );

    assert_eq!(ranked.len(), players.len());
    for pair in ranked.windows(2) {
        assert!(pair[0].predicted_score >= pair[1].predicted_score);
    }
}

#[test]
fn test_recommendation_serializes_like_the_api() {
    let json = serde_json::to_string(&Recommendation::new(1, 60.0)).unwrap();
    assert_eq!(json, r#"{"player_id":1,"predicted_score":60.0}"#);
}
