//! Feature building for player scoring.
//!
//! Turns a (match, player) pair into the fixed three-field vector the scoring
//! model was trained on. Building never fails: each field that the upstream
//! record did not provide is replaced by its own default.

use rayon::prelude::*;
use serde::Serialize;
use upstream::{MatchContext, PlayerContext, PlayerId};

/// Weather code used when the match record has none
pub const DEFAULT_WEATHER_CONDITION: f64 = 0.0;

/// Pitch code used when the match record has none
pub const DEFAULT_PITCH_CONDITION: f64 = 0.0;

/// Average points assumed for a player without history
pub const DEFAULT_HISTORICAL_AVG_POINTS: f64 = 40.0;

/// Feature names in model column order
pub const FEATURE_NAMES: [&str; 3] = [
    "weather_condition",
    "pitch_condition",
    "historical_avg_points",
];

/// Features for one player in one match.
///
/// Field order matches [`FEATURE_NAMES`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeatureVector {
    pub weather_condition: f64,
    pub pitch_condition: f64,
    pub historical_avg_points: f64,
}

impl FeatureVector {
    /// The vector as a model input row.
    pub fn to_array(&self) -> [f64; 3] {
        [
            self.weather_condition,
            self.pitch_condition,
            self.historical_avg_points,
        ]
    }

    /// Look a feature up by its column name.
    pub fn get(&self, name: &str) -> Option<f64> {
        FEATURE_NAMES
            .iter()
            .position(|n| *n == name)
            .map(|i| self.to_array()[i])
    }
}

/// Builds feature vectors from resolved contexts.
///
/// ## Performance Note
/// `build_all` uses Rayon, so a large candidate list is processed in
/// parallel. Output order always matches input order.
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureBuilder;

impl FeatureBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Build the vector for one player.
    pub fn build(&self, match_context: &MatchContext, player: &PlayerContext) -> FeatureVector {
        FeatureVector {
            weather_condition: match_context
                .weather_condition
                .unwrap_or(DEFAULT_WEATHER_CONDITION),
            pitch_condition: match_context
                .pitch_condition
                .unwrap_or(DEFAULT_PITCH_CONDITION),
            historical_avg_points: player
                .historical_avg_points
                .unwrap_or(DEFAULT_HISTORICAL_AVG_POINTS),
        }
    }

    /// Build vectors for every player, keeping input order.
    pub fn build_all(
        &self,
        match_context: &MatchContext,
        players: &[PlayerContext],
    ) -> Vec<(PlayerId, FeatureVector)> {
        players
            .par_iter()
            .map(|player| (player.player_id, self.build(match_context, player)))
            .collect()
    }
}
