//! Core domain types shared by every stage of the recommender.
//!
//! Contexts are built once per request from upstream records and never
//! outlive that request.

use serde::{Deserialize, Serialize};

// =============================================================================
// Type Aliases
// =============================================================================

/// Identifier of a match in the match service
pub type MatchId = u64;

/// Identifier of a player in the team service
pub type PlayerId = u64;

// =============================================================================
// Contexts
// =============================================================================

/// Conditions for a single match.
///
/// Both conditions are categorical codes. A field the upstream record did not
/// carry (or carried as a non-numeric value) is `None`; defaults are applied
/// later, field by field, when features are built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchContext {
    pub match_id: MatchId,
    pub weather_condition: Option<f64>,
    pub pitch_condition: Option<f64>,
}

impl MatchContext {
    pub fn new(match_id: MatchId) -> Self {
        Self {
            match_id,
            weather_condition: None,
            pitch_condition: None,
        }
    }

    pub fn with_conditions(mut self, weather: f64, pitch: f64) -> Self {
        self.weather_condition = Some(weather);
        self.pitch_condition = Some(pitch);
        self
    }
}

/// Historical statistics for a single player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerContext {
    pub player_id: PlayerId,
    pub historical_avg_points: Option<f64>,
}

impl PlayerContext {
    pub fn new(player_id: PlayerId) -> Self {
        Self {
            player_id,
            historical_avg_points: None,
        }
    }

    pub fn with_avg_points(mut self, points: f64) -> Self {
        self.historical_avg_points = Some(points);
        self
    }
}
