//! Feature building and ranking for player recommendations.
//!
//! This crate provides:
//! - `FeatureBuilder`, which maps (match, player) contexts to a `FeatureVector`
//! - `Recommendation` plus the rounding and stable ranking rules
//!
//! ## Architecture
//! The pipeline sits between resolution and scoring:
//! 1. Resolved contexts are turned into feature vectors (defaults per field)
//! 2. Vectors are scored by the model
//! 3. Scores are rounded and ranked, highest first, ties in request order
//!
//! ## Example Usage
//! ```ignore
//! use pipeline::{FeatureBuilder, Recommendation, rank};
//!
//! let features = FeatureBuilder::new().build(&match_context, &player);
//! let score = port.score(&features)?;
//! let ranked = rank(vec![Recommendation::new(player.player_id, score)]);
//! ```

pub mod features;
pub mod ranking;

// Re-export main types
pub use features::{
    DEFAULT_HISTORICAL_AVG_POINTS, DEFAULT_PITCH_CONDITION, DEFAULT_WEATHER_CONDITION,
    FEATURE_NAMES, FeatureBuilder, FeatureVector,
};
pub use ranking::{Recommendation, rank, round_score};
