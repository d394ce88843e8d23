//! Ranking of scored players.

use serde::{Deserialize, Serialize};
use upstream::PlayerId;

/// A scored player as returned to callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub player_id: PlayerId,
    pub predicted_score: f64,
}

impl Recommendation {
    /// Create a recommendation from a raw model score, rounding it to cents.
    pub fn new(player_id: PlayerId, raw_score: f64) -> Self {
        Self {
            player_id,
            predicted_score: round_score(raw_score),
        }
    }
}

/// Round to 2 decimal places, half to even, with no negative zero.
pub fn round_score(score: f64) -> f64 {
    let rounded = (score * 100.0).round_ties_even() / 100.0;
    if rounded == 0.0 { 0.0 } else { rounded }
}

/// Sort by predicted score, highest first.
///
/// The sort is stable: players with equal (rounded) scores keep the order in
/// which they were given, which is the request order.
pub fn rank(mut recommendations: Vec<Recommendation>) -> Vec<Recommendation> {
    recommendations.sort_by(|a, b| b.predicted_score.total_cmp(&a.predicted_score));
    recommendations
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(recommendations: &[Recommendation]) -> Vec<PlayerId> {
        recommendations.iter().map(|r| r.player_id).collect()
    }

    #[test]
    fn test_round_score() {
        assert_eq!(round_score(60.0), 60.0);
        assert_eq!(round_score(59.996), 60.0);
        assert_eq!(round_score(47.3333333), 47.33);
        assert_eq!(round_score(0.125), 0.12);
        assert_eq!(round_score(0.375), 0.38);
    }

    #[test]
    fn test_round_score_never_negative_zero() {
        let rounded = round_score(-0.001);
        assert_eq!(rounded, 0.0);
        assert!(rounded.is_sign_positive());
    }

    #[test]
    fn test_rank_sorts_descending() {
        let ranked = rank(vec![
            Recommendation::new(1, 0.2),
            Recommendation::new(2, 0.9),
            Recommendation::new(3, 0.5),
        ]);

        assert_eq!(ids(&ranked), vec![2, 3, 1]);
    }

    #[test]
    fn test_rank_ties_keep_input_order() {
        let ranked = rank(vec![
            Recommendation::new(7, 50.0),
            Recommendation::new(3, 60.0),
            Recommendation::new(9, 50.0),
            Recommendation::new(1, 50.0),
        ]);

        assert_eq!(ids(&ranked), vec![3, 7, 9, 1]);
    }

    #[test]
    fn test_rank_ties_after_rounding() {
        // 42.001 and 41.999 both round to 42.00
        let ranked = rank(vec![
            Recommendation::new(5, 41.999),
            Recommendation::new(6, 42.001),
        ]);

        assert_eq!(ids(&ranked), vec![5, 6]);
        assert_eq!(ranked[0].predicted_score, ranked[1].predicted_score);
    }

    #[test]
    fn test_rank_empty() {
        assert!(rank(vec![]).is_empty());
    }
}
