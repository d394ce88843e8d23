//! Per-player outcomes of candidate resolution.

use std::fmt;

use serde::Serialize;
use upstream::{MatchContext, PlayerContext, PlayerId, UpstreamError};

/// Why a player was left out of the ranking.
///
/// The reason never changes how a player is treated (every unresolved player
/// is dropped the same way); it exists so callers and logs can tell a player
/// that does not exist from one whose service was down.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UnresolvedReason {
    /// The service has no record (404, empty body, or `{}`)
    NotFound,
    /// Timeout, connection failure, or an error status
    Unreachable { detail: String },
    /// The service answered with something that is not a record
    InvalidRecord { detail: String },
    /// Stats were fetched but the model could not score the player
    ScoringFailed { detail: String },
}

impl UnresolvedReason {
    /// Classify a fetch error.
    pub fn from_upstream(err: &UpstreamError) -> Self {
        match err {
            UpstreamError::InvalidRecord { .. } => UnresolvedReason::InvalidRecord {
                detail: err.to_string(),
            },
            _ => UnresolvedReason::Unreachable {
                detail: err.to_string(),
            },
        }
    }

    /// Short machine-friendly label
    pub fn kind(&self) -> &'static str {
        match self {
            UnresolvedReason::NotFound => "not_found",
            UnresolvedReason::Unreachable { .. } => "unreachable",
            UnresolvedReason::InvalidRecord { .. } => "invalid_record",
            UnresolvedReason::ScoringFailed { .. } => "scoring_failed",
        }
    }
}

impl fmt::Display for UnresolvedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnresolvedReason::NotFound => write!(f, "not found"),
            UnresolvedReason::Unreachable { detail }
            | UnresolvedReason::InvalidRecord { detail }
            | UnresolvedReason::ScoringFailed { detail } => {
                write!(f, "{}: {}", self.kind().replace('_', " "), detail)
            }
        }
    }
}

/// A player that will not appear in the ranking
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnresolvedPlayer {
    pub player_id: PlayerId,
    pub reason: UnresolvedReason,
}

/// Result of fetching one candidate's stats.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerOutcome {
    Resolved(PlayerContext),
    Unresolved(UnresolvedPlayer),
}

impl PlayerOutcome {
    pub fn unresolved(player_id: PlayerId, reason: UnresolvedReason) -> Self {
        PlayerOutcome::Unresolved(UnresolvedPlayer { player_id, reason })
    }

    pub fn player_id(&self) -> PlayerId {
        match self {
            PlayerOutcome::Resolved(context) => context.player_id,
            PlayerOutcome::Unresolved(player) => player.player_id,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, PlayerOutcome::Resolved(_))
    }
}

/// Everything resolved for one request: the match plus one outcome per
/// distinct candidate, in request order.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub match_context: MatchContext,
    pub outcomes: Vec<PlayerOutcome>,
}

impl Resolution {
    pub fn resolved(&self) -> impl Iterator<Item = &PlayerContext> {
        self.outcomes.iter().filter_map(|o| match o {
            PlayerOutcome::Resolved(context) => Some(context),
            PlayerOutcome::Unresolved(_) => None,
        })
    }

    pub fn unresolved(&self) -> impl Iterator<Item = &UnresolvedPlayer> {
        self.outcomes.iter().filter_map(|o| match o {
            PlayerOutcome::Unresolved(player) => Some(player),
            PlayerOutcome::Resolved(_) => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_from_upstream_error() {
        let err = UpstreamError::Status {
            url: "http://team/players/2/stats".to_string(),
            status: 502,
        };
        let reason = UnresolvedReason::from_upstream(&err);
        assert_eq!(reason.kind(), "unreachable");
        assert!(reason.to_string().contains("HTTP 502"));

        let err = UpstreamError::InvalidRecord {
            url: "x".to_string(),
            reason: "expected a JSON object".to_string(),
        };
        assert_eq!(UnresolvedReason::from_upstream(&err).kind(), "invalid_record");
    }

    #[test]
    fn test_reason_serializes_with_kind_tag() {
        let value = serde_json::to_value(UnresolvedPlayer {
            player_id: 4,
            reason: UnresolvedReason::NotFound,
        })
        .unwrap();
        assert_eq!(value["player_id"], 4);
        assert_eq!(value["reason"]["kind"], "not_found");
    }

    #[test]
    fn test_resolution_partitions_outcomes() {
        let resolution = Resolution {
            match_context: MatchContext::new(1),
            outcomes: vec![
                PlayerOutcome::Resolved(PlayerContext::new(1)),
                PlayerOutcome::unresolved(2, UnresolvedReason::NotFound),
                PlayerOutcome::Resolved(PlayerContext::new(3)),
            ],
        };

        let resolved: Vec<_> = resolution.resolved().map(|p| p.player_id).collect();
        let unresolved: Vec<_> = resolution.unresolved().map(|p| p.player_id).collect();
        assert_eq!(resolved, vec![1, 3]);
        assert_eq!(unresolved, vec![2]);
    }
}
